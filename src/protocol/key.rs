//! Key identifiers
//!
//! Every SMC key is a FourCC: four ASCII characters packed into a `u32`
//! with the first character in the most significant byte. Data type tags
//! (`"fpe2"`, `"sp78"`, ...) use the same packing.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SmcError};

/// Number of characters in a key name
pub const KEY_SIZE: usize = 4;

/// Pack a 4-character name into its integer identifier.
///
/// `"F0Ac"` becomes `0x4630_4163`.
pub fn encode(name: &str) -> Result<u32> {
    let bytes: [u8; KEY_SIZE] = name
        .as_bytes()
        .try_into()
        .map_err(|_| SmcError::InvalidKeyName(name.to_string()))?;

    if !name.is_ascii() {
        return Err(SmcError::InvalidKeyName(name.to_string()));
    }

    Ok(u32::from_be_bytes(bytes))
}

/// Unpack an integer identifier into its 4-character name.
///
/// Total over all inputs; bytes outside printable ASCII come back as the
/// matching Latin-1 character.
pub fn decode(id: u32) -> String {
    id.to_be_bytes().iter().map(|&b| char::from(b)).collect()
}

/// A controller key (or data type tag) in its integer form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SmcKey(u32);

impl SmcKey {
    /// Build a key from four literal bytes, usable in `const` tables.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Wrap a raw identifier as read off the wire.
    pub const fn from_id(id: u32) -> Self {
        Self(id)
    }

    /// Parse a 4-character name.
    pub fn new(name: &str) -> Result<Self> {
        encode(name).map(Self)
    }

    /// Build a per-fan key such as `F0Ac` or `F1Mx`.
    ///
    /// The fan id occupies a single character, so only fans 0..=9 exist.
    pub fn fan(id: u8, suffix: &str) -> Result<Self> {
        if id > 9 {
            return Err(SmcError::InvalidKeyName(format!("F{}{}", id, suffix)));
        }
        Self::new(&format!("F{}{}", id, suffix))
    }

    /// The integer identifier
    pub const fn id(self) -> u32 {
        self.0
    }

    /// The four name bytes, first character first
    pub const fn to_bytes(self) -> [u8; KEY_SIZE] {
        self.0.to_be_bytes()
    }

    /// The 4-character display name
    pub fn name(self) -> String {
        decode(self.0)
    }

    /// First character of the name (`b'T'` for temperature keys, ...)
    pub const fn prefix(self) -> u8 {
        self.to_bytes()[0]
    }
}

impl fmt::Display for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SmcKey({:?})", self.name())
    }
}

impl FromStr for SmcKey {
    type Err = SmcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for SmcKey {
    type Error = SmcError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<u32> for SmcKey {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<SmcKey> for u32 {
    fn from(key: SmcKey) -> Self {
        key.0
    }
}
