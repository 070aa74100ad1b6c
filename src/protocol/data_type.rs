//! Data types
//!
//! A key's data type is the pair (tag, size) reported by the device in the
//! key-info sub-record. It is always discovered, never assumed.

use std::fmt;

use super::key::SmcKey;

/// Wire type of a key's payload
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// FourCC type tag (`flag`, `fpe2`, ...)
    pub tag: SmcKey,

    /// Payload size in bytes
    pub size: u32,
}

impl DataType {
    /// Boolean, 1 byte
    pub const FLAG: DataType = DataType::new(*b"flag", 1);

    /// Unsigned 8-bit integer
    pub const UI8: DataType = DataType::new(*b"ui8 ", 1);

    /// Unsigned 16-bit integer, big-endian
    pub const UI16: DataType = DataType::new(*b"ui16", 2);

    /// Unsigned 32-bit integer, big-endian
    pub const UI32: DataType = DataType::new(*b"ui32", 4);

    /// Unsigned fixed point, 14 integer bits and 2 fraction bits (fan RPM)
    pub const FPE2: DataType = DataType::new(*b"fpe2", 2);

    /// Signed fixed point, 7 integer bits and 8 fraction bits (temperature)
    pub const SP78: DataType = DataType::new(*b"sp78", 2);

    /// Fan descriptor struct; bytes 4..16 carry the fan name
    pub const FDS: DataType = DataType::new(*b"{fds", 16);

    /// Build a data type from a literal tag.
    pub const fn new(tag: [u8; 4], size: u32) -> Self {
        Self {
            tag: SmcKey::from_bytes(tag),
            size,
        }
    }

    /// Build a data type from a tag id and size as found in a record.
    pub const fn from_raw(tag: u32, size: u32) -> Self {
        Self {
            tag: SmcKey::from_id(tag),
            size,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tag.name().trim_end(), self.size)
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({:?}, {})", self.tag.name(), self.size)
    }
}
