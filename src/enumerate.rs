//! Key enumeration
//!
//! Walks the device's key table by index. Nothing is remembered between
//! walks: every call re-reads the count and every entry.

use crate::engine::Smc;
use crate::error::{Result, SmcError};
use crate::protocol::{codec, DataType, SmcKey};
use crate::transport::Transport;

/// Well-known key holding the number of keys on the device
pub const KEY_COUNT: SmcKey = SmcKey::from_bytes(*b"#KEY");

/// A key and its discovered type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: SmcKey,
    pub data_type: DataType,
}

impl<T: Transport> Smc<T> {
    /// Number of keys the device exposes (`#KEY`, ui32)
    pub fn key_count(&self) -> Result<u32> {
        let bytes = self.read_value_as(KEY_COUNT, DataType::UI32)?;
        codec::decode_ui32(&bytes)
    }

    /// Every key on the device with its data type, in device index order
    pub fn all_keys(&self) -> Result<Vec<KeyEntry>> {
        let count = self.key_count()?;
        tracing::debug!("Enumerating {} keys", count);

        let mut entries = Vec::with_capacity((count as usize).min(4096));
        for index in 0..count {
            let key = self.key_at_index(index)?;
            let data_type = self.key_information(key)?;
            entries.push(KeyEntry { key, data_type });
        }

        Ok(entries)
    }

    /// Whether the device knows `key`.
    ///
    /// Only a key-not-found answer counts as absent; every other failure
    /// is returned as an error.
    pub fn is_key_present(&self, key: SmcKey) -> Result<bool> {
        match self.key_information(key) {
            Ok(_) => Ok(true),
            Err(SmcError::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// [`is_key_present`](Self::is_key_present) for a key given by name
    pub fn is_key_name_present(&self, name: &str) -> Result<bool> {
        let key = SmcKey::new(name)?;
        self.is_key_present(key)
    }
}
