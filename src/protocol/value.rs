//! Key values
//!
//! A payload read off the device, bound to the key and type it came from.

use crate::error::{Result, SmcError};
use super::codec::{self, Sp78Mode};
use super::data_type::DataType;
use super::key::SmcKey;

/// One key's value as read in a single round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: SmcKey,
    pub data_type: DataType,

    /// Exactly `data_type.size` bytes
    pub bytes: Vec<u8>,
}

impl KeyValue {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fail unless the value carries `expected`
    pub fn expect_type(&self, expected: DataType) -> Result<()> {
        if self.data_type != expected {
            return Err(SmcError::DataTypeMismatch {
                key: self.key,
                expected,
                found: self.data_type,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn as_flag(&self) -> Result<bool> {
        self.expect_type(DataType::FLAG)?;
        codec::decode_flag(&self.bytes)
    }

    pub fn as_u8(&self) -> Result<u8> {
        self.expect_type(DataType::UI8)?;
        codec::decode_ui8(&self.bytes)
    }

    pub fn as_u16(&self) -> Result<u16> {
        self.expect_type(DataType::UI16)?;
        codec::decode_ui16(&self.bytes)
    }

    pub fn as_u32(&self) -> Result<u32> {
        self.expect_type(DataType::UI32)?;
        codec::decode_ui32(&self.bytes)
    }

    pub fn as_fpe2(&self) -> Result<u16> {
        self.expect_type(DataType::FPE2)?;
        codec::decode_fpe2_slice(&self.bytes)
    }

    pub fn as_sp78(&self, mode: Sp78Mode) -> Result<f64> {
        self.expect_type(DataType::SP78)?;
        codec::decode_sp78_slice(&self.bytes, mode)
    }

    /// Fan name from a `{fds` descriptor
    pub fn as_fan_name(&self) -> Result<String> {
        self.expect_type(DataType::FDS)?;
        Ok(codec::decode_fan_name(&self.bytes))
    }

    /// Best-effort rendering for listings: decoded when the type is known,
    /// hex otherwise.
    pub fn display_value(&self, mode: Sp78Mode) -> String {
        let decoded = match self.data_type {
            DataType::FLAG => self.as_flag().map(|v| v.to_string()),
            DataType::UI8 => self.as_u8().map(|v| v.to_string()),
            DataType::UI16 => self.as_u16().map(|v| v.to_string()),
            DataType::UI32 => self.as_u32().map(|v| v.to_string()),
            DataType::FPE2 => self.as_fpe2().map(|v| v.to_string()),
            DataType::SP78 => self.as_sp78(mode).map(|v| v.to_string()),
            DataType::FDS => self.as_fan_name().map(|v| format!("{:?}", v)),
            _ => Err(SmcError::Protocol(String::new())),
        };

        decoded.unwrap_or_else(|_| {
            self.bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}
