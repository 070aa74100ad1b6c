//! Command record
//!
//! The fixed 80-byte structure exchanged with the controller driver. The
//! driver checks the size of every struct it is handed, so the layout is
//! part of the contract: multi-byte scalars are in host byte order and
//! padding follows the C alignment rules of the driver's own definition.
//!
//! ## Layout
//! ```text
//! offset size field
//!  0     4    key
//!  4     6    version (major, minor, build, reserved, release u16)
//! 10     2    padding
//! 12    16    limit data (version u16, length u16, cpu/gpu/mem u32)
//! 28     4    key info: data size
//! 32     4    key info: data type tag
//! 36     1    key info: attributes
//! 37     3    padding
//! 40     1    result
//! 41     1    status
//! 42     1    data8 (selector)
//! 43     1    padding
//! 44     4    data32
//! 48    32    payload
//! ```

use bytes::{Buf, BufMut};

use crate::error::{Result, SmcError};
use super::data_type::DataType;
use super::key::SmcKey;

/// Encoded size of a record
pub const RECORD_SIZE: usize = 80;

/// Size of the payload region at the end of the record
pub const PAYLOAD_SIZE: usize = 32;

/// Device-side functions, carried in the record's `data8` byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Selector {
    ReadKey = 5,
    WriteKey = 6,
    GetKeyCount = 7,
    GetKeyFromIndex = 8,
    GetKeyInfo = 9,
}

impl Selector {
    /// Map a raw `data8` byte back to a selector.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            5 => Some(Selector::ReadKey),
            6 => Some(Selector::WriteKey),
            7 => Some(Selector::GetKeyCount),
            8 => Some(Selector::GetKeyFromIndex),
            9 => Some(Selector::GetKeyInfo),
            _ => None,
        }
    }
}

/// Device result codes written into the record's `result` byte
pub mod result {
    pub const SUCCESS: u8 = 0x00;
    pub const ERROR: u8 = 0x01;
    pub const KEY_NOT_FOUND: u8 = 0x84;
}

/// Version sub-record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

/// Power limit sub-record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_limit: u32,
    pub gpu_limit: u32,
    pub mem_limit: u32,
}

/// Key info sub-record, filled in by the device on GetKeyInfo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// Number of meaningful payload bytes
    pub data_size: u32,

    /// FourCC type tag
    pub data_type: u32,

    pub attributes: u8,
}

impl KeyInfo {
    /// The (tag, size) pair this sub-record describes
    pub fn data_type(&self) -> DataType {
        DataType::from_raw(self.data_type, self.data_size)
    }
}

impl From<DataType> for KeyInfo {
    fn from(data_type: DataType) -> Self {
        Self {
            data_size: data_type.size,
            data_type: data_type.tag.id(),
            attributes: 0,
        }
    }
}

/// A request or response record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    pub key: u32,
    pub version: Version,
    pub limit_data: LimitData,
    pub key_info: KeyInfo,
    pub result: u8,
    pub status: u8,
    pub data8: u8,
    pub data32: u32,
    pub bytes: [u8; PAYLOAD_SIZE],
}

impl Default for CommandRecord {
    fn default() -> Self {
        Self {
            key: 0,
            version: Version::default(),
            limit_data: LimitData::default(),
            key_info: KeyInfo::default(),
            result: 0,
            status: 0,
            data8: 0,
            data32: 0,
            bytes: [0; PAYLOAD_SIZE],
        }
    }
}

impl CommandRecord {
    /// Create a request for `selector` on `key`
    pub fn new(key: SmcKey, selector: Selector) -> Self {
        Self {
            key: key.id(),
            data8: selector as u8,
            ..Self::default()
        }
    }

    /// The target key
    pub fn smc_key(&self) -> SmcKey {
        SmcKey::from_id(self.key)
    }

    /// The selector in `data8`, if it is one the device knows
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_u8(self.data8)
    }

    /// First `len` payload bytes (clamped to the payload region)
    pub fn payload(&self, len: usize) -> &[u8] {
        let len = len.min(PAYLOAD_SIZE);
        &self.bytes[..len]
    }

    /// Copy `data` into the start of the payload region.
    pub fn set_payload(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > PAYLOAD_SIZE {
            return Err(SmcError::Protocol(format!(
                "Payload too large: {} bytes (max {})",
                data.len(),
                PAYLOAD_SIZE
            )));
        }
        self.bytes = [0; PAYLOAD_SIZE];
        self.bytes[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Encode with the driver's layout
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        self.pack(&RecordLayout::APPLE_SMC, &mut out[..]);
        out
    }

    /// Encode with an explicit layout.
    ///
    /// Fails with `LayoutError` when the layout does not produce exactly
    /// [`RECORD_SIZE`] bytes.
    pub fn encode_with(&self, layout: &RecordLayout) -> Result<[u8; RECORD_SIZE]> {
        layout.validate()?;
        let mut out = [0u8; RECORD_SIZE];
        self.pack(layout, &mut out[..]);
        Ok(out)
    }

    /// Decode a record produced with the driver's layout
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self::unpack(&RecordLayout::APPLE_SMC, &bytes[..])
    }

    /// Decode with an explicit layout
    pub fn decode_with(layout: &RecordLayout, bytes: &[u8; RECORD_SIZE]) -> Result<Self> {
        layout.validate()?;
        Ok(Self::unpack(layout, &bytes[..]))
    }

    // Caller guarantees `out.len() == layout.size()`.
    fn pack(&self, layout: &RecordLayout, mut out: &mut [u8]) {
        out.put_u32_ne(self.key);

        out.put_u8(self.version.major);
        out.put_u8(self.version.minor);
        out.put_u8(self.version.build);
        out.put_u8(self.version.reserved);
        out.put_u16_ne(self.version.release);
        out.put_bytes(0, layout.version_pad);

        out.put_u16_ne(self.limit_data.version);
        out.put_u16_ne(self.limit_data.length);
        out.put_u32_ne(self.limit_data.cpu_limit);
        out.put_u32_ne(self.limit_data.gpu_limit);
        out.put_u32_ne(self.limit_data.mem_limit);

        out.put_u32_ne(self.key_info.data_size);
        out.put_u32_ne(self.key_info.data_type);
        out.put_u8(self.key_info.attributes);
        out.put_bytes(0, layout.key_info_pad);

        out.put_u8(self.result);
        out.put_u8(self.status);
        out.put_u8(self.data8);
        out.put_bytes(0, layout.data8_pad);
        out.put_u32_ne(self.data32);

        out.put_slice(&self.bytes);
    }

    // Caller guarantees `bytes.len() == layout.size()`.
    fn unpack(layout: &RecordLayout, mut bytes: &[u8]) -> Self {
        let key = bytes.get_u32_ne();

        let version = Version {
            major: bytes.get_u8(),
            minor: bytes.get_u8(),
            build: bytes.get_u8(),
            reserved: bytes.get_u8(),
            release: bytes.get_u16_ne(),
        };
        bytes.advance(layout.version_pad);

        let limit_data = LimitData {
            version: bytes.get_u16_ne(),
            length: bytes.get_u16_ne(),
            cpu_limit: bytes.get_u32_ne(),
            gpu_limit: bytes.get_u32_ne(),
            mem_limit: bytes.get_u32_ne(),
        };

        let key_info = KeyInfo {
            data_size: bytes.get_u32_ne(),
            data_type: bytes.get_u32_ne(),
            attributes: bytes.get_u8(),
        };
        bytes.advance(layout.key_info_pad);

        let result = bytes.get_u8();
        let status = bytes.get_u8();
        let data8 = bytes.get_u8();
        bytes.advance(layout.data8_pad);
        let data32 = bytes.get_u32_ne();

        let mut payload = [0u8; PAYLOAD_SIZE];
        bytes.copy_to_slice(&mut payload);

        Self {
            key,
            version,
            limit_data,
            key_info,
            result,
            status,
            data8,
            data32,
            bytes: payload,
        }
    }
}

/// Alignment padding between record fields.
///
/// Field order and widths are fixed; only the padding varies with the
/// platform's alignment rules. A layout is usable only if it adds up to
/// [`RECORD_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Bytes after the version sub-record
    pub version_pad: usize,

    /// Bytes after the key-info attributes byte
    pub key_info_pad: usize,

    /// Bytes between `data8` and `data32`
    pub data8_pad: usize,
}

impl RecordLayout {
    /// Layout used by the AppleSMC driver on 64-bit hosts
    pub const APPLE_SMC: RecordLayout = RecordLayout {
        version_pad: 2,
        key_info_pad: 3,
        data8_pad: 1,
    };

    // key + version + limit data + key info + result/status/data8 + data32
    const FIXED_FIELDS: usize = 4 + 6 + 16 + 9 + 3 + 4 + PAYLOAD_SIZE;

    /// Total encoded size
    pub const fn size(&self) -> usize {
        Self::FIXED_FIELDS + self.version_pad + self.key_info_pad + self.data8_pad
    }

    /// Offset of the payload region
    pub const fn payload_offset(&self) -> usize {
        self.size() - PAYLOAD_SIZE
    }

    /// Check the layout against the driver's size requirement.
    pub fn validate(&self) -> Result<()> {
        let size = self.size();
        if size != RECORD_SIZE {
            return Err(SmcError::LayoutError { size });
        }
        Ok(())
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self::APPLE_SMC
    }
}

const _: () = assert!(RecordLayout::APPLE_SMC.size() == RECORD_SIZE);
