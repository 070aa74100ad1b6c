//! Protocol Module
//!
//! Defines the key/value protocol spoken with the controller driver.
//!
//! ## Exchange (two phases per operation)
//! ```text
//! ┌──────────┐  GetKeyInfo (9)   ┌──────────┐
//! │  caller  │ ────────────────▶ │  device  │  → data size + type tag
//! │          │  ReadKey (5) /    │          │
//! │          │  WriteKey (6)     │          │  → payload / ack
//! └──────────┘ ────────────────▶ └──────────┘
//! ```
//!
//! Every request and response is one 80-byte [`CommandRecord`].
//!
//! ### Device Result Codes
//! - 0x00: SUCCESS
//! - 0x01: ERROR
//! - 0x84: KEY_NOT_FOUND

pub mod key;
pub mod codec;
mod data_type;
mod record;
mod value;

pub use key::{SmcKey, KEY_SIZE};
pub use data_type::DataType;
pub use record::{
    result, CommandRecord, KeyInfo, LimitData, RecordLayout, Selector, Version, PAYLOAD_SIZE,
    RECORD_SIZE,
};
pub use value::KeyValue;
pub use codec::{Sp78Mode, TemperatureUnit};
