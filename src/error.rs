//! Error types for smckv
//!
//! Provides a unified error type for all controller operations.

use thiserror::Error;

use crate::protocol::{DataType, SmcKey};
use crate::transport::IoReturn;

/// Result type alias using SmcError
pub type Result<T> = std::result::Result<T, SmcError>;

/// Unified error type for smckv operations
#[derive(Debug, Error)]
pub enum SmcError {
    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key name {0:?}: must be exactly 4 ASCII characters")]
    InvalidKeyName(String),

    #[error("Key not found: {0}")]
    KeyNotFound(SmcKey),

    #[error("Data type mismatch for key {key}: expected {expected}, device reports {found}")]
    DataTypeMismatch {
        key: SmcKey,
        expected: DataType,
        found: DataType,
    },

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(IoReturn),

    #[error("Operation not privileged (run as superuser)")]
    NotPrivileged,

    // -------------------------------------------------------------------------
    // Write Guard Errors
    // -------------------------------------------------------------------------
    #[error("Unsafe value: {0}")]
    UnsafeValue(String),

    // -------------------------------------------------------------------------
    // Record / Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Command record layout is {size} bytes, expected 80")]
    LayoutError { size: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Device call failed: transport {transport}, device result 0x{device:02x}")]
    Unknown { transport: IoReturn, device: u8 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
