//! # smckv
//!
//! A typed key/value client for the System Management Controller:
//! - Named 4-character keys with discovered wire types
//! - Two-phase exchange (discover, then read or write) over 80-byte records
//! - Range-checked fan writes
//! - Pluggable transport (IOKit on macOS, in-memory simulator everywhere)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Views: sensors / fan / power / enumerate           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Protocol Engine                           │
//! │        (one operation at a time per connection)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Record    │          │   Payload   │
//!   │ (80 bytes)  │          │    Codec    │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │  Transport  │
//!   │ (IOKit/sim) │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod engine;

pub mod enumerate;
pub mod fan;
pub mod sensors;
pub mod power;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SmcError};
pub use config::Config;
pub use engine::Smc;
pub use protocol::{DataType, KeyValue, SmcKey, Sp78Mode, TemperatureUnit};
pub use transport::{IoReturn, SimulatedSmc, Transport};
pub use enumerate::KeyEntry;
pub use fan::Fan;
pub use sensors::TemperatureSensor;
pub use power::BatteryInfo;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of smckv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
