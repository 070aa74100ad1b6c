//! Fans
//!
//! Per-fan keys are `F{id}{suffix}`:
//! - `Ac` current speed, `Mn` minimum, `Mx` maximum (all `fpe2`, RPM)
//! - `ID` descriptor (`{fds`) carrying the fan's name
//!
//! Setting the minimum speed is the only write this crate performs on
//! behalf of callers, and it always goes through the range check in
//! [`Smc::set_fan_min_speed`].

use crate::engine::Smc;
use crate::error::{Result, SmcError};
use crate::protocol::{codec, DataType, SmcKey};
use crate::transport::Transport;

/// Number of fans (`ui8`)
pub const FAN_COUNT: SmcKey = SmcKey::from_bytes(*b"FNum");

mod suffix {
    pub const CURRENT: &str = "Ac";
    pub const MIN: &str = "Mn";
    pub const MAX: &str = "Mx";
    pub const DESCRIPTOR: &str = "ID";
}

/// Snapshot of one fan's static properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fan {
    pub id: u8,
    pub name: String,
    pub min_speed: u16,
    pub max_speed: u16,
}

impl<T: Transport> Smc<T> {
    /// Number of fans on this machine
    pub fn fan_count(&self) -> Result<u8> {
        let bytes = self.read_value_as(FAN_COUNT, DataType::UI8)?;
        codec::decode_ui8(&bytes)
    }

    /// Name of fan `id`, trimmed
    pub fn fan_name(&self, id: u8) -> Result<String> {
        let key = SmcKey::fan(id, suffix::DESCRIPTOR)?;
        let bytes = self.read_value_as(key, DataType::FDS)?;
        Ok(codec::decode_fan_name(&bytes))
    }

    /// Current speed of fan `id` in RPM
    pub fn fan_current_speed(&self, id: u8) -> Result<u16> {
        self.read_rpm(SmcKey::fan(id, suffix::CURRENT)?)
    }

    /// Minimum speed of fan `id` in RPM
    pub fn fan_min_speed(&self, id: u8) -> Result<u16> {
        self.read_rpm(SmcKey::fan(id, suffix::MIN)?)
    }

    /// Maximum speed of fan `id` in RPM
    pub fn fan_max_speed(&self, id: u8) -> Result<u16> {
        self.read_rpm(SmcKey::fan(id, suffix::MAX)?)
    }

    /// Name and speed range of fan `id`
    pub fn fan(&self, id: u8) -> Result<Fan> {
        Ok(Fan {
            id,
            name: self.fan_name(id)?,
            min_speed: self.fan_min_speed(id)?,
            max_speed: self.fan_max_speed(id)?,
        })
    }

    /// Every fan reported by `FNum`
    pub fn all_fans(&self) -> Result<Vec<Fan>> {
        let count = self.fan_count()?;
        (0..count).map(|id| self.fan(id)).collect()
    }

    /// Set the minimum speed of fan `id`.
    ///
    /// The fan's maximum is read first; the write is only built if
    /// `0 < rpm <= max`. A failed maximum read is itself a refusal.
    /// Requires a privileged connection.
    pub fn set_fan_min_speed(&self, id: u8, rpm: i64) -> Result<()> {
        let max = match self.fan_max_speed(id) {
            Ok(max) => max,
            Err(e) => {
                tracing::warn!("Fan {}: cannot read max speed, refusing write: {}", id, e);
                return Err(SmcError::UnsafeValue(format!(
                    "fan {} max speed unavailable: {}",
                    id, e
                )));
            }
        };

        if rpm <= 0 || rpm > i64::from(max) {
            tracing::warn!("Fan {}: refusing min speed {} RPM (max {})", id, rpm, max);
            return Err(SmcError::UnsafeValue(format!(
                "fan {} speed {} RPM outside 1..={} RPM",
                id, rpm, max
            )));
        }

        // In range, so it fits the 14 integer bits of fpe2
        let rpm = u16::try_from(rpm)
            .map_err(|_| SmcError::UnsafeValue(format!("fan {} speed {} RPM", id, rpm)))?;

        let key = SmcKey::fan(id, suffix::MIN)?;
        self.write_value(key, DataType::FPE2, &codec::encode_fpe2(rpm))?;

        tracing::info!("Fan {}: min speed set to {} RPM", id, rpm);
        Ok(())
    }

    fn read_rpm(&self, key: SmcKey) -> Result<u16> {
        let bytes = self.read_value_as(key, DataType::FPE2)?;
        codec::decode_fpe2_slice(&bytes)
    }
}
