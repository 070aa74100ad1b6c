//! Battery, power source and optical drive flags

use crate::engine::Smc;
use crate::error::Result;
use crate::protocol::{codec, DataType, SmcKey};
use crate::transport::Transport;

/// Number of batteries (`ui8`)
pub const BATTERY_COUNT: SmcKey = SmcKey::from_bytes(*b"BNum");

/// Running on battery power (`flag`)
pub const BATTERY_POWERED: SmcKey = SmcKey::from_bytes(*b"BATP");

/// Battery status bits (`ui8`)
pub const BATTERY_STATUS: SmcKey = SmcKey::from_bytes(*b"BSIn");

/// Disc in the optical drive (`flag`)
pub const OPTICAL_DISK_DRIVE_FULL: SmcKey = SmcKey::from_bytes(*b"MSDI");

/// Bit positions within `BSIn`
mod status_bit {
    pub const CHARGING: u8 = 0;
    pub const AC_PRESENT: u8 = 1;
    pub const BATTERY_OK: u8 = 6;
}

/// Battery and power source state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryInfo {
    pub battery_count: u8,
    pub is_battery_powered: bool,
    pub is_charging: bool,
    pub is_ac_present: bool,
    pub is_battery_ok: bool,
}

impl BatteryInfo {
    /// Combine the battery count and powered flag with a raw `BSIn` byte
    pub fn from_status(battery_count: u8, is_battery_powered: bool, status: u8) -> Self {
        let bit = |n: u8| status & (1 << n) != 0;

        Self {
            battery_count,
            is_battery_powered,
            is_charging: bit(status_bit::CHARGING),
            is_ac_present: bit(status_bit::AC_PRESENT),
            is_battery_ok: bit(status_bit::BATTERY_OK),
        }
    }
}

impl<T: Transport> Smc<T> {
    /// Current battery and power source state (three key reads)
    pub fn battery_information(&self) -> Result<BatteryInfo> {
        let count = codec::decode_ui8(&self.read_value_as(BATTERY_COUNT, DataType::UI8)?)?;
        let powered = codec::decode_flag(&self.read_value_as(BATTERY_POWERED, DataType::FLAG)?)?;
        let status = codec::decode_ui8(&self.read_value_as(BATTERY_STATUS, DataType::UI8)?)?;

        Ok(BatteryInfo::from_status(count, powered, status))
    }

    /// Whether a disc is in the optical drive
    pub fn is_optical_disk_drive_full(&self) -> Result<bool> {
        let bytes = self.read_value_as(OPTICAL_DISK_DRIVE_FULL, DataType::FLAG)?;
        codec::decode_flag(&bytes)
    }
}
