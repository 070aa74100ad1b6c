//! Temperature sensors
//!
//! Temperature keys start with `T`; the remaining letters loosely encode
//! the location (C = CPU, G = GPU, P = proximity, D = diode, H = heatsink).
//! The table below names the sensors whose hardware mapping is known. It
//! is neither complete nor present on every machine.

use crate::engine::Smc;
use crate::error::{Result, SmcError};
use crate::protocol::{codec, DataType, SmcKey, TemperatureUnit};
use crate::transport::Transport;

/// A named temperature key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureSensor {
    pub name: &'static str,
    pub key: SmcKey,
}

const fn sensor(name: &'static str, key: &[u8; 4]) -> TemperatureSensor {
    TemperatureSensor {
        name,
        key: SmcKey::from_bytes(*key),
    }
}

/// Sensors with a known hardware mapping, sorted by name
pub const TEMPERATURE_SENSORS: &[TemperatureSensor] = &[
    sensor("AMBIENT_AIR_0", b"TA0P"),
    sensor("AMBIENT_AIR_1", b"TA1P"),
    sensor("CPU_0_DIE", b"TC0F"),
    sensor("CPU_0_DIODE", b"TC0D"),
    sensor("CPU_0_HEATSINK", b"TC0H"),
    sensor("CPU_0_PROXIMITY", b"TC0P"),
    sensor("ENCLOSURE_BASE_0", b"TB0T"),
    sensor("ENCLOSURE_BASE_1", b"TB1T"),
    sensor("ENCLOSURE_BASE_2", b"TB2T"),
    sensor("ENCLOSURE_BASE_3", b"TB3T"),
    sensor("GPU_0_DIODE", b"TG0D"),
    sensor("GPU_0_HEATSINK", b"TG0H"),
    sensor("GPU_0_PROXIMITY", b"TG0P"),
    sensor("HDD_PROXIMITY", b"TH0P"),
    sensor("HEATSINK_0", b"Th0H"),
    sensor("HEATSINK_1", b"Th1H"),
    sensor("HEATSINK_2", b"Th2H"),
    sensor("LCD_PROXIMITY", b"TL0P"),
    sensor("MEM_SLOT_0", b"TM0S"),
    sensor("MEM_SLOTS_PROXIMITY", b"TM0P"),
    sensor("MISC_PROXIMITY", b"Tm0P"),
    sensor("NORTHBRIDGE", b"TN0H"),
    sensor("NORTHBRIDGE_DIODE", b"TN0D"),
    sensor("NORTHBRIDGE_PROXIMITY", b"TN0P"),
    sensor("ODD_PROXIMITY", b"TO0P"),
    sensor("PALM_REST", b"Ts0P"),
    sensor("PWR_SUPPLY_PROXIMITY", b"Tp0P"),
    sensor("THUNDERBOLT_0", b"TI0P"),
    sensor("THUNDERBOLT_1", b"TI1P"),
];

/// Look up the table entry for `key`
pub fn known_sensor(key: SmcKey) -> Option<&'static TemperatureSensor> {
    TEMPERATURE_SENSORS.iter().find(|s| s.key == key)
}

impl<T: Transport> Smc<T> {
    /// Current reading of an `sp78` temperature key in Celsius, decoded
    /// with the configured sp78 mode
    pub fn temperature_celsius(&self, key: SmcKey) -> Result<f64> {
        let bytes = self.read_value_as(key, DataType::SP78)?;
        codec::decode_sp78_slice(&bytes, self.config().sp78_mode)
    }

    /// Current reading of `key` in `unit`
    pub fn temperature(&self, key: SmcKey, unit: TemperatureUnit) -> Result<f64> {
        self.temperature_celsius(key).map(|c| unit.convert(c))
    }

    /// Table sensors that exist on this machine as `sp78` keys and report
    /// a non-zero reading. Some sensors answer but always read zero; those
    /// are left out. Absent or differently typed keys are skipped; any
    /// other failure is returned.
    pub fn all_known_temperature_sensors(&self) -> Result<Vec<TemperatureSensor>> {
        let mode = self.config().sp78_mode;
        let mut sensors = Vec::new();

        for sensor in TEMPERATURE_SENSORS {
            let value = match self.read_value(sensor.key) {
                Ok(value) => value,
                Err(SmcError::KeyNotFound(_)) => continue,
                Err(e) => return Err(e),
            };

            if value.data_type != DataType::SP78 {
                tracing::debug!("Skipping {}: typed {}", sensor.key, value.data_type);
                continue;
            }
            if value.as_sp78(mode)? != 0.0 {
                sensors.push(*sensor);
            }
        }

        Ok(sensors)
    }

    /// `sp78` keys starting with `T` that are not in the table.
    ///
    /// They are named after their key.
    pub fn all_unknown_temperature_sensors(&self) -> Result<Vec<SmcKey>> {
        let keys = self
            .all_keys()?
            .into_iter()
            .filter(|entry| entry.key.prefix() == b'T')
            .filter(|entry| entry.data_type == DataType::SP78)
            .filter(|entry| known_sensor(entry.key).is_none())
            .map(|entry| entry.key)
            .collect();

        Ok(keys)
    }
}
