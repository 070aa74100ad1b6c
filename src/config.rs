//! Configuration for smckv
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, SmcError};
use crate::protocol::{RecordLayout, Sp78Mode, TemperatureUnit};

/// Main configuration for a controller connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Device Configuration
    // -------------------------------------------------------------------------
    /// IORegistry service name of the controller driver
    pub service_name: String,

    /// Field padding of the command record. Must add up to 80 bytes.
    pub record_layout: RecordLayout,

    // -------------------------------------------------------------------------
    // Decoding Configuration
    // -------------------------------------------------------------------------
    /// How temperature (`sp78`) payloads are decoded
    pub sp78_mode: Sp78Mode,

    /// Unit temperatures are reported in
    pub temperature_unit: TemperatureUnit,

    // -------------------------------------------------------------------------
    // Presentation Configuration
    // -------------------------------------------------------------------------
    /// Temperature treated as 100% when computing warning levels (Celsius)
    pub max_temperature_celsius: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "AppleSMC".to_string(),
            record_layout: RecordLayout::APPLE_SMC,
            sp78_mode: Sp78Mode::Full,
            temperature_unit: TemperatureUnit::Celsius,
            max_temperature_celsius: 128.0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the driver service name
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Set the record layout (checked on every device call)
    pub fn record_layout(mut self, layout: RecordLayout) -> Self {
        self.config.record_layout = layout;
        self
    }

    /// Set the sp78 decoding mode
    pub fn sp78_mode(mut self, mode: Sp78Mode) -> Self {
        self.config.sp78_mode = mode;
        self
    }

    /// Set the reporting unit for temperatures
    pub fn temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.config.temperature_unit = unit;
        self
    }

    /// Set the temperature used as the top of the warning scale
    pub fn max_temperature_celsius(mut self, celsius: f64) -> Self {
        self.config.max_temperature_celsius = celsius;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Build, rejecting values that can never work
    pub fn try_build(self) -> Result<Config> {
        if self.config.service_name.is_empty() {
            return Err(SmcError::Config("service name is empty".to_string()));
        }
        self.config.record_layout.validate()?;
        if !(self.config.max_temperature_celsius > 0.0) {
            return Err(SmcError::Config(format!(
                "max temperature must be positive, got {}",
                self.config.max_temperature_celsius
            )));
        }
        Ok(self.config)
    }
}
