//! Payload codec
//!
//! Conversions between raw payload bytes and host values for the
//! controller's scalar wire types.
//!
//! ## Fixed-point formats
//! ```text
//! fpe2   ┌──────────────────────────┬─────┐
//! (u16)  │ integer (14 bits)        │ f(2)│   fan speed, RPM
//!        └──────────────────────────┴─────┘
//! sp78   ┌─┬─────────────┬──────────────────┐
//! (i16)  │s│ integer (7) │ fraction (8)     │   temperature, °C
//!        └─┴─────────────┴──────────────────┘
//! ```
//! Both are big-endian on the wire.

use crate::error::{Result, SmcError};

/// Byte range of the fan name inside a `{fds` descriptor
pub const FAN_NAME_RANGE: std::ops::Range<usize> = 4..16;

// =============================================================================
// Slice helpers
// =============================================================================

fn take<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            SmcError::Protocol(format!(
                "{}: expected {} bytes, got {}",
                what,
                N,
                bytes.len()
            ))
        })
}

// =============================================================================
// Integers and flags
// =============================================================================

/// Decode a `flag` payload (non-zero is set)
pub fn decode_flag(bytes: &[u8]) -> Result<bool> {
    let [b] = take::<1>(bytes, "flag")?;
    Ok(b != 0)
}

pub fn encode_flag(value: bool) -> [u8; 1] {
    [u8::from(value)]
}

/// Decode a `ui8` payload
pub fn decode_ui8(bytes: &[u8]) -> Result<u8> {
    let [b] = take::<1>(bytes, "ui8")?;
    Ok(b)
}

/// Decode a big-endian `ui16` payload
pub fn decode_ui16(bytes: &[u8]) -> Result<u16> {
    take::<2>(bytes, "ui16").map(u16::from_be_bytes)
}

/// Decode a big-endian `ui32` payload
pub fn decode_ui32(bytes: &[u8]) -> Result<u32> {
    take::<4>(bytes, "ui32").map(u32::from_be_bytes)
}

pub fn encode_ui32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

// =============================================================================
// fpe2
// =============================================================================

/// Decode an `fpe2` pair. The two fraction bits are dropped.
pub fn decode_fpe2(bytes: [u8; 2]) -> u16 {
    (u16::from(bytes[0]) << 6) | (u16::from(bytes[1]) >> 2)
}

/// Encode a value as `fpe2`.
///
/// Values needing more than 14 integer bits wrap: the high bits are
/// masked off rather than saturated.
pub fn encode_fpe2(value: u16) -> [u8; 2] {
    let hi = (value >> 6) as u8;
    let lo = ((value << 2) ^ (u16::from(hi) << 8)) as u8;
    [hi, lo]
}

/// Slice form of [`decode_fpe2`] for payloads read off the device
pub fn decode_fpe2_slice(bytes: &[u8]) -> Result<u16> {
    take::<2>(bytes, "fpe2").map(decode_fpe2)
}

// =============================================================================
// sp78
// =============================================================================

/// How `sp78` values are decoded.
///
/// The default is [`Sp78Mode::Full`], which honors the fraction byte.
/// [`Sp78Mode::Truncate`] reproduces tools that read only the integer byte
/// and are therefore off by up to one degree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sp78Mode {
    #[default]
    Full,
    Truncate,
}

/// Decode an `sp78` pair
pub fn decode_sp78(bytes: [u8; 2], mode: Sp78Mode) -> f64 {
    match mode {
        Sp78Mode::Full => f64::from(i16::from_be_bytes(bytes)) / 256.0,
        Sp78Mode::Truncate => f64::from(bytes[0] as i8),
    }
}

/// Encode a value as `sp78`, rounding to the nearest 1/256 and clamping
/// to the representable range.
pub fn encode_sp78(value: f64) -> [u8; 2] {
    let scaled = (value * 256.0).round().clamp(f64::from(i16::MIN), f64::from(i16::MAX));
    (scaled as i16).to_be_bytes()
}

/// Slice form of [`decode_sp78`]
pub fn decode_sp78_slice(bytes: &[u8], mode: Sp78Mode) -> Result<f64> {
    take::<2>(bytes, "sp78").map(|b| decode_sp78(b, mode))
}

// =============================================================================
// {fds
// =============================================================================

/// Extract the fan name from a `{fds` descriptor.
///
/// Reads bytes 4..16, stopping at the first NUL or non-ASCII byte, then
/// trims surrounding whitespace. Shorter payloads yield whatever part of
/// the range is present.
pub fn decode_fan_name(descriptor: &[u8]) -> String {
    let end = descriptor.len().min(FAN_NAME_RANGE.end);
    let raw = descriptor.get(FAN_NAME_RANGE.start..end).unwrap_or(&[]);

    let name: String = raw
        .iter()
        .take_while(|&&b| b != 0 && b.is_ascii())
        .map(|&b| char::from(b))
        .collect();

    name.trim().to_string()
}

// =============================================================================
// Temperature units
// =============================================================================

/// Celsius to Fahrenheit
pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Celsius to Kelvin
pub fn to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

/// Unit for reported temperatures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => to_fahrenheit(celsius),
            TemperatureUnit::Kelvin => to_kelvin(celsius),
        }
    }

    /// Display suffix
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }
}
