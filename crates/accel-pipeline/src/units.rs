//! Register value conversion
//!
//! Axis registers hold 10-bit two's-complement counts spanning the
//! configured full-scale range.

use crate::RangeSetting;

/// Temperature register reading of zero, in degrees Celsius
pub const TEMPERATURE_OFFSET_C: i16 = -30;

const SIGN_BIT: u16 = 1 << 9;
const MAGNITUDE_MASK: u16 = 0x1FF;
const RAW_MASK: u16 = 0x3FF;

/// Sign-extend a 10-bit axis register value
pub fn raw_counts(raw: u16) -> i16 {
    if raw & SIGN_BIT != 0 {
        (raw | 0xFC00) as i16
    } else {
        (raw & RAW_MASK) as i16
    }
}

/// Convert a 10-bit axis register value to milli-g
pub fn decode_axis(raw: u16, range: RangeSetting) -> i16 {
    let g = i32::from(range.g());
    let mg = if raw & SIGN_BIT != 0 {
        -((g * (512 - i32::from(raw & MAGNITUDE_MASK))) * 2000 / 1024)
    } else {
        (g * i32::from(raw & RAW_MASK)) * 2000 / 1024
    };
    mg as i16
}

/// Encode milli-g into a 10-bit axis register value, saturating at full scale
pub fn encode_axis(mg: i32, range: RangeSetting) -> u16 {
    let counts = (mg * 1024 / (i32::from(range.g()) * 2000)).clamp(-512, 511);
    (counts as u16) & RAW_MASK
}

/// Convert the temperature register (0.5 K per LSB) to degrees Celsius
pub fn decode_temperature(raw: u8) -> i16 {
    (i16::from(raw) >> 1) + TEMPERATURE_OFFSET_C
}
