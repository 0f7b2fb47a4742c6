// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datapoint type encoders/decoders (§4.1). Decoders fail with
//! `AppError::DatapointRange` on out-of-range values and
//! `AppError::DatapointShape` on the wrong byte count; round-tripping
//! `decode(encode(value)) == value` is a testable property (§8).

use graylogic_core::value::CapabilityValue;
use graylogic_core::AppError;

use crate::telegram::Apdu;

/// A KNX datapoint type recognised by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dpt {
    /// DPT 1.xxx — 1-bit boolean.
    Bool1,
    /// DPT 3.007 — 4-bit dim control (direction bit + 3-bit step code).
    DimStep3,
    /// DPT 5.001 — 8-bit unsigned scaled percent (0..=100 over 0..=255).
    Percent5_001,
    /// DPT 6.010 — 8-bit signed.
    Signed8,
    /// DPT 9.xxx — 16-bit float (sign, 4-bit exponent, 11-bit mantissa).
    Float9,
    /// DPT 7.001 — 16-bit unsigned.
    Uint16,
    /// DPT 14.xxx — 32-bit IEEE 754 float.
    Float32,
    /// DPT 16.000 — 14-octet ASCII string.
    String14,
}

impl Dpt {
    pub fn encode(self, value: &CapabilityValue) -> Result<Apdu, AppError> {
        match self {
            Self::Bool1 => {
                let b = value
                    .as_bool()
                    .ok_or_else(|| shape_err(self, "expected a boolean value"))?;
                Ok(Apdu::Short(b as u8))
            }
            Self::DimStep3 => {
                let step = match value {
                    CapabilityValue::Int(i) => *i,
                    _ => return Err(shape_err(self, "expected an integer step value")),
                };
                if !(-7..=7).contains(&step) {
                    return Err(range_err(self, format!("step {step} out of range -7..=7")));
                }
                let direction: u8 = if step >= 0 { 0x08 } else { 0x00 };
                let magnitude = step.unsigned_abs() as u8 & 0x07;
                Ok(Apdu::Short(direction | magnitude))
            }
            Self::Percent5_001 => {
                let pct = value
                    .as_percent()
                    .ok_or_else(|| shape_err(self, "expected a 0..=100 percent value"))?;
                if pct > 100 {
                    return Err(range_err(self, format!("{pct} out of range 0..=100")));
                }
                let byte = (pct as u32 * 255 / 100) as u8;
                Ok(Apdu::Long(vec![byte]))
            }
            Self::Signed8 => {
                let i = match value {
                    CapabilityValue::Int(i) => *i,
                    _ => return Err(shape_err(self, "expected an integer value")),
                };
                if !(-128..=127).contains(&i) {
                    return Err(range_err(self, format!("{i} out of range -128..=127")));
                }
                Ok(Apdu::Long(vec![i as i8 as u8]))
            }
            Self::Float9 => {
                let c = value
                    .as_celsius()
                    .ok_or_else(|| shape_err(self, "expected a floating-point value"))?;
                Ok(Apdu::Long(encode_dpt9(c, self)?.to_vec()))
            }
            Self::Uint16 => {
                let i = match value {
                    CapabilityValue::Int(i) => *i,
                    _ => return Err(shape_err(self, "expected an integer value")),
                };
                if !(0..=65535).contains(&i) {
                    return Err(range_err(self, format!("{i} out of range 0..=65535")));
                }
                Ok(Apdu::Long((i as u16).to_be_bytes().to_vec()))
            }
            Self::Float32 => {
                let c = value
                    .as_celsius()
                    .ok_or_else(|| shape_err(self, "expected a floating-point value"))?;
                Ok(Apdu::Long(c.to_be_bytes().to_vec()))
            }
            Self::String14 => {
                let s = match value {
                    CapabilityValue::Enum(s) => s,
                    _ => return Err(shape_err(self, "expected a string value")),
                };
                if !s.is_ascii() || s.len() > 14 {
                    return Err(range_err(self, format!("{s:?} must be <=14 ASCII bytes")));
                }
                let mut bytes = s.as_bytes().to_vec();
                bytes.resize(14, 0);
                Ok(Apdu::Long(bytes))
            }
        }
    }

    pub fn decode(self, apdu: &Apdu) -> Result<CapabilityValue, AppError> {
        match self {
            Self::Bool1 => {
                let Apdu::Short(v) = apdu else {
                    return Err(shape_err(self, "expected a folded 1-bit value"));
                };
                Ok(CapabilityValue::Bool(*v & 0x01 != 0))
            }
            Self::DimStep3 => {
                let Apdu::Short(v) = apdu else {
                    return Err(shape_err(self, "expected a folded 4-bit value"));
                };
                let magnitude = (*v & 0x07) as i32;
                let step = if v & 0x08 != 0 { magnitude } else { -magnitude };
                Ok(CapabilityValue::Int(step))
            }
            Self::Percent5_001 => {
                let bytes = long_bytes(self, apdu, 1)?;
                let pct = (bytes[0] as u32 * 100 + 127) / 255;
                Ok(CapabilityValue::Percent(pct as u8))
            }
            Self::Signed8 => {
                let bytes = long_bytes(self, apdu, 1)?;
                Ok(CapabilityValue::Int(bytes[0] as i8 as i32))
            }
            Self::Float9 => {
                let bytes = long_bytes(self, apdu, 2)?;
                Ok(CapabilityValue::Celsius(decode_dpt9([bytes[0], bytes[1]])))
            }
            Self::Uint16 => {
                let bytes = long_bytes(self, apdu, 2)?;
                Ok(CapabilityValue::Int(u16::from_be_bytes([bytes[0], bytes[1]]) as i32))
            }
            Self::Float32 => {
                let bytes = long_bytes(self, apdu, 4)?;
                let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
                Ok(CapabilityValue::Celsius(f32::from_be_bytes(arr)))
            }
            Self::String14 => {
                let bytes = long_bytes(self, apdu, 14)?;
                let trimmed = bytes.iter().take_while(|b| **b != 0).copied().collect::<Vec<u8>>();
                let s = String::from_utf8(trimmed)
                    .map_err(|_| shape_err(self, "non-UTF-8 string payload"))?;
                Ok(CapabilityValue::Enum(s))
            }
        }
    }
}

fn long_bytes<'a>(dpt: Dpt, apdu: &'a Apdu, expected: usize) -> Result<&'a [u8], AppError> {
    match apdu {
        Apdu::Long(bytes) if bytes.len() == expected => Ok(bytes),
        Apdu::Long(bytes) => Err(shape_err(
            dpt,
            format!("expected {expected} bytes, got {}", bytes.len()),
        )),
        Apdu::Short(_) => Err(shape_err(dpt, "expected an extended (non-folded) APDU")),
    }
}

fn shape_err(dpt: Dpt, msg: impl Into<String>) -> AppError {
    AppError::DatapointShape(format!("{dpt:?}: {}", msg.into()))
}

fn range_err(dpt: Dpt, msg: impl Into<String>) -> AppError {
    AppError::DatapointRange(format!("{dpt:?}: {}", msg.into()))
}

/// KNX 2-byte float: `0.01 * mantissa * 2^exponent`, mantissa in two's
/// complement over 11 bits, exponent over 4 bits.
fn encode_dpt9(value: f32, dpt: Dpt) -> Result<[u8; 2], AppError> {
    if !value.is_finite() {
        return Err(range_err(dpt, "value must be finite"));
    }
    let mut mantissa = (value * 100.0).round() as i32;
    let mut exponent: i32 = 0;
    while !(-2048..=2047).contains(&mantissa) {
        mantissa >>= 1;
        exponent += 1;
    }
    if exponent > 15 {
        return Err(range_err(dpt, format!("{value} exceeds DPT9 range")));
    }
    let sign: u8 = if mantissa < 0 { 0x80 } else { 0x00 };
    let mantissa_bits = (mantissa & 0x07ff) as u16;
    let byte0 = sign | ((exponent as u8) << 3) | ((mantissa_bits >> 8) as u8 & 0x07);
    let byte1 = (mantissa_bits & 0xff) as u8;
    Ok([byte0, byte1])
}

fn decode_dpt9(bytes: [u8; 2]) -> f32 {
    let sign_bit = bytes[0] & 0x80 != 0;
    let exponent = (bytes[0] >> 3) & 0x0f;
    let raw_mantissa = (((bytes[0] & 0x07) as i16) << 8) | bytes[1] as i16;
    let mantissa = if sign_bit { raw_mantissa - 2048 } else { raw_mantissa };
    0.01 * (mantissa as f32) * 2f32.powi(exponent as i32)
}

#[cfg(test)]
#[path = "dpt_tests.rs"]
mod tests;
