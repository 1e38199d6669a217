//! Decimal values
//!
//! A 96-bit magnitude with a base-10 scale and a sign, stored in the same four-word
//! layout it travels in.

use std::fmt;

use crate::error::{CodecError, Result};
use crate::protocol::DECIMAL_SIZE;

const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;
const MAGNITUDE_LIMIT: u128 = 1 << 96;

/// High-precision decimal
///
/// Wire layout (16 bytes, each word little-endian):
/// ```text
/// ┌──────────┬──────────┬──────────┬─────────────────────────────────┐
/// │  lo (4)  │ mid (4)  │  hi (4)  │ flags (4): scale bits 16..=23,  │
/// │          │          │          │            sign bit 31          │
/// └──────────┴──────────┴──────────┴─────────────────────────────────┘
/// ```
/// Equality is bitwise over the four words, so `-0` and `0` are distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    /// Largest supported scale
    pub const MAX_SCALE: u32 = 28;

    /// Build a decimal worth `mantissa * 10^-scale`
    pub fn new(mantissa: i128, scale: u32) -> Result<Self> {
        if scale > Self::MAX_SCALE {
            return Err(CodecError::unsupported(format!(
                "Decimal scale {} exceeds {}",
                scale,
                Self::MAX_SCALE
            )));
        }
        let magnitude = mantissa.unsigned_abs();
        if magnitude >= MAGNITUDE_LIMIT {
            return Err(CodecError::unsupported(format!(
                "Decimal mantissa {} does not fit in 96 bits",
                mantissa
            )));
        }

        let mut flags = scale << SCALE_SHIFT;
        if mantissa < 0 {
            flags |= SIGN_MASK;
        }

        Ok(Self {
            lo: magnitude as u32,
            mid: (magnitude >> 32) as u32,
            hi: (magnitude >> 64) as u32,
            flags,
        })
    }

    /// Signed mantissa
    pub fn mantissa(&self) -> i128 {
        let magnitude =
            (self.lo as i128) | ((self.mid as i128) << 32) | ((self.hi as i128) << 64);
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Number of digits after the decimal point
    pub fn scale(&self) -> u32 {
        (self.flags & SCALE_MASK) >> SCALE_SHIFT
    }

    pub fn is_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    /// Serialize into the 16-byte wire layout
    pub fn to_bytes(&self) -> [u8; DECIMAL_SIZE] {
        let mut out = [0u8; DECIMAL_SIZE];
        out[0..4].copy_from_slice(&self.lo.to_le_bytes());
        out[4..8].copy_from_slice(&self.mid.to_le_bytes());
        out[8..12].copy_from_slice(&self.hi.to_le_bytes());
        out[12..16].copy_from_slice(&self.flags.to_le_bytes());
        out
    }

    /// Parse the 16-byte wire layout
    ///
    /// Rejects flags with bits outside the scale and sign fields, and scales
    /// above [`Decimal::MAX_SCALE`].
    pub fn from_bytes(bytes: [u8; DECIMAL_SIZE]) -> Result<Self> {
        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let decimal = Self {
            lo: word(0),
            mid: word(4),
            hi: word(8),
            flags: word(12),
        };

        if decimal.flags & !(SCALE_MASK | SIGN_MASK) != 0 {
            return Err(CodecError::corrupt(format!(
                "Decimal flags 0x{:08x} have reserved bits set",
                decimal.flags
            )));
        }
        if decimal.scale() > Self::MAX_SCALE {
            return Err(CodecError::corrupt(format!(
                "Decimal scale {} exceeds {}",
                decimal.scale(),
                Self::MAX_SCALE
            )));
        }
        Ok(decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().unsigned_abs().to_string();
        let scale = self.scale() as usize;
        let sign = if self.is_negative() { "-" } else { "" };

        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }

        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}
