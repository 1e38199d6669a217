//! Unsigned LEB128 lengths
//!
//! Each byte carries 7 data bits; the high bit marks a continuation. Only `u32`
//! lengths are representable, so an encoding never exceeds five bytes.

use bytes::BufMut;

use crate::error::{CodecError, Result};

const DATA_BITS_PER_BYTE: u32 = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// Longest valid encoding of a `u32`
pub const MAX_UVARINT_LEN: usize = 5;

/// Append `value` as unsigned LEB128
pub fn write_uvarint(out: &mut impl BufMut, mut value: u32) {
    while value >= CONTINUATION_BIT_MASK as u32 {
        out.put_u8((value as u8 & DATA_BITS_MASK) | CONTINUATION_BIT_MASK);
        value >>= DATA_BITS_PER_BYTE;
    }
    out.put_u8(value as u8);
}

/// Number of bytes `write_uvarint` emits for `value`
pub fn uvarint_len(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    (bits.max(1) + DATA_BITS_PER_BYTE as usize - 1) / DATA_BITS_PER_BYTE as usize
}

/// Decode an unsigned LEB128 value from the front of `input`
///
/// Returns the value and the number of bytes consumed. Rejects truncated input,
/// overlong encodings and values that overflow `u32`.
pub fn read_uvarint(input: &[u8]) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in input.iter().take(MAX_UVARINT_LEN).enumerate() {
        let data = (byte & DATA_BITS_MASK) as u32;
        let shift = DATA_BITS_PER_BYTE * i as u32;

        // The fifth byte may only carry the top 4 bits of a u32
        if i == MAX_UVARINT_LEN - 1 && data > 0x0F {
            return Err(CodecError::corrupt("Length prefix overflows u32"));
        }
        value |= data << shift;

        if byte & CONTINUATION_BIT_MASK == 0 {
            if i > 0 && byte == 0 {
                return Err(CodecError::corrupt("Overlong length prefix"));
            }
            return Ok((value, i + 1));
        }
    }

    if input.len() < MAX_UVARINT_LEN {
        Err(CodecError::corrupt("Truncated length prefix"))
    } else {
        Err(CodecError::corrupt("Length prefix longer than 5 bytes"))
    }
}
