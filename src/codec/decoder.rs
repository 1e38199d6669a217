//! Decoder
//!
//! Recursive descent reader over a byte slice.
//!
//! ## Cursor Discipline
//! - Every read is bounded by the innermost open region (or the input end)
//! - Leaving a region requires the cursor to sit exactly on its boundary
//! - Any violation is `CorruptData`; the decoder never resynchronizes

use std::collections::BTreeMap;

use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};

use crate::config::UnknownFieldPolicy;
use crate::error::{CodecError, Result};
use crate::extension::Extension;
use crate::protocol::{read_uvarint, Tag, DECIMAL_SIZE, REGION_LEN_SIZE};
use crate::shape::{ContainerKind, DynamicMap, Record, ShapePlan, Shaped};
use crate::value::{millis_to_datetime, Decimal, Value};

use super::{Codec, Decode};

/// A sequence container that can be built from a growable buffer
pub trait FromSequence: Shaped + Sized {
    type Element: Decode;

    /// Materialize the container from decoded elements
    fn from_buffer(buffer: Vec<Self::Element>, container: ContainerKind) -> Result<Self>;
}

/// Reads values from a byte slice
pub struct Decoder<'c, 'b> {
    codec: &'c Codec,
    input: &'b [u8],
    pos: usize,
    /// End of the innermost open region
    limit: usize,
    /// Number of regions currently open
    depth: usize,
}

impl<'c, 'b> Decoder<'c, 'b> {
    pub(crate) fn new(codec: &'c Codec, input: &'b [u8]) -> Self {
        Self {
            codec,
            input,
            pos: 0,
            limit: input.len(),
            depth: 0,
        }
    }

    /// The codec whose caches and registries this decoder uses
    pub fn codec(&self) -> &'c Codec {
        self.codec
    }

    /// Cursor offset from the start of the input
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the current boundary
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// True until the cursor reaches the current boundary
    pub fn has_remaining(&self) -> bool {
        self.pos < self.limit
    }

    /// Number of regions currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Plan for `T` from the codec's shape registry
    pub fn plan<T: Shaped>(&self) -> std::sync::Arc<ShapePlan> {
        self.codec.shapes().plan::<T>()
    }

    fn take(&mut self, n: usize) -> Result<&'b [u8]> {
        if n > self.remaining() {
            let scope = if self.limit == self.input.len() { "input" } else { "region" };
            return Err(CodecError::corrupt(format!(
                "Unexpected end of {} at offset {}: needed {} bytes, {} remain",
                scope,
                self.pos,
                n,
                self.remaining()
            )));
        }
        let bytes = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Read the next tag byte
    ///
    /// Unknown bytes and unregistered extension tags are corrupt input: their
    /// payload width is unknowable.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let offset = self.pos;
        let byte = self.take(1)?[0];
        let tag = Tag::from_byte(byte).ok_or_else(|| {
            CodecError::corrupt(format!("Unrecognized tag 0x{:02x} at offset {}", byte, offset))
        })?;
        if let Tag::Extension(ext) = tag {
            if self.codec.extensions().get(ext).is_none() {
                return Err(CodecError::corrupt(format!(
                    "Unsupported extension tag {} at offset {}",
                    ext, offset
                )));
            }
        }
        Ok(tag)
    }

    /// Read the next tag and require it to be `expected`
    pub fn expect(&mut self, expected: Tag) -> Result<()> {
        let wire = self.read_tag()?;
        if wire != expected {
            return Err(CodecError::TypeMismatch { wire, expected });
        }
        Ok(())
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    pub fn read_bool(&mut self) -> Result<bool> {
        self.expect(Tag::Bool)?;
        self.bool_payload()
    }

    fn bool_payload(&mut self) -> Result<bool> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::corrupt(format!("Invalid bool byte 0x{:02x}", other))),
        }
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.expect(Tag::Int8)?;
        Ok(self.take(1)?.get_i8())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.expect(Tag::UInt8)?;
        Ok(self.take(1)?.get_u8())
    }

    /// Read a raw UTF-16 code unit
    pub fn read_char_unit(&mut self) -> Result<u16> {
        self.expect(Tag::Char)?;
        Ok(self.take(2)?.get_u16_le())
    }

    /// Read a code unit that must be a complete character
    pub fn read_char(&mut self) -> Result<char> {
        let unit = self.read_char_unit()?;
        char::from_u32(unit as u32).ok_or_else(|| {
            CodecError::corrupt(format!("Code unit 0x{:04x} is a lone surrogate", unit))
        })
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.expect(Tag::Int16)?;
        Ok(self.take(2)?.get_i16_le())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.expect(Tag::UInt16)?;
        Ok(self.take(2)?.get_u16_le())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.expect(Tag::Int32)?;
        Ok(self.take(4)?.get_i32_le())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.expect(Tag::UInt32)?;
        Ok(self.take(4)?.get_u32_le())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.expect(Tag::Int64)?;
        Ok(self.take(8)?.get_i64_le())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.expect(Tag::UInt64)?;
        Ok(self.take(8)?.get_u64_le())
    }

    pub fn read_decimal(&mut self) -> Result<Decimal> {
        self.expect(Tag::Decimal)?;
        Decimal::from_bytes(self.take_array::<DECIMAL_SIZE>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.expect(Tag::Float32)?;
        Ok(self.take(4)?.get_f32_le())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.expect(Tag::Float64)?;
        Ok(self.take(8)?.get_f64_le())
    }

    pub fn read_datetime(&mut self) -> Result<DateTime<Utc>> {
        self.expect(Tag::DateTime)?;
        millis_to_datetime(self.take(8)?.get_i64_le())
    }

    /// Read an enum's underlying integer
    pub fn read_enum(&mut self) -> Result<i32> {
        self.expect(Tag::Enum)?;
        Ok(self.take(4)?.get_i32_le())
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.expect(Tag::String)?;
        self.read_key()
    }

    /// Read a length-prefixed UTF-8 string without a tag
    pub fn read_key(&mut self) -> Result<String> {
        let bytes = self.string_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            CodecError::corrupt(format!("Invalid UTF-8 in string at offset {}: {}", self.pos, e))
        })
    }

    fn string_bytes(&mut self) -> Result<&'b [u8]> {
        let window = &self.input[self.pos..self.limit];
        let (len, prefix_len) = read_uvarint(window)?;
        self.pos += prefix_len;
        self.take(len as usize)
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Read a registered extension leaf
    pub fn read_extension<E: Extension>(&mut self) -> Result<E> {
        self.expect(Tag::Extension(E::TAG))?;
        let width = self.extension_width(E::TAG)?;
        if width != E::WIDTH {
            return Err(CodecError::corrupt(format!(
                "Extension tag {} is registered with width {}, {} expects {}",
                E::TAG,
                width,
                std::any::type_name::<E>(),
                E::WIDTH
            )));
        }
        E::read_payload(self.take(width)?)
    }

    fn extension_width(&self, tag: u8) -> Result<usize> {
        self.codec
            .extensions()
            .width(tag)
            .ok_or_else(|| CodecError::corrupt(format!("Unsupported extension tag {}", tag)))
    }

    // =========================================================================
    // Regions
    // =========================================================================

    /// Read a region tagged `tag`, decoding its payload with `body`
    pub fn region<R, F>(&mut self, tag: Tag, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.expect(tag)?;
        self.region_payload(tag, body)
    }

    fn region_payload<R, F>(&mut self, tag: Tag, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        let len = self.region_len(tag)?;

        let limit = self.codec.config().max_depth;
        if self.depth >= limit {
            return Err(CodecError::DepthLimitExceeded { limit });
        }

        let end = self.pos + len;
        let parent_limit = std::mem::replace(&mut self.limit, end);
        self.depth += 1;
        tracing::trace!("Entering {} region of {} bytes at depth {}", tag, len, self.depth);

        let result = body(self);

        self.depth -= 1;
        self.limit = parent_limit;
        let value = result?;

        if self.pos != end {
            return Err(CodecError::corrupt(format!(
                "{} region ends at offset {} but decoding stopped at {}",
                tag, end, self.pos
            )));
        }
        Ok(value)
    }

    /// Read and validate a region's length prefix
    fn region_len(&mut self, tag: Tag) -> Result<usize> {
        let offset = self.pos;
        let len = self.take(REGION_LEN_SIZE)?.get_i32_le();
        if len < 0 {
            return Err(CodecError::corrupt(format!(
                "Negative {} length {} at offset {}",
                tag, len, offset
            )));
        }

        let len = len as usize;
        let max_len = self.codec.config().max_region_len as usize;
        if len > max_len {
            return Err(CodecError::corrupt(format!(
                "{} length {} exceeds the region limit of {}",
                tag, len, max_len
            )));
        }
        if len > self.remaining() {
            return Err(CodecError::corrupt(format!(
                "{} of {} bytes at offset {} overruns its container ({} bytes remain)",
                tag,
                len,
                offset,
                self.remaining()
            )));
        }
        Ok(len)
    }

    /// Read a sequence's elements into a growable buffer
    pub fn sequence<E: Decode>(&mut self) -> Result<Vec<E>> {
        self.region(Tag::Sequence, |dec| {
            let mut items = Vec::new();
            while dec.has_remaining() {
                items.push(E::decode(dec)?);
            }
            Ok(items)
        })
    }

    /// Read a sequence and materialize the container its plan calls for
    pub fn sequence_into<C: FromSequence>(&mut self) -> Result<C> {
        let plan = self.plan::<C>();
        let container = match plan.as_ref() {
            ShapePlan::Sequence(sequence) => sequence.container,
            other => {
                return Err(CodecError::unsupported(format!(
                    "{} is not a sequence shape",
                    other.type_name()
                )))
            }
        };
        let buffer = self.sequence::<C::Element>()?;
        C::from_buffer(buffer, container)
    }

    /// Read a record through its field table
    pub fn record<T: Record>(&mut self) -> Result<T> {
        let plan = self.codec.shapes().record_plan::<T>()?;
        let policy = self.codec.config().unknown_fields;

        self.region(Tag::Record, |dec| {
            let mut record = T::default();
            while dec.has_remaining() {
                let key = dec.read_key()?;
                if let Some(field) = plan.field(&key) {
                    field.decode_into(&mut record, dec)?;
                } else if let Some(overflow) = plan.overflow() {
                    overflow.decode_into(&mut record, key, dec)?;
                } else {
                    match policy {
                        UnknownFieldPolicy::Reject => {
                            return Err(CodecError::UnknownField {
                                type_name: T::TYPE_NAME,
                                key,
                            })
                        }
                        UnknownFieldPolicy::Skip => {
                            tracing::trace!("Skipping unknown field `{}` of {}", key, T::TYPE_NAME);
                            dec.skip_value()?;
                        }
                    }
                }
            }
            Ok(record)
        })
    }

    /// Read a dynamic map; every key is accepted
    pub fn map<M: DynamicMap>(&mut self) -> Result<M> {
        self.region(Tag::Record, |dec| {
            let mut map = M::default();
            while dec.has_remaining() {
                let key = dec.read_key()?;
                let value = M::Value::decode(dec)?;
                map.insert_entry(key, value);
            }
            Ok(map)
        })
    }

    // =========================================================================
    // Schema-less reads
    // =========================================================================

    /// Advance over one tagged section without materializing it
    pub fn skip_value(&mut self) -> Result<()> {
        let tag = self.read_tag()?;
        match tag {
            Tag::String => {
                self.string_bytes()?;
            }
            Tag::Sequence | Tag::Record => {
                let len = self.region_len(tag)?;
                self.take(len)?;
            }
            Tag::Extension(ext) => {
                let width = self.extension_width(ext)?;
                self.take(width)?;
            }
            fixed => {
                let width = fixed.fixed_width().unwrap_or(0);
                self.take(width)?;
            }
        }
        Ok(())
    }

    /// Read any tagged section into a `Value`
    pub fn read_value(&mut self) -> Result<Value> {
        let tag = self.read_tag()?;
        let value = match tag {
            Tag::Bool => Value::Bool(self.bool_payload()?),
            Tag::Int8 => Value::Int8(self.take(1)?.get_i8()),
            Tag::UInt8 => Value::UInt8(self.take(1)?.get_u8()),
            Tag::Char => Value::Char(self.take(2)?.get_u16_le()),
            Tag::Int16 => Value::Int16(self.take(2)?.get_i16_le()),
            Tag::UInt16 => Value::UInt16(self.take(2)?.get_u16_le()),
            Tag::Int32 => Value::Int32(self.take(4)?.get_i32_le()),
            Tag::UInt32 => Value::UInt32(self.take(4)?.get_u32_le()),
            Tag::Int64 => Value::Int64(self.take(8)?.get_i64_le()),
            Tag::UInt64 => Value::UInt64(self.take(8)?.get_u64_le()),
            Tag::Decimal => Value::Decimal(Decimal::from_bytes(self.take_array::<DECIMAL_SIZE>()?)?),
            Tag::Float32 => Value::Float32(self.take(4)?.get_f32_le()),
            Tag::Float64 => Value::Float64(self.take(8)?.get_f64_le()),
            Tag::DateTime => Value::DateTime(millis_to_datetime(self.take(8)?.get_i64_le())?),
            Tag::Enum => Value::Enum(self.take(4)?.get_i32_le()),
            Tag::String => Value::String(self.read_key()?),
            Tag::Extension(ext) => {
                let width = self.extension_width(ext)?;
                Value::Extension {
                    tag: ext,
                    payload: Bytes::copy_from_slice(self.take(width)?),
                }
            }
            Tag::Sequence => Value::Sequence(self.region_payload(tag, |dec| {
                let mut items = Vec::new();
                while dec.has_remaining() {
                    items.push(dec.read_value()?);
                }
                Ok(items)
            })?),
            Tag::Record => Value::Map(self.region_payload(tag, |dec| {
                let mut entries = BTreeMap::new();
                while dec.has_remaining() {
                    let key = dec.read_key()?;
                    let value = dec.read_value()?;
                    entries.insert(key, value);
                }
                Ok(entries)
            })?),
        };
        Ok(value)
    }

    /// Require that the whole input was consumed
    pub(crate) fn finish(&self) -> Result<()> {
        if self.pos != self.input.len() {
            return Err(CodecError::corrupt(format!(
                "{} trailing bytes after the top-level value",
                self.input.len() - self.pos
            )));
        }
        Ok(())
    }
}
