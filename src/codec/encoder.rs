//! Encoder
//!
//! Recursive descent writer producing tagged sections.

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, TimeZone};

use crate::error::{CodecError, Result};
use crate::extension::Extension;
use crate::protocol::{write_uvarint, Tag, REGION_HEADER_SIZE};
use crate::shape::{DynamicMap, Record};
use crate::value::{datetime_to_millis, Decimal};

use super::{Codec, Encode};

/// Writes values into a growing buffer
///
/// Composite values are written two-phase: the payload is encoded into a scratch
/// buffer, then the tag, the payload length and the payload are appended to the
/// parent. No output seeking is needed.
pub struct Encoder<'c> {
    codec: &'c Codec,
    buf: BytesMut,
    /// Number of regions currently open
    depth: usize,
}

impl<'c> Encoder<'c> {
    pub(crate) fn new(codec: &'c Codec) -> Self {
        Self {
            codec,
            buf: BytesMut::new(),
            depth: 0,
        }
    }

    pub(crate) fn into_bytes(self) -> BytesMut {
        self.buf
    }

    /// The codec whose caches and registries this encoder uses
    pub fn codec(&self) -> &'c Codec {
        self.codec
    }

    /// Number of regions currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bytes written so far at the current nesting level
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    fn put_tag(&mut self, tag: Tag) {
        self.buf.put_u8(tag.byte());
    }

    pub fn put_bool(&mut self, v: bool) {
        self.put_tag(Tag::Bool);
        self.buf.put_u8(v as u8);
    }

    pub fn put_i8(&mut self, v: i8) {
        self.put_tag(Tag::Int8);
        self.buf.put_i8(v);
    }

    pub fn put_u8(&mut self, v: u8) {
        self.put_tag(Tag::UInt8);
        self.buf.put_u8(v);
    }

    /// Write a raw UTF-16 code unit
    pub fn put_char_unit(&mut self, unit: u16) {
        self.put_tag(Tag::Char);
        self.buf.put_u16_le(unit);
    }

    /// Write a `char`; only Basic Multilingual Plane characters fit one code unit
    pub fn put_char(&mut self, c: char) -> Result<()> {
        let mut units = [0u16; 2];
        match c.encode_utf16(&mut units) {
            [unit] => {
                self.put_char_unit(*unit);
                Ok(())
            }
            _ => Err(CodecError::unsupported(format!(
                "Character U+{:04X} needs a surrogate pair and does not fit one code unit",
                c as u32
            ))),
        }
    }

    pub fn put_i16(&mut self, v: i16) {
        self.put_tag(Tag::Int16);
        self.buf.put_i16_le(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.put_tag(Tag::UInt16);
        self.buf.put_u16_le(v);
    }

    pub fn put_i32(&mut self, v: i32) {
        self.put_tag(Tag::Int32);
        self.buf.put_i32_le(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.put_tag(Tag::UInt32);
        self.buf.put_u32_le(v);
    }

    pub fn put_i64(&mut self, v: i64) {
        self.put_tag(Tag::Int64);
        self.buf.put_i64_le(v);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.put_tag(Tag::UInt64);
        self.buf.put_u64_le(v);
    }

    pub fn put_decimal(&mut self, v: Decimal) {
        self.put_tag(Tag::Decimal);
        self.buf.put_slice(&v.to_bytes());
    }

    pub fn put_f32(&mut self, v: f32) {
        self.put_tag(Tag::Float32);
        self.buf.put_f32_le(v);
    }

    pub fn put_f64(&mut self, v: f64) {
        self.put_tag(Tag::Float64);
        self.buf.put_f64_le(v);
    }

    /// Write a date-time, normalized to UTC milliseconds
    pub fn put_datetime<Tz: TimeZone>(&mut self, at: &DateTime<Tz>) {
        self.put_tag(Tag::DateTime);
        self.buf.put_i64_le(datetime_to_millis(at));
    }

    /// Write an enum's underlying integer
    pub fn put_enum(&mut self, v: i32) {
        self.put_tag(Tag::Enum);
        self.buf.put_i32_le(v);
    }

    pub fn put_str(&mut self, s: &str) -> Result<()> {
        self.put_tag(Tag::String);
        self.put_key(s)
    }

    /// Write a record key: length-prefixed UTF-8 without a tag
    fn put_key(&mut self, key: &str) -> Result<()> {
        let len = u32::try_from(key.len())
            .map_err(|_| CodecError::unsupported(format!("String of {} bytes is too long", key.len())))?;
        write_uvarint(&mut self.buf, len);
        self.buf.put_slice(key.as_bytes());
        Ok(())
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Write a registered extension leaf
    pub fn put_extension<E: Extension>(&mut self, v: &E) -> Result<()> {
        self.check_extension(E::TAG, E::WIDTH)?;

        let start = self.buf.len();
        self.put_tag(Tag::Extension(E::TAG));
        v.write_payload(&mut self.buf);

        let written = self.buf.len() - start - 1;
        if written != E::WIDTH {
            self.buf.truncate(start);
            return Err(CodecError::unsupported(format!(
                "Extension {} wrote {} bytes, declared width is {}",
                std::any::type_name::<E>(),
                written,
                E::WIDTH
            )));
        }
        Ok(())
    }

    /// Write an opaque extension payload
    pub fn put_extension_raw(&mut self, tag: u8, payload: &[u8]) -> Result<()> {
        self.check_extension(tag, payload.len())?;
        self.put_tag(Tag::Extension(tag));
        self.buf.put_slice(payload);
        Ok(())
    }

    fn check_extension(&self, tag: u8, width: usize) -> Result<()> {
        match self.codec.extensions().get(tag) {
            Some(slot) if slot.width == width => Ok(()),
            Some(slot) => Err(CodecError::unsupported(format!(
                "Extension tag {} is registered with width {}, got {}",
                tag, slot.width, width
            ))),
            None => Err(CodecError::unsupported(format!(
                "No extension codec registered for tag {}",
                tag
            ))),
        }
    }

    // =========================================================================
    // Regions
    // =========================================================================

    /// Write a length-prefixed region whose payload is produced by `body`
    pub fn region<F>(&mut self, tag: Tag, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let limit = self.codec.config().max_depth;
        if self.depth >= limit {
            return Err(CodecError::DepthLimitExceeded { limit });
        }

        let parent = std::mem::take(&mut self.buf);
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        let payload = std::mem::replace(&mut self.buf, parent);
        result?;

        let max_len = self.codec.config().max_region_len as usize;
        if payload.len() > max_len {
            return Err(CodecError::unsupported(format!(
                "{} payload of {} bytes exceeds the region limit of {}",
                tag,
                payload.len(),
                max_len
            )));
        }

        self.buf.reserve(REGION_HEADER_SIZE + payload.len());
        self.put_tag(tag);
        self.buf.put_i32_le(payload.len() as i32);
        self.buf.put_slice(&payload);
        Ok(())
    }

    /// Write a sequence
    ///
    /// Elements are positional, so an absent element cannot be omitted and is
    /// `UnsupportedValue`.
    pub fn sequence<'a, I, E>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a E>,
        E: Encode + ?Sized + 'a,
    {
        self.region(Tag::Sequence, |enc| {
            for (index, item) in items.into_iter().enumerate() {
                if item.is_absent() {
                    return Err(CodecError::unsupported(format!(
                        "Sequence element {} of {} is absent",
                        index,
                        std::any::type_name::<E>()
                    )));
                }
                item.encode(enc)?;
            }
            Ok(())
        })
    }

    /// Write a record in field-table order, followed by any overflow entries
    pub fn record<T: Record>(&mut self, value: &T) -> Result<()> {
        let plan = self.codec.shapes().record_plan::<T>()?;
        self.region(Tag::Record, |enc| {
            for field in plan.fields() {
                field.encode_from(value, enc)?;
            }
            if let Some(overflow) = plan.overflow() {
                overflow.encode_from(value, enc)?;
            }
            Ok(())
        })
    }

    /// Write a dynamic map in its iteration order
    pub fn map<M: DynamicMap>(&mut self, map: &M) -> Result<()> {
        self.region(Tag::Record, |enc| enc.map_entries(map))
    }

    /// Write a map's entries into the current region
    pub fn map_entries<M: DynamicMap>(&mut self, map: &M) -> Result<()> {
        map.for_each_entry(&mut |key, value| self.field(key, value).map(|_| ()))
    }

    /// Write one `(key, value)` entry
    ///
    /// Absent values are omitted entirely; returns whether an entry was written.
    pub fn field<F: Encode + ?Sized>(&mut self, key: &str, value: &F) -> Result<bool> {
        if value.is_absent() {
            return Ok(false);
        }
        self.put_key(key)?;
        value.encode(self)?;
        Ok(true)
    }
}
