//! Encode/Decode implementations for std, chrono and crate types

use std::any::type_name;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{CodecError, Result};
use crate::protocol::Tag;
use crate::shape::{ContainerKind, MapPlan, SequencePlan, ShapePlan, Shaped};
use crate::value::{Decimal, Value};

use super::decoder::FromSequence;
use super::{Decode, Decoder, Encode, Encoder};

// =============================================================================
// Scalars
// =============================================================================

macro_rules! impl_scalar {
    ($($ty:ty => $tag:ident, $put:ident, $read:ident);+ $(;)?) => {$(
        impl Shaped for $ty {
            fn describe() -> ShapePlan {
                ShapePlan::scalar::<$ty>(Tag::$tag)
            }
        }

        impl Encode for $ty {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                enc.$put(*self);
                Ok(())
            }
        }

        impl Decode for $ty {
            fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
                dec.$read()
            }
        }
    )+};
}

impl_scalar!(
    bool => Bool, put_bool, read_bool;
    i8 => Int8, put_i8, read_i8;
    u8 => UInt8, put_u8, read_u8;
    i16 => Int16, put_i16, read_i16;
    u16 => UInt16, put_u16, read_u16;
    i32 => Int32, put_i32, read_i32;
    u32 => UInt32, put_u32, read_u32;
    i64 => Int64, put_i64, read_i64;
    u64 => UInt64, put_u64, read_u64;
    f32 => Float32, put_f32, read_f32;
    f64 => Float64, put_f64, read_f64;
    Decimal => Decimal, put_decimal, read_decimal;
);

impl Shaped for char {
    fn describe() -> ShapePlan {
        ShapePlan::scalar::<char>(Tag::Char)
    }
}

impl Encode for char {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.put_char(*self)
    }
}

impl Decode for char {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.read_char()
    }
}

impl Shaped for String {
    fn describe() -> ShapePlan {
        ShapePlan::scalar::<String>(Tag::String)
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.put_str(self)
    }
}

impl Decode for String {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.read_string()
    }
}

impl Encode for str {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.put_str(self)
    }
}

// Any zone encodes (normalized to UTC); decoding always yields UTC
impl Shaped for DateTime<Utc> {
    fn describe() -> ShapePlan {
        ShapePlan::scalar::<DateTime<Utc>>(Tag::DateTime)
    }
}

impl<Tz: TimeZone> Encode for DateTime<Tz> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.put_datetime(self);
        Ok(())
    }
}

impl Decode for DateTime<Utc> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.read_datetime()
    }
}

// =============================================================================
// Optional values
// =============================================================================

// Nullable targets unwrap to their inner shape; absence is never on the wire
impl<T: Shaped> Shaped for Option<T> {
    fn describe() -> ShapePlan {
        T::describe()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode(enc),
            None => Err(CodecError::unsupported(format!(
                "Absent {} cannot be written as a section",
                type_name::<T>()
            ))),
        }
    }

    fn is_absent(&self) -> bool {
        match self {
            Some(value) => value.is_absent(),
            None => true,
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        T::decode(dec).map(Some)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(enc)
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: Shaped> Shaped for Box<T> {
    fn describe() -> ShapePlan {
        T::describe()
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        T::decode(dec).map(Box::new)
    }
}

// =============================================================================
// Sequences
// =============================================================================

fn sequence_plan<C: 'static, E: Shaped>(container: ContainerKind) -> ShapePlan {
    ShapePlan::Sequence(SequencePlan {
        type_name: type_name::<C>(),
        element: Box::new(E::describe()),
        container,
    })
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.sequence(self.iter())
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn describe() -> ShapePlan {
        sequence_plan::<Self, T>(ContainerKind::Growable)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.sequence(self.iter())
    }
}

impl<T: Decode> FromSequence for Vec<T> {
    type Element = T;

    fn from_buffer(buffer: Vec<T>, _container: ContainerKind) -> Result<Self> {
        Ok(buffer)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.sequence_into()
    }
}

impl<T: Shaped> Shaped for VecDeque<T> {
    fn describe() -> ShapePlan {
        sequence_plan::<Self, T>(ContainerKind::Growable)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.sequence(self.iter())
    }
}

impl<T: Decode> FromSequence for VecDeque<T> {
    type Element = T;

    fn from_buffer(buffer: Vec<T>, _container: ContainerKind) -> Result<Self> {
        Ok(VecDeque::from(buffer))
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.sequence_into()
    }
}

impl<T: Shaped, const N: usize> Shaped for [T; N] {
    fn describe() -> ShapePlan {
        sequence_plan::<Self, T>(ContainerKind::Fixed(N))
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.sequence(self.iter())
    }
}

impl<T: Decode, const N: usize> FromSequence for [T; N] {
    type Element = T;

    fn from_buffer(buffer: Vec<T>, container: ContainerKind) -> Result<Self> {
        let expected = match container {
            ContainerKind::Fixed(len) => len,
            ContainerKind::Growable => N,
        };
        let found = buffer.len();
        if found != expected {
            return Err(CodecError::corrupt(format!(
                "{} expects {} elements, sequence holds {}",
                type_name::<Self>(),
                expected,
                found
            )));
        }
        buffer.try_into().map_err(|_: Vec<T>| {
            CodecError::corrupt(format!("{} expects {} elements", type_name::<Self>(), N))
        })
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.sequence_into()
    }
}

// =============================================================================
// Maps
// =============================================================================

fn map_plan<M: 'static, V: Shaped>() -> ShapePlan {
    ShapePlan::Map(MapPlan {
        type_name: type_name::<M>(),
        value: Box::new(V::describe()),
    })
}

impl<V, S> Shaped for HashMap<String, V, S>
where
    V: Shaped,
    S: 'static,
{
    fn describe() -> ShapePlan {
        map_plan::<Self, V>()
    }
}

impl<V, S> Encode for HashMap<String, V, S>
where
    V: Encode + Decode,
    S: BuildHasher + Default + 'static,
{
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.map(self)
    }
}

impl<V, S> Decode for HashMap<String, V, S>
where
    V: Encode + Decode,
    S: BuildHasher + Default + 'static,
{
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.map()
    }
}

impl<V: Shaped> Shaped for BTreeMap<String, V> {
    fn describe() -> ShapePlan {
        map_plan::<Self, V>()
    }
}

impl<V: Encode + Decode> Encode for BTreeMap<String, V> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.map(self)
    }
}

impl<V: Encode + Decode> Decode for BTreeMap<String, V> {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.map()
    }
}

// =============================================================================
// Dynamic values
// =============================================================================

impl Shaped for Value {
    fn describe() -> ShapePlan {
        ShapePlan::Dynamic {
            type_name: type_name::<Value>(),
        }
    }
}

impl Encode for Value {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        match self {
            Value::Bool(v) => enc.put_bool(*v),
            Value::Int8(v) => enc.put_i8(*v),
            Value::UInt8(v) => enc.put_u8(*v),
            Value::Char(unit) => enc.put_char_unit(*unit),
            Value::Int16(v) => enc.put_i16(*v),
            Value::UInt16(v) => enc.put_u16(*v),
            Value::Int32(v) => enc.put_i32(*v),
            Value::UInt32(v) => enc.put_u32(*v),
            Value::Int64(v) => enc.put_i64(*v),
            Value::UInt64(v) => enc.put_u64(*v),
            Value::Decimal(v) => enc.put_decimal(*v),
            Value::Float32(v) => enc.put_f32(*v),
            Value::Float64(v) => enc.put_f64(*v),
            Value::DateTime(at) => enc.put_datetime(at),
            Value::Enum(v) => enc.put_enum(*v),
            Value::String(s) => enc.put_str(s)?,
            Value::Sequence(items) => enc.sequence(items.iter())?,
            Value::Extension { tag, payload } => enc.put_extension_raw(*tag, payload)?,
            Value::Map(entries) => enc.map(entries)?,
        }
        Ok(())
    }
}

impl Decode for Value {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self> {
        dec.read_value()
    }
}
