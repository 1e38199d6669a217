//! Value Module
//!
//! Dynamic, schema-less representation of anything the wire format can carry.
//!
//! ## Responsibilities
//! - Decode target that accepts every tag (`Value`)
//! - Wire-level leaf types without a std equivalent (`Decimal`)
//! - The single date-time normalization rule shared by encoder and decoder
//!
//! ## Date-Time Rule
//! Every date-time is converted to UTC before the epoch is subtracted, whatever time
//! zone it was created in. Milliseconds are floored, so sub-millisecond components
//! are lost and pre-1970 instants round toward the past.

mod decimal;

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{CodecError, Result};
use crate::protocol::Tag;

pub use decimal::Decimal;

/// Milliseconds between the UTC epoch and `at`
pub fn datetime_to_millis<Tz: TimeZone>(at: &DateTime<Tz>) -> i64 {
    at.with_timezone(&Utc).timestamp_millis()
}

/// UTC instant `millis` milliseconds after the epoch
pub fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| CodecError::corrupt(format!("Date-time {}ms is out of range", millis)))
}

/// Any value the wire format can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    /// Raw UTF-16 code unit (may be a lone surrogate)
    Char(u16),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Decimal(Decimal),
    Float32(f32),
    Float64(f64),
    DateTime(DateTime<Utc>),
    /// Underlying integer of an enum
    Enum(i32),
    String(String),
    Sequence(Vec<Value>),
    /// Opaque payload of a registered extension leaf
    Extension { tag: u8, payload: Bytes },
    /// Record or map; duplicate keys keep the last value decoded
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Tag this value is written with
    pub fn tag(&self) -> Tag {
        match self {
            Value::Bool(_) => Tag::Bool,
            Value::Int8(_) => Tag::Int8,
            Value::UInt8(_) => Tag::UInt8,
            Value::Char(_) => Tag::Char,
            Value::Int16(_) => Tag::Int16,
            Value::UInt16(_) => Tag::UInt16,
            Value::Int32(_) => Tag::Int32,
            Value::UInt32(_) => Tag::UInt32,
            Value::Int64(_) => Tag::Int64,
            Value::UInt64(_) => Tag::UInt64,
            Value::Decimal(_) => Tag::Decimal,
            Value::Float32(_) => Tag::Float32,
            Value::Float64(_) => Tag::Float64,
            Value::DateTime(_) => Tag::DateTime,
            Value::Enum(_) => Tag::Enum,
            Value::String(_) => Tag::String,
            Value::Sequence(_) => Tag::Sequence,
            Value::Extension { tag, .. } => Tag::Extension(*tag),
            Value::Map(_) => Tag::Record,
        }
    }

    /// Look up a key of a `Map`
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any integer kind (including enums) to `i128`
    pub fn as_integer(&self) -> Option<i128> {
        let int = match self {
            Value::Int8(v) => *v as i128,
            Value::UInt8(v) => *v as i128,
            Value::Int16(v) => *v as i128,
            Value::UInt16(v) => *v as i128,
            Value::Int32(v) | Value::Enum(v) => *v as i128,
            Value::UInt32(v) => *v as i128,
            Value::Int64(v) => *v as i128,
            Value::UInt64(v) => *v as i128,
            _ => return None,
        };
        Some(int)
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Value::Sequence(items) => {
                writeln!(f, "sequence[{}]", items.len())?;
                for (i, item) in items.iter().enumerate() {
                    write!(f, "{:width$}[{}] ", "", i, width = indent + 2)?;
                    item.write_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                writeln!(f, "record{{{}}}", entries.len())?;
                for (key, item) in entries {
                    write!(f, "{:width$}{}: ", "", key, width = indent + 2)?;
                    item.write_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Value::String(s) => writeln!(f, "{:?}", s),
            Value::Char(unit) => match char::from_u32(*unit as u32) {
                Some(c) => writeln!(f, "char {:?}", c),
                None => writeln!(f, "char \\u{{{:04x}}}", unit),
            },
            Value::Extension { tag, payload } => {
                write!(f, "extension({}) ", tag)?;
                for byte in payload.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                writeln!(f)
            }
            Value::DateTime(at) => writeln!(f, "{}", at.to_rfc3339()),
            Value::Decimal(d) => writeln!(f, "decimal {}", d),
            Value::Enum(v) => writeln!(f, "enum {}", v),
            Value::Bool(v) => writeln!(f, "{}", v),
            Value::Int8(v) => writeln!(f, "{}i8", v),
            Value::UInt8(v) => writeln!(f, "{}u8", v),
            Value::Int16(v) => writeln!(f, "{}i16", v),
            Value::UInt16(v) => writeln!(f, "{}u16", v),
            Value::Int32(v) => writeln!(f, "{}i32", v),
            Value::UInt32(v) => writeln!(f, "{}u32", v),
            Value::Int64(v) => writeln!(f, "{}i64", v),
            Value::UInt64(v) => writeln!(f, "{}u64", v),
            Value::Float32(v) => writeln!(f, "{}f32", v),
            Value::Float64(v) => writeln!(f, "{}f64", v),
        }
    }
}

/// Multi-line tree rendering, one section per line
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )+};
}

impl_value_from!(
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    DateTime<Utc> => DateTime,
    String => String,
    Vec<Value> => Sequence,
    BTreeMap<String, Value> => Map,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
