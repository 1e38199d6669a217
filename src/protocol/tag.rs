//! Tag definitions
//!
//! One-byte discriminators for every wire representation.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::CodecError;

/// Tag bytes reserved for host-registered extension leaves
pub const EXTENSION_TAGS: RangeInclusive<u8> = 18..=26;

/// Wire type codes
///
/// The numeric values are part of the format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Bool,
    Int8,
    UInt8,
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Decimal,
    Float32,
    Float64,
    DateTime,
    Enum,
    String,
    Sequence,
    /// Reserved extension leaf, 18..=26
    Extension(u8),
    Record,
}

impl Tag {
    /// The byte written on the wire
    pub const fn byte(self) -> u8 {
        match self {
            Tag::Bool => 1,
            Tag::Int8 => 2,
            Tag::UInt8 => 3,
            Tag::Char => 4,
            Tag::Int16 => 5,
            Tag::UInt16 => 6,
            Tag::Int32 => 7,
            Tag::UInt32 => 8,
            Tag::Int64 => 9,
            Tag::UInt64 => 10,
            Tag::Decimal => 11,
            Tag::Float32 => 12,
            Tag::Float64 => 13,
            Tag::DateTime => 14,
            Tag::Enum => 15,
            Tag::String => 16,
            Tag::Sequence => 17,
            Tag::Extension(byte) => byte,
            Tag::Record => 27,
        }
    }

    /// Map a wire byte back to its tag
    pub fn from_byte(byte: u8) -> Option<Tag> {
        let tag = match byte {
            1 => Tag::Bool,
            2 => Tag::Int8,
            3 => Tag::UInt8,
            4 => Tag::Char,
            5 => Tag::Int16,
            6 => Tag::UInt16,
            7 => Tag::Int32,
            8 => Tag::UInt32,
            9 => Tag::Int64,
            10 => Tag::UInt64,
            11 => Tag::Decimal,
            12 => Tag::Float32,
            13 => Tag::Float64,
            14 => Tag::DateTime,
            15 => Tag::Enum,
            16 => Tag::String,
            17 => Tag::Sequence,
            b if EXTENSION_TAGS.contains(&b) => Tag::Extension(b),
            27 => Tag::Record,
            _ => return None,
        };
        Some(tag)
    }

    /// Payload width for scalars whose size is known from the tag alone
    ///
    /// Strings, regions and extensions return `None`: their width comes from a
    /// length prefix or from the extension registry.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::Bool | Tag::Int8 | Tag::UInt8 => Some(1),
            Tag::Char | Tag::Int16 | Tag::UInt16 => Some(2),
            Tag::Int32 | Tag::UInt32 | Tag::Float32 | Tag::Enum => Some(4),
            Tag::Int64 | Tag::UInt64 | Tag::Float64 | Tag::DateTime => Some(8),
            Tag::Decimal => Some(super::DECIMAL_SIZE),
            Tag::String | Tag::Sequence | Tag::Extension(_) | Tag::Record => None,
        }
    }

    /// True for tags followed by a 4-byte length prefix
    pub const fn is_region(self) -> bool {
        matches!(self, Tag::Sequence | Tag::Record)
    }

    /// Human-readable kind name
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Bool => "bool",
            Tag::Int8 => "int8",
            Tag::UInt8 => "uint8",
            Tag::Char => "char",
            Tag::Int16 => "int16",
            Tag::UInt16 => "uint16",
            Tag::Int32 => "int32",
            Tag::UInt32 => "uint32",
            Tag::Int64 => "int64",
            Tag::UInt64 => "uint64",
            Tag::Decimal => "decimal",
            Tag::Float32 => "float32",
            Tag::Float64 => "float64",
            Tag::DateTime => "date-time",
            Tag::Enum => "enum",
            Tag::String => "string",
            Tag::Sequence => "sequence",
            Tag::Extension(_) => "extension",
            Tag::Record => "record",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = CodecError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Tag::from_byte(byte)
            .ok_or_else(|| CodecError::corrupt(format!("Unrecognized tag: 0x{:02x}", byte)))
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag.byte()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Extension(byte) => write!(f, "extension({})", byte),
            other => write!(f, "{}", other.name()),
        }
    }
}
