//! Protocol Tests
//!
//! Tag table and LEB128 length prefixes.

use bytes::BytesMut;
use shapecodec::protocol::{read_uvarint, uvarint_len, write_uvarint, EXTENSION_TAGS, MAX_UVARINT_LEN};
use shapecodec::{CodecError, Tag};

// =============================================================================
// Tag Tests
// =============================================================================

#[test]
fn test_tag_bytes_are_stable() {
    let table = [
        (Tag::Bool, 1),
        (Tag::Int8, 2),
        (Tag::UInt8, 3),
        (Tag::Char, 4),
        (Tag::Int16, 5),
        (Tag::UInt16, 6),
        (Tag::Int32, 7),
        (Tag::UInt32, 8),
        (Tag::Int64, 9),
        (Tag::UInt64, 10),
        (Tag::Decimal, 11),
        (Tag::Float32, 12),
        (Tag::Float64, 13),
        (Tag::DateTime, 14),
        (Tag::Enum, 15),
        (Tag::String, 16),
        (Tag::Sequence, 17),
        (Tag::Record, 27),
    ];

    for (tag, byte) in table {
        assert_eq!(tag.byte(), byte);
        assert_eq!(u8::from(tag), byte);
        assert_eq!(Tag::try_from(byte).unwrap(), tag);
    }
}

#[test]
fn test_extension_tag_range() {
    for byte in EXTENSION_TAGS {
        assert_eq!(Tag::from_byte(byte), Some(Tag::Extension(byte)));
    }
    assert_eq!(Tag::Extension(20).to_string(), "extension(20)");
}

#[test]
fn test_invalid_tag_bytes() {
    assert!(Tag::from_byte(0).is_none());
    for byte in 28..=255u8 {
        assert!(Tag::from_byte(byte).is_none());
    }
    assert!(matches!(Tag::try_from(0), Err(CodecError::CorruptData(_))));
}

#[test]
fn test_fixed_widths() {
    assert_eq!(Tag::Bool.fixed_width(), Some(1));
    assert_eq!(Tag::Char.fixed_width(), Some(2));
    assert_eq!(Tag::Enum.fixed_width(), Some(4));
    assert_eq!(Tag::DateTime.fixed_width(), Some(8));
    assert_eq!(Tag::Decimal.fixed_width(), Some(16));
    assert_eq!(Tag::String.fixed_width(), None);
    assert_eq!(Tag::Extension(18).fixed_width(), None);

    assert!(Tag::Sequence.is_region());
    assert!(Tag::Record.is_region());
    assert!(!Tag::String.is_region());
}

// =============================================================================
// Varint Tests
// =============================================================================

#[test]
fn test_uvarint_encoding() {
    let cases: [(u32, &[u8]); 6] = [
        (0, &[0x00]),
        (1, &[0x01]),
        (127, &[0x7F]),
        (128, &[0x80, 0x01]),
        (300, &[0xAC, 0x02]),
        (u32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
    ];

    for (value, expected) in cases {
        let mut buf = BytesMut::new();
        write_uvarint(&mut buf, value);
        assert_eq!(&buf[..], expected, "encoding {}", value);
        assert_eq!(uvarint_len(value), expected.len());
        assert_eq!(read_uvarint(expected).unwrap(), (value, expected.len()));
    }
}

#[test]
fn test_uvarint_reads_prefix_only() {
    let (value, used) = read_uvarint(&[0x05, 0xFF, 0xFF]).unwrap();
    assert_eq!(value, 5);
    assert_eq!(used, 1);
}

#[test]
fn test_uvarint_truncated() {
    assert!(matches!(read_uvarint(&[]), Err(CodecError::CorruptData(_))));
    assert!(matches!(read_uvarint(&[0x80, 0x80]), Err(CodecError::CorruptData(_))));
}

#[test]
fn test_uvarint_overflow() {
    // Fifth byte carries more than 4 bits
    assert!(matches!(
        read_uvarint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]),
        Err(CodecError::CorruptData(_))
    ));
    // Continuation bit on the fifth byte
    assert!(matches!(
        read_uvarint(&[0x80; MAX_UVARINT_LEN + 1]),
        Err(CodecError::CorruptData(_))
    ));
}

#[test]
fn test_uvarint_overlong() {
    assert!(matches!(read_uvarint(&[0x80, 0x00]), Err(CodecError::CorruptData(_))));
}
