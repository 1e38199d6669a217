//! Value Tests
//!
//! Decimal layout, the dynamic value view and its rendering.

mod common;

use std::collections::BTreeMap;

use common::*;
use shapecodec::{Codec, CodecError, Decimal, Tag, Value};

// =============================================================================
// Decimal Tests
// =============================================================================

#[test]
fn test_decimal_parts() {
    let d = Decimal::new(-150, 2).unwrap();
    assert_eq!(d.mantissa(), -150);
    assert_eq!(d.scale(), 2);
    assert!(d.is_negative());
    assert_eq!(d.to_string(), "-1.50");

    assert_eq!(Decimal::new(5, 3).unwrap().to_string(), "0.005");
    assert_eq!(Decimal::new(42, 0).unwrap().to_string(), "42");
}

#[test]
fn test_decimal_wire_layout() {
    let codec = Codec::new();
    let bytes = codec.encode(&Decimal::new(-150, 2).unwrap()).unwrap();
    assert_eq!(
        bytes,
        vec![11, 150, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0x80]
    );
}

#[test]
fn test_decimal_limits() {
    assert!(matches!(Decimal::new(1, 29), Err(CodecError::UnsupportedValue(_))));
    assert!(matches!(Decimal::new(1 << 96, 0), Err(CodecError::UnsupportedValue(_))));
    assert!(Decimal::new((1 << 96) - 1, 28).is_ok());
}

#[test]
fn test_decimal_reserved_flag_bits_are_corrupt() {
    let mut raw = Decimal::new(1, 0).unwrap().to_bytes();
    raw[12] = 0x01;
    assert!(matches!(Decimal::from_bytes(raw), Err(CodecError::CorruptData(_))));

    let mut raw = [0u8; 16];
    raw[14] = 29; // scale 29
    assert!(matches!(Decimal::from_bytes(raw), Err(CodecError::CorruptData(_))));
}

// =============================================================================
// Dynamic Value Tests
// =============================================================================

#[test]
fn test_record_decodes_to_map_view() {
    let codec = Codec::new();
    let bytes = codec.encode(&sample()).unwrap();

    let value: Value = codec.decode_uncached(&bytes).unwrap();
    assert_eq!(value.tag(), Tag::Record);
    assert_eq!(value.get("b"), Some(&Value::Bool(true)));
    assert_eq!(value.get("i").and_then(Value::as_integer), Some(100));
    assert_eq!(value.get("s").and_then(Value::as_str), Some("Hello World"));
}

#[test]
fn test_value_round_trip_every_kind() {
    let codec = Codec::new();
    let mut entries = BTreeMap::new();
    entries.insert("bool".to_string(), Value::Bool(true));
    entries.insert("i8".to_string(), Value::Int8(-1));
    entries.insert("u8".to_string(), Value::UInt8(1));
    entries.insert("char".to_string(), Value::Char('x' as u16));
    entries.insert("i16".to_string(), Value::Int16(-300));
    entries.insert("u16".to_string(), Value::UInt16(300));
    entries.insert("i32".to_string(), Value::Int32(-70_000));
    entries.insert("u32".to_string(), Value::UInt32(70_000));
    entries.insert("i64".to_string(), Value::Int64(-1 << 40));
    entries.insert("u64".to_string(), Value::UInt64(1 << 40));
    entries.insert("decimal".to_string(), Value::Decimal(Decimal::new(12345, 3).unwrap()));
    entries.insert("f32".to_string(), Value::Float32(0.5));
    entries.insert("f64".to_string(), Value::Float64(-0.25));
    entries.insert("enum".to_string(), Value::Enum(4));
    entries.insert("string".to_string(), Value::from("text"));
    entries.insert(
        "sequence".to_string(),
        Value::Sequence(vec![Value::Int32(1), Value::from("two")]),
    );
    let value = Value::Map(entries);

    let bytes = codec.encode(&value).unwrap();
    assert_eq!(codec.decode_uncached::<Value>(&bytes).unwrap(), value);
}

#[test]
fn test_value_accessors() {
    let seq = Value::Sequence(vec![Value::UInt64(u64::MAX), Value::Enum(-3)]);
    let items = seq.as_sequence().unwrap();
    assert_eq!(items[0].as_integer(), Some(u64::MAX as i128));
    assert_eq!(items[1].as_integer(), Some(-3));
    assert!(Value::Float64(1.0).as_integer().is_none());
    assert!(Value::Int32(1).as_str().is_none());
    assert!(Value::Int32(1).get("x").is_none());
}

#[test]
fn test_value_display_tree() {
    let mut entries = BTreeMap::new();
    entries.insert("name".to_string(), Value::from("Ada"));
    entries.insert("tags".to_string(), Value::Sequence(vec![Value::Int32(1)]));
    let rendered = Value::Map(entries).to_string();

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "record{2}");
    assert_eq!(lines[1], "  name: \"Ada\"");
    assert_eq!(lines[2], "  tags: sequence[1]");
    assert_eq!(lines[3], "    [0] 1i32");
}
