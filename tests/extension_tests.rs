//! Extension Registry Tests
//!
//! Registration rules and fixed-width extension leaves on the wire.

mod common;

use bytes::Bytes;
use common::*;
use shapecodec::{Codec, CodecError, ExtensionRegistry, Tag, Value};

fn vector_codec() -> Codec {
    Codec::builder().extension::<Vec3>().unwrap().build().unwrap()
}

// =============================================================================
// Registration Tests
// =============================================================================

#[test]
fn test_register_extension() {
    let mut registry = ExtensionRegistry::new();
    registry.register::<Vec3>().unwrap();

    assert_eq!(registry.width(18), Some(12));
    assert_eq!(registry.len(), 1);
    assert!(registry.get(19).is_none());
    assert!(registry.get(5).is_none());
}

#[test]
fn test_register_same_slot_twice_is_noop() {
    let mut registry = ExtensionRegistry::new();
    registry.register::<Vec3>().unwrap();
    registry.register::<Vec3>().unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_register_conflicting_tag() {
    let mut registry = ExtensionRegistry::new();
    registry.register::<Vec3>().unwrap();

    let err = registry.register_raw(18, 8, "Other").unwrap_err();
    assert!(matches!(err, CodecError::Registration(_)));
}

#[test]
fn test_register_outside_range() {
    let mut registry = ExtensionRegistry::new();
    for tag in [0u8, 17, 27, 200] {
        let err = registry.register_raw(tag, 4, "Bad").unwrap_err();
        assert!(matches!(err, CodecError::Registration(_)));
    }
    assert!(registry.is_empty());
}

#[test]
fn test_register_zero_width() {
    let mut registry = ExtensionRegistry::new();
    let err = registry.register_raw(20, 0, "Empty").unwrap_err();
    assert!(matches!(err, CodecError::Registration(_)));
}

#[test]
fn test_registry_iterates_in_tag_order() {
    let mut registry = ExtensionRegistry::new();
    registry.register_raw(26, 1, "Last").unwrap();
    registry.register_raw(18, 2, "First").unwrap();

    let tags: Vec<u8> = registry.iter().map(|slot| slot.tag).collect();
    assert_eq!(tags, vec![18, 26]);
}

// =============================================================================
// Wire Tests
// =============================================================================

#[test]
fn test_extension_round_trip() {
    let codec = vector_codec();
    let v = Vec3 {
        x: 1.0,
        y: -2.5,
        z: 0.125,
    };

    let bytes = codec.encode(&v).unwrap();
    assert_eq!(bytes.len(), 1 + 12);
    assert_eq!(bytes[0], 18);
    assert_eq!(&bytes[1..5], &1.0f32.to_le_bytes());

    assert_eq!(codec.decode_uncached::<Vec3>(&bytes).unwrap(), v);
}

#[test]
fn test_extension_inside_sequence() {
    let codec = vector_codec();
    let path = vec![Vec3::default(), Vec3 { x: 1.0, y: 1.0, z: 1.0 }];

    let bytes = codec.encode(&path).unwrap();
    assert_eq!(bytes.len(), 5 + 2 * 13);
    assert_eq!(codec.decode_uncached::<Vec<Vec3>>(&bytes).unwrap(), path);
}

#[test]
fn test_extension_as_opaque_value() {
    let codec = vector_codec();
    let bytes = codec.encode(&Vec3 { x: 1.0, y: 2.0, z: 3.0 }).unwrap();

    let value: Value = codec.decode_uncached(&bytes).unwrap();
    match &value {
        Value::Extension { tag, payload } => {
            assert_eq!(*tag, 18);
            assert_eq!(payload.len(), 12);
        }
        other => panic!("Expected extension value, got {:?}", other),
    }
    assert_eq!(value.tag(), Tag::Extension(18));

    // Opaque payloads re-encode byte for byte
    assert_eq!(codec.encode(&value).unwrap(), bytes);
}

#[test]
fn test_raw_extension_registration_decodes_to_value() {
    let codec = Codec::builder().raw_extension(21, 3).unwrap().build().unwrap();
    let bytes = [21, 0xAA, 0xBB, 0xCC];

    let value: Value = codec.decode_uncached(&bytes).unwrap();
    assert_eq!(
        value,
        Value::Extension {
            tag: 21,
            payload: Bytes::from_static(&[0xAA, 0xBB, 0xCC]),
        }
    );
}

#[test]
fn test_unregistered_extension_encode_is_unsupported() {
    let codec = Codec::new();
    let err = codec.encode(&Vec3::default()).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValue(_)));

    let opaque = Value::Extension {
        tag: 22,
        payload: Bytes::from_static(&[1, 2]),
    };
    let err = codec.encode(&opaque).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValue(_)));
}

#[test]
fn test_unregistered_extension_decode_is_corrupt() {
    let bytes = vector_codec().encode(&Vec3::default()).unwrap();

    let codec = Codec::new();
    let err = codec.decode_uncached::<Value>(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::CorruptData(_)));
}

#[test]
fn test_payload_width_enforced_on_encode() {
    let codec = Codec::builder().extension::<Short>().unwrap().build().unwrap();

    let err = codec.encode(&Short(7)).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValue(_)));

    // Opaque payload of the wrong width
    let opaque = Value::Extension {
        tag: 19,
        payload: Bytes::from_static(&[1, 2, 3]),
    };
    let err = codec.encode(&opaque).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedValue(_)));
}

#[test]
fn test_truncated_extension_payload_is_corrupt() {
    let codec = vector_codec();
    let bytes = codec.encode(&Vec3::default()).unwrap();

    let err = codec.decode_uncached::<Vec3>(&bytes[..8]).unwrap_err();
    assert!(matches!(err, CodecError::CorruptData(_)));
}
