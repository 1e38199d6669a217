//! Process-wide Codec Tests
//!
//! Kept in its own test binary: installing the process-wide codec can only
//! happen once per process.

mod common;

use common::*;
use shapecodec::{CodecConfig, CodecError, UnknownFieldPolicy, Value};

#[test]
fn test_install_then_free_functions() {
    let config = CodecConfig::builder()
        .unknown_fields(UnknownFieldPolicy::Skip)
        .build();
    let codec = shapecodec::Codec::builder()
        .config(config)
        .extension::<Vec3>()
        .unwrap()
        .build()
        .unwrap();

    let installed = shapecodec::install(codec).unwrap();
    assert!(std::ptr::eq(installed, shapecodec::global()));
    assert_eq!(
        shapecodec::global().config().unknown_fields,
        UnknownFieldPolicy::Skip
    );

    let bytes = shapecodec::encode(&sample()).unwrap();
    let decoded: Sample = shapecodec::decode(&bytes).unwrap();
    assert_eq!(decoded, sample());

    let v = Vec3 { x: 1.0, y: 2.0, z: 3.0 };
    let bytes = shapecodec::encode(&v).unwrap();
    assert_eq!(shapecodec::decode::<Vec3>(&bytes).unwrap(), v);

    shapecodec::clear_caches();
    assert!(shapecodec::global().memo().is_empty());
    assert!(shapecodec::global().shapes().is_empty());
    let view: Value = shapecodec::decode(&bytes).unwrap();
    assert!(matches!(view, Value::Extension { tag: 18, .. }));

    let again = shapecodec::install(shapecodec::Codec::new());
    assert!(matches!(again, Err(CodecError::Config(_))));
}
