//! Shape Registry Tests
//!
//! Plan derivation, caching and the field tables records expose.

mod common;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use common::*;
use shapecodec::shape::{ContainerKind, ShapeRegistry};
use shapecodec::{Codec, ShapePlan, Tag, Value};

// =============================================================================
// Caching Tests
// =============================================================================

#[test]
fn test_plan_derived_once() {
    let codec = Codec::new();

    let first = codec.plan_for::<Sample>();
    let second = codec.plan_for::<Sample>();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(codec.shapes().derivations(), 1);

    let a = codec.encode(&sample()).unwrap();
    let b = codec.encode(&sample()).unwrap();
    assert_eq!(a, b);

    // The field table is derived once on first encode
    assert_eq!(codec.shapes().derivations(), 2);
}

#[test]
fn test_record_plan_shared() {
    let registry = ShapeRegistry::new();

    let first = registry.record_plan::<Person>().unwrap();
    let second = registry.record_plan::<Person>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.derivations(), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_clear_forces_rederivation() {
    let registry = ShapeRegistry::new();
    let before = registry.plan::<Vec<i32>>();

    registry.clear();
    assert!(registry.is_empty());

    let after = registry.plan::<Vec<i32>>();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before, after);
    assert_eq!(registry.derivations(), 2);
}

#[test]
fn test_codec_clear_caches() {
    let codec = Codec::new();
    let bytes = codec.encode(&sample()).unwrap();
    let _: Sample = codec.decode(&bytes).unwrap();
    assert!(!codec.shapes().is_empty());
    assert!(!codec.memo().is_empty());

    codec.clear_caches();
    assert!(codec.shapes().is_empty());
    assert!(codec.memo().is_empty());

    // Still fully functional afterwards
    assert_eq!(codec.decode::<Sample>(&bytes).unwrap(), sample());
}

// =============================================================================
// Plan Shape Tests
// =============================================================================

#[test]
fn test_scalar_plans() {
    let codec = Codec::new();

    assert_eq!(codec.plan_for::<i32>().wire_tag(), Some(Tag::Int32));
    assert_eq!(codec.plan_for::<String>().wire_tag(), Some(Tag::String));
    assert_eq!(codec.plan_for::<Color>().wire_tag(), Some(Tag::Enum));
    // Nullable targets unwrap to their inner shape
    assert_eq!(*codec.plan_for::<Option<u64>>(), *codec.plan_for::<u64>());
    assert_eq!(codec.plan_for::<Value>().wire_tag(), None);
}

#[test]
fn test_sequence_plans() {
    let codec = Codec::new();

    match codec.plan_for::<Vec<String>>().as_ref() {
        ShapePlan::Sequence(plan) => {
            assert_eq!(plan.container, ContainerKind::Growable);
            assert_eq!(plan.element.wire_tag(), Some(Tag::String));
        }
        other => panic!("Expected sequence plan, got {:?}", other),
    }

    match codec.plan_for::<[u8; 4]>().as_ref() {
        ShapePlan::Sequence(plan) => assert_eq!(plan.container, ContainerKind::Fixed(4)),
        other => panic!("Expected sequence plan, got {:?}", other),
    }
}

#[test]
fn test_map_plans_are_dynamic() {
    let codec = Codec::new();

    let hash = codec.plan_for::<HashMap<String, i32>>();
    assert!(hash.is_dynamic_map());
    assert_eq!(hash.wire_tag(), Some(Tag::Record));

    let tree = codec.plan_for::<BTreeMap<String, Vec<Value>>>();
    match tree.as_ref() {
        ShapePlan::Map(plan) => assert_eq!(plan.value.wire_tag(), Some(Tag::Sequence)),
        other => panic!("Expected map plan, got {:?}", other),
    }
}

#[test]
fn test_record_layout() {
    let codec = Codec::new();
    let plan = codec.plan_for::<Person>();

    let layout = match plan.as_ref() {
        ShapePlan::Record(layout) => layout,
        other => panic!("Expected record plan, got {:?}", other),
    };
    assert_eq!(layout.type_name, "Person");
    assert!(!layout.dynamic);
    assert!(!plan.is_dynamic_map());

    let names: Vec<_> = layout.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["name", "nickname", "age"]);

    let age = layout.field("age").unwrap();
    assert_eq!(age.slot, 2);
    assert_eq!(age.declared, "u8");
    assert!(age.writable);
}

#[test]
fn test_read_only_field_layout() {
    let codec = Codec::new();
    let plan = codec.plan_for::<Invoice>();

    match plan.as_ref() {
        ShapePlan::Record(layout) => {
            let total = layout.field("total").unwrap();
            assert!(!total.writable);
            assert_eq!(total.declared, "i32");
            assert!(layout.field("quantity").unwrap().writable);
        }
        other => panic!("Expected record plan, got {:?}", other),
    }
}

#[test]
fn test_dynamic_record_layout() {
    let codec = Codec::new();
    let plan = codec.plan_for::<Document>();
    assert!(plan.is_dynamic_map());

    let table = codec.shapes().record_plan::<Document>().unwrap();
    assert!(table.is_dynamic());
    assert_eq!(table.fields().len(), 1);
    assert!(table.field("title").is_some());
    assert!(table.field("author").is_none());
}

#[test]
fn test_recursive_record_plan() {
    let codec = Codec::new();
    let plan = codec.plan_for::<TreeNode>();

    match plan.as_ref() {
        ShapePlan::Record(layout) => {
            let children = layout.field("children").unwrap();
            assert!(children.declared.contains("Vec"));
        }
        other => panic!("Expected record plan, got {:?}", other),
    }
}
