//! Shape plans
//!
//! Immutable descriptors derived once per type.

use std::any::type_name;

use crate::protocol::Tag;

use super::{Record, RecordPlan};

/// A type with a derivable wire shape
pub trait Shaped: 'static {
    /// Derive the plan for this type
    ///
    /// Must not consult a `ShapeRegistry`; the registry calls this while holding
    /// its write lock.
    fn describe() -> ShapePlan;
}

/// How to encode and decode instances of one type
#[derive(Debug, Clone, PartialEq)]
pub enum ShapePlan {
    /// Leaf written with a single scalar tag
    Scalar { type_name: &'static str, tag: Tag },

    /// Host-registered fixed-width leaf
    Extension {
        type_name: &'static str,
        tag: u8,
        width: usize,
    },

    Sequence(SequencePlan),

    Map(MapPlan),

    Record(RecordLayout),

    /// Accepts any tag on decode
    Dynamic { type_name: &'static str },
}

/// Element type and construction strategy of a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePlan {
    pub type_name: &'static str,
    pub element: Box<ShapePlan>,
    pub container: ContainerKind,
}

/// How a decoded sequence is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Any number of elements
    Growable,

    /// Exactly this many elements
    Fixed(usize),
}

/// Value type of a dynamic string-keyed map
#[derive(Debug, Clone, PartialEq)]
pub struct MapPlan {
    pub type_name: &'static str,
    pub value: Box<ShapePlan>,
}

/// Field layout of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    pub type_name: &'static str,
    /// Fields in encode order
    pub fields: Vec<FieldLayout>,
    /// Unknown keys are absorbed instead of rejected
    pub dynamic: bool,
}

/// One named field of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    /// Position in encode order
    pub slot: usize,
    /// Rust type name of the field
    pub declared: &'static str,
    /// False for read-only fields, which are encoded but never assigned
    pub writable: bool,
}

impl ShapePlan {
    /// Plan for a scalar leaf
    pub fn scalar<T: ?Sized + 'static>(tag: Tag) -> Self {
        ShapePlan::Scalar {
            type_name: type_name::<T>(),
            tag,
        }
    }

    /// Plan for a record, read from its field table
    pub fn record<T: Record>() -> Self {
        ShapePlan::Record(RecordPlan::<T>::derive().layout())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ShapePlan::Scalar { type_name, .. }
            | ShapePlan::Extension { type_name, .. }
            | ShapePlan::Dynamic { type_name } => *type_name,
            ShapePlan::Sequence(plan) => plan.type_name,
            ShapePlan::Map(plan) => plan.type_name,
            ShapePlan::Record(layout) => layout.type_name,
        }
    }

    /// Tag a decoder must see for this shape; `None` when any tag is accepted
    pub fn wire_tag(&self) -> Option<Tag> {
        match self {
            ShapePlan::Scalar { tag, .. } => Some(*tag),
            ShapePlan::Extension { tag, .. } => Some(Tag::Extension(*tag)),
            ShapePlan::Sequence(_) => Some(Tag::Sequence),
            ShapePlan::Map(_) | ShapePlan::Record(_) => Some(Tag::Record),
            ShapePlan::Dynamic { .. } => None,
        }
    }

    /// True if decoding accepts arbitrary keys
    pub fn is_dynamic_map(&self) -> bool {
        match self {
            ShapePlan::Map(_) => true,
            ShapePlan::Record(layout) => layout.dynamic,
            _ => false,
        }
    }
}

impl RecordLayout {
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|field| field.name == name)
    }
}
