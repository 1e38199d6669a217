//! Shape Module
//!
//! Type metadata: how instances of a Rust type are laid out on the wire.
//!
//! ## Responsibilities
//! - Describe every encodable type as one of a closed set of shape kinds
//! - Hold the explicit field tables of record types
//! - Derive each plan once per type and share it across threads
//!
//! ## Shape Kinds
//! ```text
//!   Scalar ── fixed or length-prefixed leaf (tags 1..=16)
//!   Extension ── host-registered fixed-width leaf (tags 18..=26)
//!   Sequence ── growable or fixed-size container (tag 17)
//!   Map ── free-form string-keyed map (tag 27)
//!   Record ── named fields, optionally absorbing unknown keys (tag 27)
//!   Dynamic ── `Value`, accepts any tag
//! ```

mod plan;
mod record;
mod registry;

pub use plan::{ContainerKind, FieldLayout, MapPlan, RecordLayout, SequencePlan, ShapePlan, Shaped};
pub use record::{DynamicMap, Field, Overflow, Record, RecordPlan};
pub use registry::ShapeRegistry;
