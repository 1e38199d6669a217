//! Extension Module
//!
//! The seam through which host-specific fixed-layout value types (vectors, colors,
//! bounds, ...) plug into tag dispatch.
//!
//! ## Responsibilities
//! - Reserve tags 18..=26 for host leaf types
//! - Record each registered tag's exact payload width
//! - Keep extension payloads opaque to the engine
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Tag (1)  │  Payload (registry width)   │
//! └──────────┴─────────────────────────────┘
//! ```
//! No length prefix: a decoder that has not registered the tag cannot find the end
//! of the payload, so an unregistered extension tag is treated as corrupt input.

mod registry;

use bytes::BytesMut;

use crate::error::Result;

pub use registry::{ExtensionRegistry, ExtensionSlot};

/// A host value type with a fixed-width payload
///
/// Invoke [`extension_codec!`](crate::extension_codec) to make the type encodable.
pub trait Extension: Sized + 'static {
    /// Reserved tag, one of 18..=26
    const TAG: u8;

    /// Exact payload width in bytes
    const WIDTH: usize;

    /// Append exactly `WIDTH` bytes
    fn write_payload(&self, out: &mut BytesMut);

    /// Parse a payload of exactly `WIDTH` bytes
    fn read_payload(payload: &[u8]) -> Result<Self>;
}
