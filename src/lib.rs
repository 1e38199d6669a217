//! # shapecodec
//!
//! A self-describing binary object codec:
//! - Every value on the wire carries a one-byte type tag
//! - Composites are length-prefixed regions, so unknown content can be skipped
//! - Per-type shape plans are derived once and cached process-wide
//! - Identical input bytes can be served from a decode memoization cache
//! - Host leaf types plug in through a fixed-width extension registry
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Codec                               │
//! │          encode(&T) -> bytes     decode::<T>(bytes)          │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │                             │
//!                 ▼                             ▼
//!          ┌─────────────┐               ┌─────────────┐
//!          │   Encoder   │               │   Decoder   │◀──── DecodeCache
//!          └──────┬──────┘               └──────┬──────┘      (memo)
//!                 │                             │
//!                 └──────────────┬──────────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!         ┌───────────────┐            ┌─────────────────┐
//!         │ ShapeRegistry │            │ExtensionRegistry│
//!         │ (plan cache)  │            │ (tags 18..=26)  │
//!         └───────────────┘            └─────────────────┘
//!                 │
//!                 ▼
//!         ┌───────────────┐
//!         │   Protocol    │
//!         │ (tags, varint)│
//!         └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod macros;

pub mod error;
pub mod config;

pub mod protocol;
pub mod value;
pub mod shape;
pub mod extension;
pub mod memo;
pub mod codec;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CodecError, Result};
pub use config::{CodecConfig, UnknownFieldPolicy};
pub use protocol::Tag;
pub use value::{Decimal, Value};
pub use shape::{DynamicMap, Field, Overflow, Record, ShapePlan, Shaped};
pub use extension::{Extension, ExtensionRegistry};
pub use memo::{DecodeCache, MemoStats};
pub use codec::{
    clear_caches, decode, encode, global, install, Codec, CodecBuilder, Decode, Decoder, Encode,
    Encoder,
};

#[doc(hidden)]
pub use num_traits;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shapecodec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
