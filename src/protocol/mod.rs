//! Protocol Module
//!
//! Defines the tagged wire format shared by the encoder and decoder.
//!
//! ## Section Format
//!
//! ### Scalar
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Tag (1)  │  Fixed-width payload (LE)   │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### String
//! ```text
//! ┌──────────┬──────────────┬──────────────┐
//! │ Tag (1)  │ LEB128 len   │  UTF-8 bytes │
//! └──────────┴──────────────┴──────────────┘
//! ```
//!
//! ### Region (Sequence / Record)
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │  Packed sections / entries  │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! `Len` is a signed little-endian byte count of the payload, not an element count.
//! Record entries are `key (LEB128 len + UTF-8)` followed by a tagged section.
//!
//! ### Tags
//! - 1..=16: scalars (see [`Tag`])
//! - 17: sequence
//! - 18..=26: host-registered extension leaves (fixed width, no length prefix)
//! - 27: record / map

mod tag;
mod varint;

pub use tag::{Tag, EXTENSION_TAGS};
pub use varint::{read_uvarint, uvarint_len, write_uvarint, MAX_UVARINT_LEN};

/// Size of the tag byte
pub const TAG_SIZE: usize = 1;

/// Size of a region's length prefix
pub const REGION_LEN_SIZE: usize = 4;

/// Region header size: 1 byte tag + 4 bytes length
pub const REGION_HEADER_SIZE: usize = TAG_SIZE + REGION_LEN_SIZE;

/// Size of the decimal payload
pub const DECIMAL_SIZE: usize = 16;
