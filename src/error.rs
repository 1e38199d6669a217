//! Error types for shapecodec
//!
//! Provides a unified error type for all encode/decode operations.

use thiserror::Error;

use crate::protocol::Tag;

/// Result type alias using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

/// Unified error type for shapecodec operations
///
/// Every variant is fatal to the call that produced it. The engine performs no I/O
/// of its own (except the stream helpers), so failures are deterministic functions
/// of the input value or byte sequence and are never worth retrying.
#[derive(Debug, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // Encode Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch: wire carries {wire}, target expects {expected}")]
    TypeMismatch { wire: Tag, expected: Tag },

    #[error("Unknown field `{key}` for record type {type_name}")]
    UnknownField { type_name: &'static str, key: String },

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Setup Errors
    // -------------------------------------------------------------------------
    #[error("Extension registration error: {0}")]
    Registration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CodecError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        CodecError::CorruptData(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        CodecError::UnsupportedValue(message.into())
    }
}
