//! Configuration for shapecodec
//!
//! Centralized configuration with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Main configuration for a `Codec` instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    // -------------------------------------------------------------------------
    // Traversal Limits
    // -------------------------------------------------------------------------
    /// Maximum number of nested regions (sequences, records, maps) per value
    pub max_depth: usize,

    /// Maximum payload length of a single region, in bytes
    /// Capped at `i32::MAX` by the wire format.
    pub max_region_len: u32,

    // -------------------------------------------------------------------------
    // Decode Policy
    // -------------------------------------------------------------------------
    /// What a fixed record does with a key it has no field for
    pub unknown_fields: UnknownFieldPolicy,

    // -------------------------------------------------------------------------
    // Memoization
    // -------------------------------------------------------------------------
    /// Consult and populate the decode memoization cache
    pub memoize: bool,

    /// Max number of memoized decode results
    pub memo_capacity: usize,

    /// Max total size of memoized inputs, in bytes
    pub memo_max_bytes: usize,
}

/// Unknown key handling for fixed (non-dynamic) record targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownFieldPolicy {
    /// Fail with `CodecError::UnknownField`
    Reject,

    /// Skip over the entry's value and continue
    Skip,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_region_len: 16 * 1024 * 1024, // 16 MB
            unknown_fields: UnknownFieldPolicy::Reject,
            memoize: true,
            memo_capacity: 1024,
            memo_max_bytes: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl CodecConfig {
    /// Create a new config builder
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Check the config for values the wire format cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(CodecError::Config("max_depth must be at least 1".to_string()));
        }
        if self.max_region_len > i32::MAX as u32 {
            return Err(CodecError::Config(format!(
                "max_region_len {} exceeds the wire limit of {}",
                self.max_region_len,
                i32::MAX
            )));
        }
        Ok(())
    }
}

/// Builder for CodecConfig
#[derive(Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the maximum region payload length (in bytes)
    pub fn max_region_len(mut self, len: u32) -> Self {
        self.config.max_region_len = len;
        self
    }

    /// Set the unknown field policy for fixed records
    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.config.unknown_fields = policy;
        self
    }

    /// Enable or disable decode memoization
    pub fn memoize(mut self, enabled: bool) -> Self {
        self.config.memoize = enabled;
        self
    }

    /// Set the memoization cache capacity (in entries)
    pub fn memo_capacity(mut self, entries: usize) -> Self {
        self.config.memo_capacity = entries;
        self
    }

    /// Set the memoization byte budget
    pub fn memo_max_bytes(mut self, bytes: usize) -> Self {
        self.config.memo_max_bytes = bytes;
        self
    }

    pub fn build(self) -> CodecConfig {
        self.config
    }
}
