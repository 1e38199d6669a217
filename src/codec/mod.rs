//! Codec Module
//!
//! The encode/decode engine and its entry points.
//!
//! ## Responsibilities
//! - `Encode`/`Decode` traits implemented by every wire-representable type
//! - `Codec`: owns the shape registry, extension registry and memo cache
//! - Process-wide default codec behind the free functions
//! - Stream helpers for hosts that persist or transport encoded values
//!
//! ## Data Flow
//! ```text
//!   encode(&value) ──▶ Encoder ──▶ ShapeRegistry (record field tables)
//!                         │  └───▶ ExtensionRegistry (leaf widths)
//!                         ▼
//!                       bytes
//!
//!   decode::<T>(bytes) ──▶ DecodeCache ──hit──▶ value
//!                              │ miss
//!                              ▼
//!                           Decoder ──▶ ShapeRegistry / ExtensionRegistry
//!                              │
//!                              ▼
//!                    value ──▶ DecodeCache (populate)
//! ```

mod decoder;
mod encoder;
mod impls;

use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, OnceLock};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::extension::{Extension, ExtensionRegistry};
use crate::memo::DecodeCache;
use crate::protocol::{Tag, MAX_UVARINT_LEN, REGION_LEN_SIZE};
use crate::shape::{ShapePlan, ShapeRegistry, Shaped};

pub use decoder::{Decoder, FromSequence};
pub use encoder::Encoder;

/// A value that can be written as one tagged section
pub trait Encode {
    /// Write `self` as one tagged section
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()>;

    /// True for absent values; record fields and map entries omit them
    fn is_absent(&self) -> bool {
        false
    }
}

/// A target shape that can be rebuilt from one tagged section
pub trait Decode: Shaped + Sized {
    fn decode(dec: &mut Decoder<'_, '_>) -> Result<Self>;
}

// =============================================================================
// Codec
// =============================================================================

/// The encode/decode engine
///
/// Owns all state the engine shares between calls. `Codec` is `Send + Sync`;
/// concurrent calls only contend on the brief cache insert critical sections.
pub struct Codec {
    config: CodecConfig,
    shapes: ShapeRegistry,
    extensions: ExtensionRegistry,
    memo: DecodeCache,
}

impl Codec {
    /// Create a codec with the default config and no extensions
    pub fn new() -> Self {
        let config = CodecConfig::default();
        let memo = DecodeCache::new(config.memo_capacity, config.memo_max_bytes);
        Self {
            config,
            shapes: ShapeRegistry::new(),
            extensions: ExtensionRegistry::new(),
            memo,
        }
    }

    /// Create a codec builder
    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Type metadata cache
    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Decode memoization cache
    pub fn memo(&self) -> &DecodeCache {
        &self.memo
    }

    /// Shape plan for `T`, derived once
    pub fn plan_for<T: Shaped>(&self) -> Arc<ShapePlan> {
        self.shapes.plan::<T>()
    }

    /// Encode a value into tagged bytes
    ///
    /// Fails with `UnsupportedValue` when the top-level value is absent.
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        if value.is_absent() {
            return Err(CodecError::unsupported(
                "Top-level value is absent; only values inside containers may be omitted",
            ));
        }
        let mut enc = Encoder::new(self);
        value.encode(&mut enc)?;
        Ok(enc.into_bytes().to_vec())
    }

    /// Decode bytes into `T`, consulting the memo cache first
    pub fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: Decode + Clone + Send + Sync,
    {
        if self.config.memoize {
            if let Some(value) = self.memo.lookup::<T>(bytes) {
                return Ok(value);
            }
        }

        let value = self.decode_uncached::<T>(bytes)?;
        if self.config.memoize {
            self.memo.insert(bytes, &value);
        }
        Ok(value)
    }

    /// Decode bytes into `T` without touching the memo cache
    ///
    /// The whole input must be one value; trailing bytes are `CorruptData`.
    pub fn decode_uncached<T: Decode>(&self, bytes: &[u8]) -> Result<T> {
        let mut dec = Decoder::new(self, bytes);
        let value = T::decode(&mut dec)?;
        dec.finish()?;
        Ok(value)
    }

    /// Drop every cached shape plan and memoized decode
    pub fn clear_caches(&self) {
        self.shapes.clear();
        self.memo.clear();
        tracing::debug!("Cleared shape registry and decode memo cache");
    }

    // =========================================================================
    // Stream-based I/O helpers
    // =========================================================================

    /// Encode a value and write it to a stream
    pub fn write_value<W: Write, T: Encode + ?Sized>(&self, writer: &mut W, value: &T) -> Result<()> {
        let bytes = self.encode(value)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Read the bytes of exactly one tagged section from a stream
    ///
    /// Returns `None` on a clean end of stream before the tag byte. Uses only the
    /// framing information (tag, width, length prefix); the payload is not decoded.
    pub fn read_frame<R: Read>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
        let mut tag_byte = [0u8; 1];
        loop {
            match reader.read(&mut tag_byte) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let tag = Tag::try_from(tag_byte[0])?;
        let mut frame = vec![tag_byte[0]];
        match tag {
            Tag::String => {
                // Prefix bytes until one without the continuation bit
                let mut prefix = Vec::with_capacity(MAX_UVARINT_LEN);
                loop {
                    let mut byte = [0u8; 1];
                    reader.read_exact(&mut byte)?;
                    prefix.push(byte[0]);
                    if byte[0] & 0x80 == 0 || prefix.len() == MAX_UVARINT_LEN {
                        break;
                    }
                }
                let (len, _) = crate::protocol::read_uvarint(&prefix)?;
                if len > self.config.max_region_len {
                    return Err(CodecError::corrupt(format!(
                        "String length {} exceeds the region limit of {}",
                        len, self.config.max_region_len
                    )));
                }
                frame.extend_from_slice(&prefix);
                Self::read_payload(reader, &mut frame, len as usize)?;
            }
            Tag::Sequence | Tag::Record => {
                let mut len_bytes = [0u8; REGION_LEN_SIZE];
                reader.read_exact(&mut len_bytes)?;
                let len = i32::from_le_bytes(len_bytes);
                if len < 0 || len as u32 > self.config.max_region_len {
                    return Err(CodecError::corrupt(format!("Invalid {} length {}", tag, len)));
                }
                frame.extend_from_slice(&len_bytes);
                Self::read_payload(reader, &mut frame, len as usize)?;
            }
            Tag::Extension(ext) => {
                let width = self
                    .extensions
                    .width(ext)
                    .ok_or_else(|| CodecError::corrupt(format!("Unsupported extension tag {}", ext)))?;
                Self::read_payload(reader, &mut frame, width)?;
            }
            fixed => {
                let width = fixed.fixed_width().unwrap_or(0);
                Self::read_payload(reader, &mut frame, width)?;
            }
        }
        Ok(Some(frame))
    }

    /// Read one section from a stream and decode it
    pub fn read_value<R, T>(&self, reader: &mut R) -> Result<T>
    where
        R: Read,
        T: Decode + Clone + Send + Sync,
    {
        let frame = self.read_frame(reader)?.ok_or_else(|| {
            CodecError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "stream ended before a value",
            ))
        })?;
        self.decode(&frame)
    }

    /// Append exactly `len` bytes; the frame only grows as bytes arrive
    fn read_payload<R: Read>(reader: &mut R, frame: &mut Vec<u8>, len: usize) -> Result<()> {
        let read = reader.by_ref().take(len as u64).read_to_end(frame)?;
        if read != len {
            return Err(CodecError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended {} bytes into a {} byte payload", read, len),
            )));
        }
        Ok(())
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for Codec
#[derive(Default)]
pub struct CodecBuilder {
    config: CodecConfig,
    extensions: ExtensionRegistry,
}

impl CodecBuilder {
    /// Set the codec configuration
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a host extension type
    pub fn extension<E: Extension>(mut self) -> Result<Self> {
        self.extensions.register::<E>()?;
        Ok(self)
    }

    /// Register an extension tag by width alone (decodes into `Value::Extension`)
    pub fn raw_extension(mut self, tag: u8, width: usize) -> Result<Self> {
        self.extensions.register_raw(tag, width, "opaque")?;
        Ok(self)
    }

    /// Replace the extension registry wholesale
    pub fn extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn build(self) -> Result<Codec> {
        self.config.validate()?;
        let memo = DecodeCache::new(self.config.memo_capacity, self.config.memo_max_bytes);
        Ok(Codec {
            config: self.config,
            shapes: ShapeRegistry::new(),
            extensions: self.extensions,
            memo,
        })
    }
}

// =============================================================================
// Process-wide codec
// =============================================================================

static GLOBAL: OnceLock<Codec> = OnceLock::new();

/// The process-wide codec, created with defaults on first use
pub fn global() -> &'static Codec {
    GLOBAL.get_or_init(Codec::new)
}

/// Install `codec` as the process-wide codec
///
/// Fails if the process-wide codec was already installed or used.
pub fn install(codec: Codec) -> Result<&'static Codec> {
    GLOBAL
        .set(codec)
        .map_err(|_| CodecError::Config("Process-wide codec is already initialized".to_string()))?;
    Ok(global())
}

/// Encode with the process-wide codec
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    global().encode(value)
}

/// Decode with the process-wide codec
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: Decode + Clone + Send + Sync,
{
    global().decode(bytes)
}

/// Reset the process-wide codec's shape registry and memo cache
pub fn clear_caches() {
    global().clear_caches();
}
