//! Extension registry
//!
//! Maps reserved tags to payload widths.

use std::any::type_name;

use crate::error::{CodecError, Result};
use crate::protocol::EXTENSION_TAGS;

use super::Extension;

const SLOT_COUNT: usize = 9;

/// A registered extension tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionSlot {
    pub tag: u8,
    pub width: usize,
    pub type_name: &'static str,
}

/// Registered extension tags
///
/// Built before the `Codec` and frozen inside it, so lookups take no lock.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    slots: [Option<ExtensionSlot>; SLOT_COUNT],
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host value type
    pub fn register<E: Extension>(&mut self) -> Result<()> {
        self.register_raw(E::TAG, E::WIDTH, type_name::<E>())
    }

    /// Register a tag by width alone
    ///
    /// Enough to decode the tag into `Value::Extension`. Registering the same
    /// `(tag, width, type_name)` twice is a no-op; any other reuse of a tag fails.
    pub fn register_raw(&mut self, tag: u8, width: usize, type_name: &'static str) -> Result<()> {
        let index = Self::slot_index(tag).ok_or_else(|| {
            CodecError::Registration(format!(
                "Tag {} is outside the extension range {}..={}",
                tag,
                EXTENSION_TAGS.start(),
                EXTENSION_TAGS.end()
            ))
        })?;
        if width == 0 {
            return Err(CodecError::Registration(format!(
                "Extension {} on tag {} must have a non-zero width",
                type_name, tag
            )));
        }

        let slot = ExtensionSlot {
            tag,
            width,
            type_name,
        };
        match self.slots[index] {
            Some(existing) if existing == slot => Ok(()),
            Some(existing) => Err(CodecError::Registration(format!(
                "Tag {} is already registered to {} ({} bytes)",
                tag, existing.type_name, existing.width
            ))),
            None => {
                tracing::debug!("Registered extension {} on tag {} ({} bytes)", type_name, tag, width);
                self.slots[index] = Some(slot);
                Ok(())
            }
        }
    }

    /// Slot registered for `tag`
    pub fn get(&self, tag: u8) -> Option<&ExtensionSlot> {
        Self::slot_index(tag).and_then(|index| self.slots[index].as_ref())
    }

    /// Payload width registered for `tag`
    pub fn width(&self, tag: u8) -> Option<usize> {
        self.get(tag).map(|slot| slot.width)
    }

    /// Registered slots in tag order
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionSlot> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_index(tag: u8) -> Option<usize> {
        if EXTENSION_TAGS.contains(&tag) {
            Some((tag - EXTENSION_TAGS.start()) as usize)
        } else {
            None
        }
    }
}
