//! Decode memoization cache
//!
//! Maps exact input bytes to a previously decoded value so identical inputs skip the
//! decoder. Purely an optimization: a hit returns a clone of what a cold decode of
//! the same bytes into the same type produced.
//!
//! ## Keying
//! Entries are keyed by target type first, then by the full byte sequence. The same
//! bytes may legitimately decode into different target types (`Vec<i32>` and
//! `Value`), so bytes alone cannot identify a result. Byte keys are `Bytes`, whose
//! hash and equality are both over content.
//!
//! ## Population
//! Every successful top-level decode inserts its result while the cache holds fewer
//! than `capacity` entries and the held input bytes stay within `max_bytes`. A full
//! cache stops admitting entries until cleared; an input larger than the whole
//! byte budget is never cached.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

type Entry = Arc<dyn Any + Send + Sync>;

/// Hit/miss counters and current size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    /// Input bytes held as keys
    pub bytes: usize,
}

#[derive(Default)]
struct Entries {
    by_type: HashMap<TypeId, HashMap<Bytes, Entry>>,
    len: usize,
    bytes: usize,
}

/// Content-keyed cache of decoded values
pub struct DecodeCache {
    entries: RwLock<Entries>,
    capacity: usize,
    max_bytes: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecodeCache {
    /// Create an empty cache admitting up to `capacity` entries whose inputs total
    /// at most `max_bytes`
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity,
            max_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Previously decoded `T` for exactly these bytes
    pub fn lookup<T: Clone + 'static>(&self, bytes: &[u8]) -> Option<T> {
        let entries = self.entries.read();
        let found = entries
            .by_type
            .get(&TypeId::of::<T>())
            .and_then(|values| values.get(bytes))
            .and_then(|entry| entry.downcast_ref::<T>())
            .cloned();

        match found {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Memo hit for {} bytes", bytes.len());
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Remember `value` as the decode result of `bytes`
    ///
    /// Returns false when the entry or byte budget is exhausted. An existing entry
    /// for the same key is left in place.
    pub fn insert<T: Clone + Send + Sync + 'static>(&self, bytes: &[u8], value: &T) -> bool {
        let mut entries = self.entries.write();
        if entries.len >= self.capacity {
            tracing::warn!(
                "Decode memo cache full ({} entries), not caching {} bytes",
                self.capacity,
                bytes.len()
            );
            return false;
        }
        if bytes.len() > self.max_bytes.saturating_sub(entries.bytes) {
            tracing::debug!(
                "Decode memo byte budget of {} reached ({} held), not caching {} bytes",
                self.max_bytes,
                entries.bytes,
                bytes.len()
            );
            return false;
        }

        let values = entries.by_type.entry(TypeId::of::<T>()).or_default();
        if values.contains_key(bytes) {
            return true;
        }
        let entry: Entry = Arc::new(value.clone());
        values.insert(Bytes::copy_from_slice(bytes), entry);
        entries.len += 1;
        entries.bytes += bytes.len();
        true
    }

    pub fn len(&self) -> usize {
        self.entries.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte budget for held inputs
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn stats(&self) -> MemoStats {
        let entries = self.entries.read();
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len,
            bytes: entries.bytes,
        }
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.by_type.clear();
        entries.len = 0;
        entries.bytes = 0;
    }
}
