//! In-memory LRU cache for decoded photo variants.

use std::time::{Duration, Instant};

use hashlink::LruCache;
use tracing::trace;

use crate::types::ImageKey;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Cached handle plus the last time it was touched.
#[derive(Debug, Clone)]
pub struct CacheEntry<H> {
    pub handle: H,
    pub last_access: Instant,
}

/// Entry-count bounded LRU keyed by [`ImageKey`].
///
/// `get` refreshes both the recency order and the access timestamp, `has` does neither.
#[derive(Debug)]
pub struct ImageCache<H> {
    entries: LruCache<ImageKey, CacheEntry<H>>,
    max_entries: usize,
}

impl<H: Clone> ImageCache<H> {
    pub fn new(max_entries: usize) -> Self {
        Self { entries: LruCache::new_unbounded(), max_entries: max_entries.max(1) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn has(&self, key: &ImageKey) -> bool {
        self.entries.peek(key).is_some()
    }

    pub fn get(&mut self, key: &ImageKey) -> Option<H> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &ImageKey, now: Instant) -> Option<H> {
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        Some(entry.handle.clone())
    }

    /// Insert or replace an entry. Returns the key evicted to make room, if any.
    pub fn add(&mut self, key: ImageKey, handle: H) -> Option<ImageKey> {
        self.add_at(key, handle, Instant::now())
    }

    pub fn add_at(&mut self, key: ImageKey, handle: H, now: Instant) -> Option<ImageKey> {
        let entry = CacheEntry { handle, last_access: now };
        if self.entries.contains_key(&key) {
            self.entries.insert(key, entry);
            return None;
        }

        let evicted = if self.entries.len() >= self.max_entries {
            self.entries.remove_lru().map(|(oldest, _)| oldest)
        } else {
            None
        };
        if let Some(ref oldest) = evicted {
            trace!(target: "cache", key = %oldest, "evicted least recently used image");
        }

        self.entries.insert(key, entry);
        evicted
    }

    pub fn remove(&mut self, key: &ImageKey) -> Option<H> {
        self.entries.remove(key).map(|entry| entry.handle)
    }

    /// Drop entries not accessed within `expiry`. Returns how many were removed.
    pub fn cleanup(&mut self, expiry: Duration) -> usize {
        self.cleanup_at(expiry, Instant::now())
    }

    pub fn cleanup_at(&mut self, expiry: Duration, now: Instant) -> usize {
        let expired: Vec<ImageKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_access) > expiry)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        expired.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<H: Clone> Default for ImageCache<H> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
