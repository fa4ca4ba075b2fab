//! In-memory cache of decoded photo variants.

pub mod memory;

pub use memory::{CacheEntry, DEFAULT_MAX_ENTRIES, ImageCache};
