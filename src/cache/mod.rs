//! Cache Module
//!
//! Provides a bounded read-through cache with TTL freshness, LRU eviction,
//! and single-flight loading.

mod entry;
mod freshness;
mod lru;
mod read_through;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use freshness::Freshness;
pub use lru::LruTracker;
pub use read_through::{LoadOptions, ReadThroughCache};
pub use stats::CacheStats;
pub use store::CacheStore;
