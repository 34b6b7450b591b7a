//! Portfolio Cache - A request-coalescing read-through cache
//!
//! Shields a slow or flaky backing store from repeated reads: values are
//! served while fresh, concurrent misses on one key share a single load,
//! stale values stand in when a reload fails, and the least recently used
//! entries are evicted once the cache is full.

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, LoadOptions, ReadThroughCache};
pub use config::Config;
pub use content::{ContentSource, Locale, PortfolioContent};
pub use error::{CacheError, Result};
pub use tasks::spawn_purge_task;
