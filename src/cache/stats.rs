//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, loads, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups that found nothing usable (absent or stale)
    pub misses: u64,
    /// Producer runs started
    pub loads: u64,
    /// Producer runs that failed or panicked
    pub load_failures: u64,
    /// Callers that attached to an already in-flight producer run
    pub coalesced: u64,
    /// Values served past their TTL (revalidation or stale-on-error fallback)
    pub stale_served: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Producer runs currently in flight
    pub in_flight: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    pub fn record_stale_served(&mut self) {
        self.stale_served += 1;
    }

    // == Update Gauges ==
    /// Copies the store-derived figures into this snapshot.
    pub fn set_store_figures(&mut self, evictions: u64, total_entries: usize, in_flight: usize) {
        self.evictions = evictions;
        self.total_entries = total_entries;
        self.in_flight = in_flight;
    }
}
