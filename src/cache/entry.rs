//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the producer delivered the value
    pub created_at: Instant,
    /// Freshness window, None = never expires by time
    pub ttl: Option<Duration>,
    /// Extra window after `ttl` during which the value may be served while refreshing
    pub stale_while_revalidate: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry produced now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Optional freshness window
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self::created_at(value, ttl, Instant::now())
    }

    /// Creates an entry with an explicit creation instant.
    pub fn created_at(value: V, ttl: Option<Duration>, created_at: Instant) -> Self {
        Self {
            value,
            created_at,
            ttl,
            stale_while_revalidate: Duration::ZERO,
        }
    }

    pub fn with_stale_while_revalidate(mut self, window: Duration) -> Self {
        self.stale_while_revalidate = window;
        self
    }

    // == Age ==
    /// Time elapsed since the value was produced.
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Expired ==
    /// Checks whether the freshness window has elapsed.
    ///
    /// Boundary condition: once the full TTL has elapsed the entry is expired,
    /// so a zero TTL is never fresh.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => self.age_at(now) >= ttl,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining freshness, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        let age = self.age();
        self.ttl.map(|ttl| ttl.saturating_sub(age))
    }

    /// Total time the entry stays usable: TTL plus the revalidation window.
    pub fn usable_for(&self) -> Option<Duration> {
        self.ttl.map(|ttl| ttl.saturating_add(self.stale_while_revalidate))
    }
}
