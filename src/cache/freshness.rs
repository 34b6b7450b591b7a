//! Freshness Policy
//!
//! Decides whether a stored entry may be served without recomputation.

use tokio::time::Instant;

use crate::cache::CacheEntry;

/// Classification of a stored entry at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within its TTL (or untimed): serve as-is
    Fresh,
    /// Past its TTL but inside the stale-while-revalidate window:
    /// serve as-is and refresh in the background
    Revalidate,
    /// Past every window: recompute, keep only as a failure fallback
    Stale,
}

impl Freshness {
    pub fn of<V>(entry: &CacheEntry<V>, now: Instant) -> Self {
        let Some(ttl) = entry.ttl else {
            return Freshness::Fresh;
        };

        let age = entry.age_at(now);
        if age < ttl {
            Freshness::Fresh
        } else if age < ttl.saturating_add(entry.stale_while_revalidate) {
            Freshness::Revalidate
        } else {
            Freshness::Stale
        }
    }

    pub fn is_fresh(self) -> bool {
        self == Freshness::Fresh
    }
}
