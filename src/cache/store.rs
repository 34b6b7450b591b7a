//! Cache Store Module
//!
//! Bounded storage combining a HashMap with LRU tracking.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, LruTracker};

// == Cache Store ==
/// Capacity-bounded entry storage with LRU eviction.
///
/// The store never judges freshness on its own: expired entries stay until
/// they are replaced, deleted, evicted, or purged, so they remain available
/// as a fallback value.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Entries dropped by the LRU policy so far
    evictions: u64,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A capacity of zero is raised to one so that an insert never evicts itself.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries: max_entries.max(1),
            evictions: 0,
        }
    }

    // == Set ==
    /// Stores a value produced now.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Option<String> {
        self.insert(key.into(), CacheEntry::new(value, ttl))
    }

    // == Insert ==
    /// Inserts or replaces an entry and marks it most recently used.
    ///
    /// If the key is new and the store is at capacity, the least recently
    /// used entry is evicted first. Returns the evicted key, if any.
    pub fn insert(&mut self, key: String, entry: CacheEntry<V>) -> Option<String> {
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.evictions += 1;
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, entry);

        debug_assert!(
            self.entries.len() <= self.max_entries,
            "cache store holds {} entries, capacity is {}",
            self.entries.len(),
            self.max_entries
        );
        debug_assert_eq!(self.entries.len(), self.lru.len());

        evicted
    }

    // == Get ==
    /// Returns the entry for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        if self.entries.contains_key(key) {
            self.lru.touch(key);
        }
        self.entries.get(key)
    }

    /// Returns the entry for `key` without changing its recency.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    // == Purge ==
    /// Removes entries that have been unusable for longer than `retention`.
    ///
    /// An entry is dropped once its age reaches TTL + revalidation window +
    /// `retention`. Untimed entries and keys for which `keep` returns true
    /// are left alone. Returns the number of entries removed.
    pub fn purge(&mut self, retention: Duration, keep: impl Fn(&str) -> bool) -> usize {
        let now = Instant::now();
        let dead: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                !keep(key.as_str())
                    && entry
                        .usable_for()
                        .is_some_and(|usable| entry.age_at(now) >= usable.saturating_add(retention))
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &dead {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        dead.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}
