//! Read-Through Cache Module
//!
//! Get-or-populate access on top of [`CacheStore`] with single-flight
//! coalescing of producer calls and stale-on-error fallback.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEntry, CacheStats, CacheStore, Freshness};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// A pending producer run that every interested caller can await.
type Flight<V> = Shared<BoxFuture<'static, Result<V>>>;

// == Load Options ==
/// Per-call knobs for [`ReadThroughCache::get_or_load_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Freshness window for a newly produced value, None = never expires
    pub ttl: Option<Duration>,
    /// Window past `ttl` in which the old value is served while refreshing
    pub stale_while_revalidate: Duration,
    /// Skip the lookup and always produce (still coalesced with in-flight runs)
    pub force_fresh: bool,
    /// Serve the stored value when the producer fails
    pub fallback_to_cache: bool,
}

impl LoadOptions {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            stale_while_revalidate: Duration::ZERO,
            force_fresh: false,
            fallback_to_cache: true,
        }
    }

    /// Options carrying the configured TTL and revalidation window.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Some(config.ttl())).stale_while_revalidate(config.stale_while_revalidate())
    }

    pub fn stale_while_revalidate(mut self, window: Duration) -> Self {
        self.stale_while_revalidate = window;
        self
    }

    pub fn force_fresh(mut self) -> Self {
        self.force_fresh = true;
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback_to_cache = false;
        self
    }
}

struct Inner<V> {
    store: CacheStore<V>,
    in_flight: HashMap<String, Flight<V>>,
    stats: CacheStats,
}

// == Read-Through Cache ==
/// Shared, cloneable handle to a bounded read-through cache.
///
/// Construct one per process and pass clones to whoever needs it. The store,
/// the in-flight registry and the counters sit behind a single mutex, which
/// is never held while a producer runs.
///
/// Producers run on spawned tokio tasks, so every call must happen inside a
/// tokio runtime. A production runs to completion and is stored even if all
/// callers waiting on it go away.
pub struct ReadThroughCache<V> {
    inner: Arc<Mutex<Inner<V>>>,
}

impl<V> Clone for ReadThroughCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> ReadThroughCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store: CacheStore::new(max_entries),
                in_flight: HashMap::new(),
                stats: CacheStats::new(),
            })),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries)
    }

    // == Get Or Load ==
    /// Returns the value for `key`, producing and caching it on a miss.
    ///
    /// Concurrent calls for the same key share a single producer run; the
    /// producer is dropped unused when one is already in flight. When the run
    /// fails and a stale value is still stored, that value is returned instead.
    pub async fn get_or_load<F, Fut>(&self, key: &str, ttl: Option<Duration>, producer: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        self.get_or_load_with(key, LoadOptions::new(ttl), producer)
            .await
    }

    /// [`get_or_load`](Self::get_or_load) with explicit [`LoadOptions`].
    pub async fn get_or_load_with<F, Fut>(
        &self,
        key: &str,
        options: LoadOptions,
        producer: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        validate_key(key)?;

        let flight = {
            let mut inner = self.inner.lock().await;

            if !options.force_fresh {
                let now = Instant::now();
                let cached = inner
                    .store
                    .get(key)
                    .map(|entry| (Freshness::of(entry, now), entry.value.clone()));

                match cached {
                    Some((Freshness::Fresh, value)) => {
                        inner.stats.record_hit();
                        debug!(key, "cache hit");
                        return Ok(value);
                    }
                    Some((Freshness::Revalidate, value)) => {
                        inner.stats.record_stale_served();
                        if !inner.in_flight.contains_key(key) {
                            debug!(key, "serving stale value while revalidating");
                            drop(self.start_flight(&mut inner, key, options, true, producer));
                        }
                        return Ok(value);
                    }
                    Some((Freshness::Stale, _)) | None => {}
                }
            }

            inner.stats.record_miss();
            let pending = inner.in_flight.get(key).cloned();
            match pending {
                Some(flight) => {
                    inner.stats.record_coalesced();
                    debug!(key, "joining in-flight load");
                    flight
                }
                None => self.start_flight(&mut inner, key, options, false, producer),
            }
        };

        flight.await
    }

    /// Registers and spawns a producer run for `key`. Caller holds the lock.
    ///
    /// `background` marks a revalidation whose caller was already served.
    fn start_flight<F, Fut>(
        &self,
        inner: &mut Inner<V>,
        key: &str,
        options: LoadOptions,
        background: bool,
        producer: F,
    ) -> Flight<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        inner.stats.record_load();
        info!(key, "loading fresh value");

        let cache = self.clone();
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(async move { producer().await })
                .catch_unwind()
                .await
            {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(cause)) => Err(CacheError::Producer {
                    key: task_key.clone(),
                    cause: Arc::new(cause),
                }),
                Err(_) => Err(CacheError::ProducerAborted {
                    key: task_key.clone(),
                    reason: "producer panicked".to_string(),
                }),
            };
            cache.settle(&task_key, options, background, outcome).await
        });

        let join_key = key.to_string();
        let flight = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(CacheError::ProducerAborted {
                    key: join_key,
                    reason: err.to_string(),
                }),
            }
        }
        .boxed()
        .shared();

        inner.in_flight.insert(key.to_string(), flight.clone());
        flight
    }

    /// Applies a finished producer run: store or fall back, then unregister.
    async fn settle(
        &self,
        key: &str,
        options: LoadOptions,
        background: bool,
        outcome: Result<V>,
    ) -> Result<V> {
        let mut inner = self.inner.lock().await;
        inner.in_flight.remove(key);

        match outcome {
            Ok(value) => {
                let entry = CacheEntry::new(value.clone(), options.ttl)
                    .with_stale_while_revalidate(options.stale_while_revalidate);
                if let Some(evicted) = inner.store.insert(key.to_string(), entry) {
                    debug!(key, evicted = %evicted, "evicted least recently used entry");
                }
                Ok(value)
            }
            Err(err) => {
                inner.stats.record_load_failure();

                let fallback = if options.fallback_to_cache {
                    inner
                        .store
                        .get(key)
                        .map(|entry| (entry.value.clone(), entry.age()))
                } else {
                    None
                };

                if let Some((value, age)) = fallback {
                    inner.stats.record_stale_served();
                    warn!(
                        key,
                        age_ms = age.as_millis() as u64,
                        error = %err,
                        "load failed, serving stale value"
                    );
                    return Ok(value);
                }

                if background {
                    warn!(key, error = %err, "background refresh failed");
                } else {
                    error!(key, error = %err, "load failed with no cached fallback");
                }
                Err(err)
            }
        }
    }

    // == Get ==
    /// Returns the value for `key` only if it is fresh. Never loads.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let fresh = inner
            .store
            .get(key)
            .filter(|entry| Freshness::of(*entry, now).is_fresh())
            .map(|entry| entry.value.clone());

        match fresh {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        fresh
    }

    /// Returns a snapshot of the stored entry, fresh or not, without touching recency.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry<V>> {
        self.inner.lock().await.store.peek(key).cloned()
    }

    // == Invalidate ==
    /// Drops the stored value for `key`. A run already in flight still stores its result.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.inner.lock().await.store.delete(key);
        if removed {
            debug!(key, "invalidated");
        }
        removed
    }

    pub async fn clear(&self) {
        self.inner.lock().await.store.clear();
    }

    // == Purge Stale ==
    /// Removes entries unusable for longer than `retention`, keeping keys that are loading.
    pub async fn purge_stale(&self, retention: Duration) -> usize {
        let mut inner = self.inner.lock().await;
        let Inner {
            store, in_flight, ..
        } = &mut *inner;
        store.purge(retention, |key| in_flight.contains_key(key))
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.store.is_empty()
    }

    pub async fn in_flight_count(&self) -> usize {
        self.inner.lock().await.in_flight.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.set_store_figures(
            inner.store.evictions(),
            inner.store.len(),
            inner.in_flight.len(),
        );
        stats
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
