//! Integration Tests for the Read-Through Cache
//!
//! Exercises get-or-load through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use portfolio_cache::{CacheError, Config, LoadOptions, ReadThroughCache};
use tokio::sync::Notify;
use tokio::time::{advance, sleep};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

const TTL: Option<Duration> = Some(Duration::from_millis(1000));

// == Coalescing ==

#[tokio::test(start_paused = true)]
async fn test_two_calls_ten_ms_apart_share_one_producer() {
    init_tracing();
    let cache = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));

    let producer_a = {
        let calls = Arc::clone(&calls);
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(100)).await;
            Ok(vec!["portfolio".to_string(), "compiler".to_string()])
        }
    };
    let producer_b = {
        let calls = Arc::clone(&calls);
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["unexpected".to_string()])
        }
    };

    let first = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_or_load("k", TTL, producer_a).await })
    };
    sleep(Duration::from_millis(10)).await;
    let second = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_or_load("k", TTL, producer_b).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(first, vec!["portfolio".to_string(), "compiler".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_tasks_on_many_threads_share_one_producer() {
    init_tracing();
    let cache = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..50 {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        let gate = Arc::clone(&gate);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_load("projects-en", TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok(42u64)
                })
                .await
        }));
    }

    // Hold the producer until every caller is either waiting on it or still queued
    while cache.in_flight_count().await == 0 {
        tokio::task::yield_now().await;
    }
    sleep(Duration::from_millis(50)).await;
    gate.notify_one();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 42);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.in_flight_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_caller_does_not_cancel_production() {
    init_tracing();
    let cache = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));

    let abandoned = {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            cache
                .get_or_load("k", TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(100)).await;
                    Ok("produced".to_string())
                })
                .await
        })
    };
    while cache.in_flight_count().await == 0 {
        tokio::task::yield_now().await;
    }
    abandoned.abort();

    // A later caller attaches to the still-running production
    let value = cache
        .get_or_load("k", TTL, || async { Err(anyhow!("must not run")) })
        .await
        .unwrap();

    assert_eq!(value, "produced");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get("k").await.as_deref(), Some("produced"));
}

#[tokio::test(start_paused = true)]
async fn test_different_keys_load_independently() {
    let cache = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));

    let load = |key: &'static str| {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        async move {
            cache
                .get_or_load(key, TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(10)).await;
                    Ok(key.to_uppercase())
                })
                .await
        }
    };

    let (a, b) = tokio::join!(load("projects-en"), load("projects-pt-BR"));

    assert_eq!(a.unwrap(), "PROJECTS-EN");
    assert_eq!(b.unwrap(), "PROJECTS-PT-BR");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// == Freshness ==

#[tokio::test(start_paused = true)]
async fn test_value_reloads_only_after_ttl() {
    let cache = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));
    let ttl = Some(Duration::from_millis(100));

    let producer = |calls: &Arc<AtomicUsize>| {
        let calls = Arc::clone(calls);
        move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
    };

    assert_eq!(cache.get_or_load("k", ttl, producer(&calls)).await.unwrap(), 1);

    advance(Duration::from_millis(50)).await;
    assert_eq!(cache.get_or_load("k", ttl, producer(&calls)).await.unwrap(), 1);

    advance(Duration::from_millis(100)).await;
    assert_eq!(cache.get_or_load("k", ttl, producer(&calls)).await.unwrap(), 2);
}

// == Failures ==

#[tokio::test(start_paused = true)]
async fn test_stale_value_survives_failed_reload() {
    init_tracing();
    let cache = ReadThroughCache::new(100);
    let ttl = Some(Duration::from_millis(100));

    cache
        .get_or_load("k", ttl, || async { Ok("v1".to_string()) })
        .await
        .unwrap();
    advance(Duration::from_millis(150)).await;

    let value = cache
        .get_or_load("k", ttl, || async { Err(anyhow!("store down")) })
        .await
        .unwrap();

    assert_eq!(value, "v1");
    let entry = cache.peek("k").await.unwrap();
    assert!(entry.age() >= Duration::from_millis(150), "age must not be reset");
}

#[tokio::test]
async fn test_cold_failure_surfaces_producer_error() {
    #[derive(Debug, thiserror::Error)]
    #[error("timed out after {0:?}")]
    struct Timeout(Duration);

    let cache: ReadThroughCache<String> = ReadThroughCache::new(100);

    let err = cache
        .get_or_load("k", TTL, || async {
            Err(anyhow::Error::new(Timeout(Duration::from_secs(3))))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::Producer { .. }));
    let timeout = err.producer_error().unwrap().downcast_ref::<Timeout>();
    assert_eq!(timeout.map(|t| t.0), Some(Duration::from_secs(3)));
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_no_automatic_retry() {
    let cache: ReadThroughCache<String> = ReadThroughCache::new(100);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = Arc::clone(&calls);
        let result = cache
            .get_or_load("k", TTL, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("nope"))
            })
            .await;
        assert!(result.is_err());
    }

    // One producer call per request, never more
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.stats().await.load_failures, 3);
}

// == Configuration ==

#[tokio::test]
async fn test_cache_from_config_honours_capacity() {
    let config = Config {
        max_entries: 3,
        ..Config::default()
    };
    let cache = ReadThroughCache::from_config(&config);
    let options = LoadOptions::from_config(&config);

    for i in 0..10 {
        cache
            .get_or_load_with(&format!("key-{}", i), options, move || async move { Ok(i) })
            .await
            .unwrap();
    }

    let stats = cache.stats().await;
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.evictions, 7);
    assert_eq!(cache.get("key-9").await, Some(9));
    assert_eq!(cache.get("key-0").await, None);
}
