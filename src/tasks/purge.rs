//! Stale Purge Task
//!
//! Background task that periodically removes entries too old to serve even
//! as a stale-on-error fallback.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ReadThroughCache;

/// Spawns a background task that periodically purges long-dead entries.
///
/// Expired entries are not removed as soon as their TTL elapses: they stay
/// around as fallback values for failed reloads. This task drops them once
/// they have been unusable for longer than `retention`. Keys with a load in
/// flight are skipped.
///
/// # Arguments
/// * `cache` - Handle to the shared cache
/// * `cleanup_interval_secs` - Interval in seconds between purge runs
/// * `retention` - How long past its usable window an entry is kept
///
/// # Returns
/// A JoinHandle for the spawned task, to abort it on shutdown.
///
/// # Example
/// ```ignore
/// let cache = ReadThroughCache::from_config(&config);
/// let purge_handle = spawn_purge_task(cache.clone(), config.cleanup_interval, config.stale_retention());
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task<V>(
    cache: ReadThroughCache<V>,
    cleanup_interval_secs: u64,
    retention: Duration,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stale purge task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_stale(retention).await;

            if removed > 0 {
                info!("Stale purge: removed {} dead entries", removed);
            } else {
                debug!("Stale purge: nothing to remove");
            }
        }
    })
}
