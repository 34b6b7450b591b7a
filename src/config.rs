//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds applied to content loads
    pub default_ttl: u64,
    /// Seconds past the TTL during which a stale value is served while refreshing
    pub stale_while_revalidate: u64,
    /// Background purge task interval in seconds
    pub cleanup_interval: u64,
    /// Seconds a dead entry is kept as a stale-on-error fallback before purging
    pub stale_retention: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Content TTL in seconds (default: 300)
    /// - `STALE_WHILE_REVALIDATE` - Background refresh window in seconds (default: 0)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 60)
    /// - `STALE_RETENTION` - Fallback retention in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            stale_while_revalidate: env_or(
                "STALE_WHILE_REVALIDATE",
                defaults.stale_while_revalidate,
            ),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            stale_retention: env_or("STALE_RETENTION", defaults.stale_retention),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn stale_while_revalidate(&self) -> Duration {
        Duration::from_secs(self.stale_while_revalidate)
    }

    pub fn stale_retention(&self) -> Duration {
        Duration::from_secs(self.stale_retention)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            stale_while_revalidate: 0,
            cleanup_interval: 60,
            stale_retention: 3600,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
