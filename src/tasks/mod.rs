//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Stale purge: Drops entries that have outlived their fallback retention

mod purge;

pub use purge::spawn_purge_task;
