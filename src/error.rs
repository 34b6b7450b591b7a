//! Error types for the read-through cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Cloneable so that a single load outcome can be handed to every caller
/// waiting on the same in-flight production.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The producer supplied by the caller failed and no fallback was available
    #[error("Producer failed for key '{key}': {cause:#}")]
    Producer {
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// The producer panicked or its task was cancelled before settling
    #[error("Producer aborted for key '{key}': {reason}")]
    ProducerAborted { key: String, reason: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    // == Producer Error ==
    /// Returns the producer's own error, untouched, when this is a producer failure.
    pub fn producer_error(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::Producer { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Returns the key the failed load was for, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::Producer { key, .. } | CacheError::ProducerAborted { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
