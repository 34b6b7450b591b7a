//! Backing data source for portfolio content.

use async_trait::async_trait;

use crate::content::{Company, Locale, Project};

/// Where content rows come from, typically a remote table store.
///
/// Implementations own their own timeouts and retries; the cache calls each
/// method at most once per outstanding miss.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All projects published in `locale`.
    async fn fetch_projects(&self, locale: Locale) -> anyhow::Result<Vec<Project>>;

    /// All work history rows published in `locale`, in any order.
    async fn fetch_companies(&self, locale: Locale) -> anyhow::Result<Vec<Company>>;
}
