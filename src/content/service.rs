//! Portfolio content service
//!
//! Per-locale project and work history lists, read through the shared cache
//! so that concurrent page loads cost at most one source query per key.

use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::cache::{LoadOptions, ReadThroughCache};
use crate::config::Config;
use crate::content::{Company, ContentKey, ContentSnapshot, ContentSource, Locale, Project};
use crate::error::{CacheError, Result};

/// Content reads for page loaders.
///
/// Holds a handle to the process-wide cache and the source it falls through to.
pub struct PortfolioContent<S: ?Sized> {
    cache: ReadThroughCache<ContentSnapshot>,
    source: Arc<S>,
    options: LoadOptions,
}

impl<S: ?Sized> Clone for PortfolioContent<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            source: Arc::clone(&self.source),
            options: self.options,
        }
    }
}

impl<S> PortfolioContent<S>
where
    S: ContentSource + ?Sized + 'static,
{
    pub fn new(cache: ReadThroughCache<ContentSnapshot>, source: Arc<S>, options: LoadOptions) -> Self {
        Self {
            cache,
            source,
            options,
        }
    }

    /// Uses the configured TTL and revalidation window for every load.
    pub fn from_config(
        cache: ReadThroughCache<ContentSnapshot>,
        source: Arc<S>,
        config: &Config,
    ) -> Self {
        Self::new(cache, source, LoadOptions::from_config(config))
    }

    pub fn cache(&self) -> &ReadThroughCache<ContentSnapshot> {
        &self.cache
    }

    // == Projects ==
    /// Projects published in `locale`.
    pub async fn projects(&self, locale: Locale) -> Result<Arc<Vec<Project>>> {
        let key = ContentKey::projects(locale);
        let source = Arc::clone(&self.source);

        let snapshot = self
            .cache
            .get_or_load_with(&key.to_string(), self.options, move || async move {
                let projects = source
                    .fetch_projects(locale)
                    .await
                    .with_context(|| format!("fetching projects for {}", locale))?;
                Ok::<_, anyhow::Error>(ContentSnapshot::Projects(Arc::new(projects)))
            })
            .await?;

        match snapshot {
            ContentSnapshot::Projects(projects) => Ok(projects),
            other => Err(mismatch(&key, &other)),
        }
    }

    // == Companies ==
    /// Work history in `locale`: current positions first, then most recently ended.
    pub async fn companies(&self, locale: Locale) -> Result<Arc<Vec<Company>>> {
        let key = ContentKey::companies(locale);
        let source = Arc::clone(&self.source);

        let snapshot = self
            .cache
            .get_or_load_with(&key.to_string(), self.options, move || async move {
                let mut companies = source
                    .fetch_companies(locale)
                    .await
                    .with_context(|| format!("fetching companies for {}", locale))?;
                companies.sort_by(Company::timeline_order);
                Ok::<_, anyhow::Error>(ContentSnapshot::Companies(Arc::new(companies)))
            })
            .await?;

        match snapshot {
            ContentSnapshot::Companies(companies) => Ok(companies),
            other => Err(mismatch(&key, &other)),
        }
    }

    /// Like [`projects`](Self::projects), but a failure renders as an empty list.
    pub async fn projects_or_empty(&self, locale: Locale) -> Arc<Vec<Project>> {
        self.projects(locale).await.unwrap_or_else(|err| {
            warn!(%locale, error = %err, "projects unavailable, rendering empty list");
            Arc::default()
        })
    }

    /// Like [`companies`](Self::companies), but a failure renders as an empty list.
    pub async fn companies_or_empty(&self, locale: Locale) -> Arc<Vec<Company>> {
        self.companies(locale).await.unwrap_or_else(|err| {
            warn!(%locale, error = %err, "companies unavailable, rendering empty list");
            Arc::default()
        })
    }

    /// Drops every cached list for `locale` so the next read hits the source.
    pub async fn invalidate(&self, locale: Locale) {
        for key in [ContentKey::projects(locale), ContentKey::companies(locale)] {
            self.cache.invalidate(&key.to_string()).await;
        }
    }
}

fn mismatch(key: &ContentKey, found: &ContentSnapshot) -> CacheError {
    CacheError::Internal(format!(
        "expected {} under key '{}', found {}",
        key.entity.as_str(),
        key,
        found.kind()
    ))
}
