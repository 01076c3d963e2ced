//! Ordered page-fetch fallback.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{BrowserOptions, BrowserRenderer, HttpFetcher};
use crate::cascade::{run_cascade, Tier};
use crate::error::{FetchResult, PageError, PageResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::AcquisitionConfig;
use crate::types::page::ScrapedPage;

struct FetcherTier(Arc<dyn PageFetcher>);

impl Tier for FetcherTier {
    fn tier_name(&self) -> &str {
        self.0.name()
    }
}

/// Tries each fetcher in order until one produces a page.
///
/// A failed tier hands over to the next one; the last tier's error is
/// returned when every tier fails. Adding a strategy (say, a proxy-rotating
/// fetch) is one more [`FetchCascade::then`].
///
/// # Example
///
/// ```rust,ignore
/// let cascade = FetchCascade::new()
///     .then(HttpFetcher::new(config.clone())?)
///     .then(BrowserRenderer::new(config, BrowserOptions::default()));
/// let page = cascade.fetch_page("https://example.com/privacy").await?;
/// ```
#[derive(Default)]
pub struct FetchCascade {
    tiers: Vec<FetcherTier>,
}

impl FetchCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lightweight HTTP first, headless render second.
    pub fn standard(config: AcquisitionConfig, browser: BrowserOptions) -> FetchResult<Self> {
        Ok(Self::new()
            .then(HttpFetcher::new(config.clone())?)
            .then(BrowserRenderer::new(config, browser)))
    }

    /// Append a strategy.
    pub fn then(self, fetcher: impl PageFetcher + 'static) -> Self {
        self.then_shared(Arc::new(fetcher))
    }

    /// Append a shared strategy.
    pub fn then_shared(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.tiers.push(FetcherTier(fetcher));
        self
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[async_trait]
impl PageFetcher for FetchCascade {
    async fn fetch_page(&self, url: &str) -> PageResult<ScrapedPage> {
        let page = run_cascade(
            &self.tiers,
            || PageError::NoStrategies,
            |tier| tier.0.fetch_page(url),
        )
        .await?;

        info!(url = %url, origin = ?page.origin, chars = page.text.len(), "Page acquired");
        Ok(page)
    }

    fn name(&self) -> &str {
        "cascade"
    }
}
