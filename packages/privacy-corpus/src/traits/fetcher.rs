//! Page fetcher trait.

use async_trait::async_trait;

use crate::error::PageResult;
use crate::types::page::ScrapedPage;

/// Retrieves a single page and returns its normalized content.
///
/// Implementations:
/// - `HttpFetcher` - plain GET, no JavaScript
/// - `BrowserRenderer` - headless Chromium
/// - `FetchCascade` - ordered fallback over other fetchers
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> PageResult<ScrapedPage>;

    /// Fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
