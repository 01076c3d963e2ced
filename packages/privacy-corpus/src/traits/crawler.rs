//! Remote crawl traits.

use async_trait::async_trait;

use crate::error::CrawlResult;
use crate::types::crawl::{CrawlJobSpec, CrawlRecord};
use crate::types::page::ScrapedPage;

/// Executes one crawl job against a managed crawling service.
///
/// Submission, polling and result retrieval are the backend's business;
/// callers only see the ordered per-page records.
#[async_trait]
pub trait CrawlBackend: Send + Sync {
    async fn run_job(&self, spec: &CrawlJobSpec) -> CrawlResult<Vec<CrawlRecord>>;

    /// Backend name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Multi-page scraping and related-page discovery.
#[async_trait]
pub trait SiteCrawler: Send + Sync {
    /// Scrape exactly these URLs. Pages with too little text are dropped.
    async fn scrape_pages(&self, seed_urls: &[String]) -> CrawlResult<Vec<ScrapedPage>>;

    /// Discover privacy-related URLs reachable from the site.
    ///
    /// Never fails: discovery is an enhancement, so errors yield an empty list.
    async fn find_related_pages(&self, site_url: &str) -> Vec<String>;
}
