//! Crawler used when remote crawling is disabled.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CrawlResult;
use crate::traits::crawler::SiteCrawler;
use crate::types::page::ScrapedPage;

/// Scrapes nothing and discovers nothing.
///
/// The assembler then degrades to primary-only acquisition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCrawler;

#[async_trait]
impl SiteCrawler for NullCrawler {
    async fn scrape_pages(&self, seed_urls: &[String]) -> CrawlResult<Vec<ScrapedPage>> {
        debug!(seeds = seed_urls.len(), "Remote crawling disabled, skipping scrape");
        Ok(Vec::new())
    }

    async fn find_related_pages(&self, _site_url: &str) -> Vec<String> {
        Vec::new()
    }
}
