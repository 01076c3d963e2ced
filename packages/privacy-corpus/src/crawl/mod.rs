//! Remote crawl service adapter.
//!
//! [`RemoteCrawler`] turns page-scraping and related-page discovery into
//! crawl jobs, running them through the full → light profile cascade on any
//! [`CrawlBackend`](crate::traits::crawler::CrawlBackend). [`ApifyBackend`]
//! runs jobs on the Apify platform; [`NullCrawler`] stands in when no
//! crawl-service credential is configured.

pub mod apify;
pub mod null;
pub mod remote;

pub use apify::ApifyBackend;
pub use null::NullCrawler;
pub use remote::{RemoteCrawler, RELATED_LINK_SELECTOR};
