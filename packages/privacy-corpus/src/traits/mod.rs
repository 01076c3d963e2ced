//! Core trait abstractions.
//!
//! - [`fetcher::PageFetcher`] - retrieve one page (HTTP, headless, cascade)
//! - [`locator::PolicyFinder`] - find a site's privacy-policy URL
//! - [`crawler::CrawlBackend`] - run one remote crawl job
//! - [`crawler::SiteCrawler`] - multi-page scraping and related-page discovery

pub mod crawler;
pub mod fetcher;
pub mod locator;
