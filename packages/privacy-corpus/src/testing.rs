//! Testing utilities including mock implementations.
//!
//! These let applications exercise the acquisition pipeline without
//! network access, a browser, or a crawl-service account.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{CrawlResult, CrawlServiceError, FetchError, PageError, PageResult};
use crate::traits::{
    crawler::{CrawlBackend, SiteCrawler},
    fetcher::PageFetcher,
    locator::PolicyFinder,
};
use crate::types::{
    crawl::{CrawlJobSpec, CrawlRecord, ExtractMode},
    page::ScrapedPage,
};
use crate::url::normalize_url;

type PageErrorFactory = Arc<dyn Fn() -> PageError + Send + Sync>;
type CrawlErrorFactory = Arc<dyn Fn() -> CrawlServiceError + Send + Sync>;

/// A mock page fetcher.
///
/// Returns canned pages by URL and records every request. Unknown URLs
/// fail with a 404 status error. Clones share state.
#[derive(Clone)]
pub struct MockFetcher {
    name: String,
    pages: Arc<RwLock<HashMap<String, ScrapedPage>>>,
    failures: Arc<RwLock<HashMap<String, PageErrorFactory>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Arc::default(),
            failures: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Serve `page` for requests to `page.url`.
    pub fn with_page(self, page: ScrapedPage) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(normalize_url(&page.url), page);
        self
    }

    /// Fail requests to `url` with the error built by `error`.
    pub fn with_failure(
        self,
        url: &str,
        error: impl Fn() -> PageError + Send + Sync + 'static,
    ) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(normalize_url(url), Arc::new(error));
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> PageResult<ScrapedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let key = normalize_url(url);
        if let Some(error) = self.failures.read().unwrap().get(&key) {
            return Err(error());
        }

        self.pages.read().unwrap().get(&key).cloned().ok_or_else(|| {
            FetchError::Status {
                url: url.to_string(),
                status: 404,
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A mock policy finder that always answers the same way.
#[derive(Clone, Default)]
pub struct MockPolicyFinder {
    policy_url: Option<String>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockPolicyFinder {
    /// Finder that reports `url` for every site.
    pub fn found(url: impl Into<String>) -> Self {
        Self {
            policy_url: Some(url.into()),
            calls: Arc::default(),
        }
    }

    /// Finder that never finds anything.
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PolicyFinder for MockPolicyFinder {
    async fn find_policy_url(&self, site_url: &str) -> Option<String> {
        self.calls.write().unwrap().push(site_url.to_string());
        self.policy_url.clone()
    }
}

/// A mock crawl-service backend.
///
/// Scrape jobs (no link selector) return the configured record for each
/// seed that has one, in seed order. Discovery jobs return a single record
/// for the seed carrying the configured links. Queued failures are consumed
/// one per job before any of that happens; per-mode failures apply to every
/// job with that extraction mode.
#[derive(Clone, Default)]
pub struct MockCrawlBackend {
    records: Arc<RwLock<HashMap<String, CrawlRecord>>>,
    discovered_links: Arc<RwLock<Vec<String>>>,
    failures: Arc<RwLock<VecDeque<CrawlServiceError>>>,
    mode_failures: Arc<RwLock<HashMap<ExtractMode, CrawlErrorFactory>>>,
    jobs: Arc<RwLock<Vec<CrawlJobSpec>>>,
}

impl MockCrawlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: CrawlRecord) -> Self {
        self.records
            .write()
            .unwrap()
            .insert(normalize_url(&record.url), record);
        self
    }

    /// Links returned by discovery jobs.
    pub fn with_discovered_links(self, links: Vec<String>) -> Self {
        *self.discovered_links.write().unwrap() = links;
        self
    }

    /// Fail the next job with `error`. Multiple calls queue in order.
    pub fn fail_next(self, error: CrawlServiceError) -> Self {
        self.failures.write().unwrap().push_back(error);
        self
    }

    /// Fail every job using `mode` with the error built by `error`.
    pub fn fail_mode(
        self,
        mode: ExtractMode,
        error: impl Fn() -> CrawlServiceError + Send + Sync + 'static,
    ) -> Self {
        self.mode_failures
            .write()
            .unwrap()
            .insert(mode, Arc::new(error));
        self
    }

    /// Every job submitted so far.
    pub fn jobs(&self) -> Vec<CrawlJobSpec> {
        self.jobs.read().unwrap().clone()
    }
}

#[async_trait]
impl CrawlBackend for MockCrawlBackend {
    async fn run_job(&self, spec: &CrawlJobSpec) -> CrawlResult<Vec<CrawlRecord>> {
        self.jobs.write().unwrap().push(spec.clone());

        if let Some(error) = self.failures.write().unwrap().pop_front() {
            return Err(error);
        }
        if let Some(error) = self.mode_failures.read().unwrap().get(&spec.extract_mode) {
            return Err(error());
        }

        if spec.link_selector.is_some() {
            let links = self.discovered_links.read().unwrap().clone();
            return Ok(spec
                .seed_urls
                .first()
                .map(|seed| CrawlRecord {
                    url: seed.clone(),
                    links,
                    ..Default::default()
                })
                .into_iter()
                .collect());
        }

        let records = self.records.read().unwrap();
        Ok(spec
            .seed_urls
            .iter()
            .filter_map(|seed| records.get(&normalize_url(seed)).cloned())
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Record of a call made to the mock site crawler.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCrawlCall {
    Scrape { urls: Vec<String> },
    FindRelated { site_url: String },
}

/// A mock site crawler with canned scrape results and related links.
#[derive(Clone, Default)]
pub struct MockSiteCrawler {
    pages: Arc<RwLock<HashMap<String, ScrapedPage>>>,
    related: Arc<RwLock<Vec<String>>>,
    scrape_failure: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<Vec<MockCrawlCall>>>,
}

impl MockSiteCrawler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page: ScrapedPage) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(normalize_url(&page.url), page);
        self
    }

    pub fn with_related(self, urls: Vec<String>) -> Self {
        *self.related.write().unwrap() = urls;
        self
    }

    /// Make every scrape fail with a service error carrying `message`.
    pub fn with_scrape_failure(self, message: impl Into<String>) -> Self {
        *self.scrape_failure.write().unwrap() = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<MockCrawlCall> {
        self.calls.read().unwrap().clone()
    }

    /// URL lists passed to `scrape_pages`, in call order.
    pub fn scrape_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCrawlCall::Scrape { urls } => Some(urls),
                MockCrawlCall::FindRelated { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl SiteCrawler for MockSiteCrawler {
    async fn scrape_pages(&self, seed_urls: &[String]) -> CrawlResult<Vec<ScrapedPage>> {
        self.calls.write().unwrap().push(MockCrawlCall::Scrape {
            urls: seed_urls.to_vec(),
        });

        if let Some(message) = self.scrape_failure.read().unwrap().clone() {
            return Err(CrawlServiceError::Service { message });
        }

        let pages = self.pages.read().unwrap();
        Ok(seed_urls
            .iter()
            .filter_map(|url| pages.get(&normalize_url(url)).cloned())
            .collect())
    }

    async fn find_related_pages(&self, site_url: &str) -> Vec<String> {
        self.calls.write().unwrap().push(MockCrawlCall::FindRelated {
            site_url: site_url.to_string(),
        });
        self.related.read().unwrap().clone()
    }
}
