//! Profile-cascading crawl adapter.

use async_trait::async_trait;
use futures::FutureExt;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::cascade::{run_cascade, Tier};
use crate::error::{CrawlResult, CrawlServiceError};
use crate::extract::{is_related_link, normalize_text, word_count, FALLBACK_TITLE};
use crate::traits::crawler::{CrawlBackend, SiteCrawler};
use crate::types::config::AcquisitionConfig;
use crate::types::crawl::{CrawlJobSpec, CrawlRecord, JobProfile};
use crate::types::page::{PageOrigin, PageStructure, ScrapedPage};
use crate::url::{normalize_url, same_page, same_site};

/// Links followed during related-page discovery.
pub const RELATED_LINK_SELECTOR: &str = "a[href*=\"privacy\"], a[href*=\"policy\"], \
     a[href*=\"terms\"], a[href*=\"cookie\"], a[href*=\"legal\"], a[href*=\"data\"]";

struct ProfileTier(JobProfile);

impl Tier for ProfileTier {
    fn tier_name(&self) -> &str {
        self.0.name()
    }
}

/// Scrapes pages and discovers related pages through a crawl backend.
///
/// Every job is tried with the full profile first; a quota failure re-runs
/// the identical job inputs with the light profile. Any other failure stops
/// the cascade.
pub struct RemoteCrawler<B> {
    backend: B,
    profiles: Vec<ProfileTier>,
    min_text_chars: usize,
}

impl<B: CrawlBackend> RemoteCrawler<B> {
    pub fn new(backend: B, config: &AcquisitionConfig) -> Self {
        Self {
            backend,
            profiles: vec![ProfileTier(JobProfile::full()), ProfileTier(JobProfile::light())],
            min_text_chars: config.min_crawl_chars,
        }
    }

    /// Replace the profile cascade.
    pub fn with_profiles(mut self, profiles: Vec<JobProfile>) -> Self {
        self.profiles = profiles.into_iter().map(ProfileTier).collect();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn run_profiles<F>(&self, build: F) -> CrawlResult<Vec<CrawlRecord>>
    where
        F: Fn(&JobProfile) -> CrawlJobSpec + Send + Sync,
    {
        let backend = &self.backend;
        run_cascade(
            &self.profiles,
            || CrawlServiceError::Service {
                message: "no crawl profiles configured".to_string(),
            },
            |tier| {
                let spec = build(&tier.0);
                debug!(
                    profile = tier.0.name(),
                    backend = backend.name(),
                    mode = %spec.extract_mode,
                    seeds = spec.seed_urls.len(),
                    "Submitting crawl job"
                );
                async move { backend.run_job(&spec).await }.boxed()
            },
        )
        .await
    }

    fn page_from_record(&self, record: CrawlRecord) -> Option<ScrapedPage> {
        let text = normalize_text(record.text.as_deref().unwrap_or_default());
        if text.chars().count() < self.min_text_chars {
            debug!(url = %record.url, chars = text.len(), "Discarding thin crawl result");
            return None;
        }

        let title = record
            .title
            .map(|t| normalize_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let words = record.word_count.unwrap_or_else(|| word_count(&text));

        let mut page =
            ScrapedPage::new(record.url, title, text, PageOrigin::RemoteCrawl).with_word_count(words);
        if !record.headers.is_empty() || !record.links.is_empty() {
            page = page.with_structure(PageStructure {
                headers: record.headers,
                links: record.links,
            });
        }
        Some(page)
    }
}

#[async_trait]
impl<B: CrawlBackend> SiteCrawler for RemoteCrawler<B> {
    async fn scrape_pages(&self, seed_urls: &[String]) -> CrawlResult<Vec<ScrapedPage>> {
        if seed_urls.is_empty() {
            return Ok(Vec::new());
        }

        let records = self
            .run_profiles(|profile| profile.scrape_job(seed_urls))
            .await?;
        let returned = records.len();

        let pages: Vec<ScrapedPage> = records
            .into_iter()
            .filter_map(|record| self.page_from_record(record))
            .collect();

        info!(
            seeds = seed_urls.len(),
            returned,
            kept = pages.len(),
            "Remote scrape complete"
        );
        Ok(pages)
    }

    async fn find_related_pages(&self, site_url: &str) -> Vec<String> {
        let records = match self
            .run_profiles(|profile| profile.discovery_job(site_url, RELATED_LINK_SELECTOR))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(site = %site_url, error = %e, "Related-page discovery failed");
                return Vec::new();
            }
        };

        // Pages the crawler followed into are related, and so are the links they carry.
        // Only pages on the site's own host count.
        let mut found: IndexMap<String, String> = IndexMap::new();
        for record in records {
            let followed = (!same_page(&record.url, site_url)).then_some(record.url);
            for url in followed.into_iter().chain(record.links) {
                if same_site(&url, site_url)
                    && is_related_link(&url)
                    && !same_page(&url, site_url)
                {
                    found.entry(normalize_url(&url)).or_insert(url);
                }
            }
        }

        info!(site = %site_url, count = found.len(), "Related pages discovered");
        found.into_values().collect()
    }
}
