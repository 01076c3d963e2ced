//! Remote crawl job types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Named per-page extraction routines understood by the crawl backend.
///
/// Jobs carry a mode identifier rather than executable code; the backend
/// maps each mode to its own built-in routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// Main-content text plus headings, privacy links and word count
    RichContent,
    /// Main-content text only
    PlainText,
    /// Privacy-relevant links only
    LinkHarvest,
}

impl ExtractMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractMode::RichContent => "rich_content",
            ExtractMode::PlainText => "plain_text",
            ExtractMode::LinkHarvest => "link_harvest",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Full,
    Light,
}

/// Cost/capability settings for a remote crawl job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProfile {
    pub kind: ProfileKind,
    pub max_pages: u32,
    pub max_concurrency: u32,
    pub request_timeout: Duration,
    pub max_scroll_height_px: Option<u32>,
    pub max_session_rotations: Option<u32>,
    /// Memory requested from the service for the run
    pub memory_mbytes: u32,
    /// Mode used when scraping known URLs
    pub scrape_mode: ExtractMode,
}

impl JobProfile {
    /// Richer extraction: 10 pages, 3 concurrent, 30s per request.
    pub fn full() -> Self {
        Self {
            kind: ProfileKind::Full,
            max_pages: 10,
            max_concurrency: 3,
            request_timeout: Duration::from_secs(30),
            max_scroll_height_px: Some(5_000),
            max_session_rotations: Some(2),
            memory_mbytes: 2048,
            scrape_mode: ExtractMode::RichContent,
        }
    }

    /// Cheaper extraction: 5 pages, 2 concurrent, 20s per request, text only.
    pub fn light() -> Self {
        Self {
            kind: ProfileKind::Light,
            max_pages: 5,
            max_concurrency: 2,
            request_timeout: Duration::from_secs(20),
            max_scroll_height_px: None,
            max_session_rotations: None,
            memory_mbytes: 1024,
            scrape_mode: ExtractMode::PlainText,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            ProfileKind::Full => "full",
            ProfileKind::Light => "light",
        }
    }

    /// Job that scrapes exactly the given URLs without following links.
    pub fn scrape_job(&self, seed_urls: &[String]) -> CrawlJobSpec {
        self.job(seed_urls.to_vec(), None, self.scrape_mode, 0)
    }

    /// Job that starts at `site_url` and follows links matching `link_selector` one level deep.
    pub fn discovery_job(&self, site_url: &str, link_selector: &str) -> CrawlJobSpec {
        self.job(
            vec![site_url.to_string()],
            Some(link_selector.to_string()),
            ExtractMode::LinkHarvest,
            1,
        )
    }

    fn job(
        &self,
        seed_urls: Vec<String>,
        link_selector: Option<String>,
        extract_mode: ExtractMode,
        max_depth: u32,
    ) -> CrawlJobSpec {
        // Never ask for fewer pages than seeds we hand over.
        let max_pages = self.max_pages.max(seed_urls.len() as u32);
        CrawlJobSpec {
            seed_urls,
            link_selector,
            extract_mode,
            max_concurrency: self.max_concurrency,
            request_timeout: self.request_timeout,
            max_pages,
            max_depth,
            max_scroll_height_px: self.max_scroll_height_px,
            max_session_rotations: self.max_session_rotations,
            memory_mbytes: self.memory_mbytes,
        }
    }
}

/// One remote crawl request. Built per invocation, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlJobSpec {
    pub seed_urls: Vec<String>,
    /// CSS selector for links to follow; `None` crawls seeds only
    pub link_selector: Option<String>,
    pub extract_mode: ExtractMode,
    pub max_concurrency: u32,
    pub request_timeout: Duration,
    /// Total page budget
    pub max_pages: u32,
    pub max_depth: u32,
    pub max_scroll_height_px: Option<u32>,
    pub max_session_rotations: Option<u32>,
    pub memory_mbytes: u32,
}

/// Raw per-page record returned by the crawl service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRecord {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub word_count: Option<usize>,
}
