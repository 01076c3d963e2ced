//! Privacy-Policy Content Acquisition
//!
//! Locates a website's privacy policy, retrieves it through escalating
//! strategies and assembles it, together with related privacy pages, into
//! one normalized corpus for downstream analysis.
//!
//! # Pipeline
//!
//! 1. [`PolicyLocator`] finds the policy URL (link heuristics, footer scan,
//!    conventional-path probes)
//! 2. [`FetchCascade`] retrieves it: [`HttpFetcher`] first, [`BrowserRenderer`]
//!    when the plain fetch fails
//! 3. [`RemoteCrawler`] discovers and scrapes supplementary pages on a crawl
//!    service, falling back from the full to the light job profile on quota
//!    exhaustion
//! 4. [`ContentAssembler`] merges everything with provenance markers
//!
//! # Usage
//!
//! ```rust,ignore
//! use privacy_corpus::{
//!     AcquisitionConfig, BrowserOptions, ContentAssembler, FetchCascade, NullCrawler,
//!     PolicyLocator,
//! };
//! use std::sync::Arc;
//!
//! let config = AcquisitionConfig::default();
//! let assembler = ContentAssembler::new(
//!     Arc::new(PolicyLocator::new(config.clone())?),
//!     Arc::new(FetchCascade::standard(config.clone(), BrowserOptions::default())?),
//!     Arc::new(NullCrawler),
//!     config,
//! );
//!
//! let corpus = assembler.assemble("https://example.com", None).await?;
//! println!("{} pages, {} words", corpus.metadata.total_pages, corpus.metadata.total_word_count);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams (PageFetcher, PolicyFinder, CrawlBackend, SiteCrawler)
//! - [`types`] - Pages, crawl jobs, assembled content, configuration
//! - [`fetch`] - Lightweight fetcher, headless renderer, fetch cascade
//! - [`crawl`] - Remote crawl adapter and the Apify backend
//! - [`locator`] - Privacy-policy URL discovery
//! - [`assembler`] - Corpus assembly
//! - [`testing`] - Mock implementations for testing

pub mod assembler;
pub mod cascade;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod locator;
pub mod testing;
pub mod traits;
pub mod types;
pub mod url;

// Re-export core types at crate root
pub use error::{
    AcquisitionError, CrawlServiceError, Escalate, Escalation, FetchError, PageError, RenderError,
};
pub use traits::{
    crawler::{CrawlBackend, SiteCrawler},
    fetcher::PageFetcher,
    locator::PolicyFinder,
};
pub use types::{
    config::{AcquisitionConfig, DEFAULT_USER_AGENT},
    content::{AcquisitionMetadata, AcquisitionMethod, AssembledPrivacyContent},
    crawl::{CrawlJobSpec, CrawlRecord, ExtractMode, JobProfile, ProfileKind},
    page::{PageOrigin, PageStructure, ScrapedPage},
};

pub use assembler::ContentAssembler;
pub use crawl::{ApifyBackend, NullCrawler, RemoteCrawler};
pub use fetch::{BrowserOptions, BrowserRenderer, FetchCascade, HttpFetcher};
pub use locator::PolicyLocator;
pub use crate::url::normalize_url;
