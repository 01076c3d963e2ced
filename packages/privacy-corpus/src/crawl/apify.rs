//! Crawl backend on the Apify `web-scraper` actor.

use apify_client::{ApifyClient, ProxyConfiguration, RequestSource, RunOptions, WebScraperInput, WEB_SCRAPER};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{info, warn};

use crate::error::{CrawlResult, CrawlServiceError};
use crate::extract::{CONTENT_CONTAINERS, NON_CONTENT_SELECTOR, RELATED_LINK_KEYWORDS};
use crate::traits::crawler::CrawlBackend;
use crate::types::crawl::{CrawlJobSpec, CrawlRecord};

/// Upper bound on one whole job: start, polling and dataset fetch.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(180);

/// Bound on the abort request sent after a job overruns.
const ABORT_TIMEOUT: Duration = Duration::from_secs(10);

/// The one page function every run uses.
///
/// Behaviour is selected by `customData.extractMode`; selectors, thresholds
/// and keywords also travel as data, so nothing caller-specific is shipped
/// as code.
const PAGE_FUNCTION: &str = r#"async function pageFunction(context) {
    const data = context.customData || {};
    const mode = data.extractMode || 'rich_content';
    const url = context.request.url;
    const keywords = data.relatedKeywords || [];
    const bareHost = (host) => host.toLowerCase().replace(/^www\./, '');
    const siteHost = bareHost(location.hostname);

    const links = Array.from(new Set(
        Array.from(document.querySelectorAll('a[href]'))
            .map((a) => a.href)
            .filter((href) => href && /^https?:/i.test(href))
            .filter((href) => {
                const target = new URL(href);
                const path = target.pathname.toLowerCase();
                return bareHost(target.hostname) === siteHost && keywords.some((k) => path.includes(k));
            })
    ));

    if (mode === 'link_harvest') {
        return { url, links };
    }

    const clean = (s) => (s || '').replace(/\s+/g, ' ').trim();
    const title = clean(document.title) || clean((document.querySelector('h1') || {}).innerText);
    const headers = Array.from(document.querySelectorAll('h1, h2, h3'))
        .map((h) => clean(h.innerText))
        .filter(Boolean);

    document.querySelectorAll(data.nonContentSelector || 'script, style').forEach((el) => el.remove());

    let root = null;
    for (const selector of data.contentContainers || []) {
        const el = document.querySelector(selector);
        if (el && clean(el.innerText).length > (data.minContainerChars || 0)) {
            root = el;
            break;
        }
    }
    const text = clean((root || document.body || {}).innerText);

    if (mode === 'plain_text') {
        return { url, title, text };
    }

    return {
        url,
        title,
        text,
        headers,
        links,
        wordCount: text ? text.split(' ').length : 0,
    };
}"#;

/// Runs crawl jobs on the Apify platform.
///
/// Construct once at startup and share; the underlying HTTP client pools
/// connections across jobs.
pub struct ApifyBackend {
    client: ApifyClient,
    actor_id: String,
    job_timeout: Duration,
    min_container_chars: usize,
}

impl ApifyBackend {
    pub fn new(api_token: &SecretString) -> Self {
        Self {
            client: ApifyClient::new(api_token.expose_secret().to_string()),
            actor_id: WEB_SCRAPER.to_string(),
            job_timeout: DEFAULT_JOB_TIMEOUT,
            min_container_chars: 500,
        }
    }

    /// Point at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Container threshold used by the page function.
    pub fn with_min_container_chars(mut self, chars: usize) -> Self {
        self.min_container_chars = chars;
        self
    }

    /// Translate a job into actor input.
    pub fn build_input(&self, spec: &CrawlJobSpec) -> WebScraperInput {
        WebScraperInput {
            start_urls: spec.seed_urls.iter().map(RequestSource::new).collect(),
            link_selector: spec.link_selector.clone(),
            page_function: PAGE_FUNCTION.to_string(),
            max_concurrency: spec.max_concurrency,
            page_load_timeout_secs: spec.request_timeout.as_secs(),
            max_pages_per_crawl: spec.max_pages,
            max_crawling_depth: spec.max_depth,
            max_scroll_height_pixels: spec.max_scroll_height_px,
            max_session_rotations: spec.max_session_rotations,
            inject_jquery: false,
            proxy_configuration: ProxyConfiguration::default(),
            custom_data: json!({
                "extractMode": spec.extract_mode,
                "nonContentSelector": NON_CONTENT_SELECTOR,
                "contentContainers": CONTENT_CONTAINERS,
                "minContainerChars": self.min_container_chars,
                "relatedKeywords": RELATED_LINK_KEYWORDS,
            }),
        }
    }

    fn job_failed(&self, spec: &CrawlJobSpec, error: CrawlServiceError) -> CrawlServiceError {
        warn!(mode = %spec.extract_mode, error = %error, "Crawl job failed");
        error
    }

    fn timed_out(&self) -> CrawlServiceError {
        CrawlServiceError::Service {
            message: format!("crawl job timed out after {}s", self.job_timeout.as_secs()),
        }
    }

    /// Abort a run that outlived the local deadline.
    async fn abort(&self, run_id: &str) {
        match timeout(ABORT_TIMEOUT, self.client.abort_run(run_id)).await {
            Ok(Ok(run)) => info!(run_id, status = %run.status, "Aborted overdue crawl run"),
            Ok(Err(e)) => warn!(run_id, error = %e, "Failed to abort overdue crawl run"),
            Err(_) => warn!(run_id, "Abort request for overdue crawl run timed out"),
        }
    }

    fn run_options(&self, spec: &CrawlJobSpec) -> RunOptions {
        RunOptions {
            memory_mbytes: Some(spec.memory_mbytes),
            timeout_secs: Some(self.job_timeout.as_secs()),
        }
    }
}

#[async_trait]
impl CrawlBackend for ApifyBackend {
    async fn run_job(&self, spec: &CrawlJobSpec) -> CrawlResult<Vec<CrawlRecord>> {
        let input = self.build_input(spec);
        let options = self.run_options(spec);
        let deadline = Instant::now() + self.job_timeout;

        let start = self.client.start_run(&self.actor_id, &input, &options);
        let run = match timeout_at(deadline, start).await {
            Ok(Ok(run)) => run,
            Ok(Err(e)) => return Err(self.job_failed(spec, e.into())),
            Err(_) => return Err(self.timed_out()),
        };
        info!(run_id = %run.id, mode = %spec.extract_mode, "Crawl run started");

        let finished = async {
            let completed = self.client.wait_for_run(&run.id).await?;
            self.client
                .get_dataset_items::<CrawlRecord>(&completed.default_dataset_id)
                .await
        };

        match timeout_at(deadline, finished).await {
            Ok(Ok(records)) => {
                info!(mode = %spec.extract_mode, records = records.len(), "Crawl job finished");
                Ok(records)
            }
            Ok(Err(e)) => Err(self.job_failed(spec, e.into())),
            Err(_) => {
                self.abort(&run.id).await;
                Err(self.timed_out())
            }
        }
    }

    fn name(&self) -> &str {
        "apify"
    }
}
