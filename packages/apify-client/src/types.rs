use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single start URL for a crawling actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestSource {
    pub url: String,
}

impl RequestSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Input for the apify/web-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct WebScraperInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<RequestSource>,
    /// CSS selector for links to enqueue. `None` crawls the start URLs only.
    #[serde(rename = "linkSelector", skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,
    #[serde(rename = "pageFunction")]
    pub page_function: String,
    #[serde(rename = "maxConcurrency")]
    pub max_concurrency: u32,
    #[serde(rename = "pageLoadTimeoutSecs")]
    pub page_load_timeout_secs: u64,
    #[serde(rename = "maxPagesPerCrawl")]
    pub max_pages_per_crawl: u32,
    #[serde(rename = "maxCrawlingDepth")]
    pub max_crawling_depth: u32,
    #[serde(rename = "maxScrollHeightPixels", skip_serializing_if = "Option::is_none")]
    pub max_scroll_height_pixels: Option<u32>,
    #[serde(rename = "maxSessionRotations", skip_serializing_if = "Option::is_none")]
    pub max_session_rotations: Option<u32>,
    #[serde(rename = "injectJQuery")]
    pub inject_jquery: bool,
    #[serde(rename = "proxyConfiguration")]
    pub proxy_configuration: ProxyConfiguration,
    /// Free-form data made available to the page function as `context.customData`.
    #[serde(rename = "customData")]
    pub custom_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProxyConfiguration {
    #[serde(rename = "useApifyProxy")]
    pub use_apify_proxy: bool,
}

impl Default for ProxyConfiguration {
    fn default() -> Self {
        Self {
            use_apify_proxy: true,
        }
    }
}

/// Per-run platform options passed as query parameters when starting a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Memory allocated to the run, in megabytes.
    pub memory_mbytes: Option<u32>,
    /// Platform-side run timeout, in seconds.
    pub timeout_secs: Option<u64>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Error envelope returned by the Apify API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "statusMessage")]
    pub status_message: Option<String>,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
