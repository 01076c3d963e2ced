//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor runs,
//! polling for completion, and fetching dataset results.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::{ApifyClient, RunOptions, WEB_SCRAPER};
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let items: Vec<serde_json::Value> = client
//!     .run_actor(WEB_SCRAPER, &input, &RunOptions::default())
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    ProxyConfiguration, RequestSource, RunData, RunOptions, WebScraperInput,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::{ApiErrorBody, ApiResponse};

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apify/web-scraper.
pub const WEB_SCRAPER: &str = "apify~web-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (self-hosted proxy, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        options: &RunOptions,
    ) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(memory) = options.memory_mbytes {
            query.push(("memory", memory.to_string()));
        }
        if let Some(timeout) = options.timeout_secs {
            query.push(("timeout", timeout.to_string()));
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .json(input)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!(
                "{}/actor-runs/{}?waitForFinish=60",
                self.base_url, run_id
            );
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = ensure_success(resp).await?;
            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed {
                        status: api_resp.data.status,
                        message: api_resp.data.status_message.unwrap_or_default(),
                    });
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/datasets/{}/items?format=json&clean=true",
            self.base_url, dataset_id
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Abort a running actor run. Runs that already finished are returned unchanged.
    pub async fn abort_run(&self, run_id: &str) -> Result<RunData> {
        let url = format!("{}/actor-runs/{}/abort", self.base_url, run_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Run an actor end-to-end: start run, poll, fetch the default dataset.
    pub async fn run_actor<I: Serialize, T: DeserializeOwned>(
        &self,
        actor_id: &str,
        input: &I,
        options: &RunOptions,
    ) -> Result<Vec<T>> {
        tracing::info!(actor_id, memory = ?options.memory_mbytes, "Starting Apify actor run");

        let run = self.start_run(actor_id, input, options).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<T> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(count = items.len(), "Fetched dataset items");

        Ok(items)
    }
}

/// Turn a non-2xx response into `ApifyError::Api`, keeping the error type when the body has one.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let (error_type, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => (
            parsed.error.error_type,
            parsed.error.message.unwrap_or(body),
        ),
        Err(_) => (None, body),
    };

    Err(ApifyError::Api {
        status: status.as_u16(),
        error_type,
        message,
    })
}
