use anyhow::{Context, Result};
use dotenvy::dotenv;
use privacy_corpus::{AcquisitionConfig, BrowserOptions};
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    /// Without a token remote crawling is disabled
    pub apify_api_token: Option<SecretString>,
    pub apify_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub chrome_executable: Option<PathBuf>,
    pub browser_no_sandbox: bool,
    pub crawl_job_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            apify_api_token: non_empty("APIFY_API_TOKEN").map(SecretString::from),
            apify_base_url: non_empty("APIFY_BASE_URL"),
            user_agent: non_empty("PRIVACY_CORPUS_USER_AGENT"),
            chrome_executable: non_empty("CHROME_EXECUTABLE").map(PathBuf::from),
            browser_no_sandbox: non_empty("BROWSER_NO_SANDBOX")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("BROWSER_NO_SANDBOX must be true/false/1/0")?
                .unwrap_or(false),
            crawl_job_timeout: Duration::from_secs(
                env::var("CRAWL_JOB_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "180".to_string())
                    .parse()
                    .context("CRAWL_JOB_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }

    pub fn acquisition(&self) -> AcquisitionConfig {
        let config = AcquisitionConfig::default();
        match &self.user_agent {
            Some(ua) => config.with_user_agent(ua.clone()),
            None => config,
        }
    }

    pub fn browser(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_executable: self.chrome_executable.clone(),
            sandbox: !self.browser_no_sandbox,
            ..BrowserOptions::default()
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => anyhow::bail!("unrecognized flag value: {other}"),
    }
}
