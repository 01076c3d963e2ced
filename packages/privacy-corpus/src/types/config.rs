//! Configuration for acquisition.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like user agent sent by the fetcher, locator and renderer.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Thresholds and timeouts for the acquisition pipeline.
///
/// Durations deserialize from whole seconds or milliseconds as named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// User agent for every outbound HTTP request and browser page.
    pub user_agent: String,

    /// Home-page GET timeout for the policy locator. Default: 10s.
    #[serde(with = "secs")]
    pub locator_timeout: Duration,

    /// HEAD timeout for conventional-path probes. Default: 5s.
    #[serde(with = "secs")]
    pub probe_timeout: Duration,

    /// Lightweight fetch timeout. Default: 15s.
    #[serde(with = "secs")]
    pub fetch_timeout: Duration,

    /// Headless navigation timeout. Default: 30s.
    #[serde(with = "secs")]
    pub render_timeout: Duration,

    /// Settle delay after network idle for late-rendering content. Default: 2000ms.
    #[serde(with = "millis")]
    pub render_settle: Duration,

    /// A content container must exceed this many characters to be chosen. Default: 500.
    pub min_container_chars: usize,

    /// Remote crawl results shorter than this are noise. Default: 100.
    pub min_crawl_chars: usize,

    /// Supplementary pages must exceed this length to be merged. Default: 200.
    pub min_supplementary_chars: usize,

    /// Primary text shorter than this triggers the enhancement pass. Default: 1000.
    pub enhance_below_chars: usize,

    /// Maximum supplementary candidates scraped per request. Default: 5.
    pub max_supplementary: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locator_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(15),
            render_timeout: Duration::from_secs(30),
            render_settle: Duration::from_millis(2000),
            min_container_chars: 500,
            min_crawl_chars: 100,
            min_supplementary_chars: 200,
            enhance_below_chars: 1000,
            max_supplementary: 5,
        }
    }
}

impl AcquisitionConfig {
    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the lightweight fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the locator and probe timeouts.
    pub fn with_locator_timeouts(mut self, page: Duration, probe: Duration) -> Self {
        self.locator_timeout = page;
        self.probe_timeout = probe;
        self
    }

    /// Set the supplementary candidate cap.
    pub fn with_max_supplementary(mut self, max: usize) -> Self {
        self.max_supplementary = max;
        self
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
