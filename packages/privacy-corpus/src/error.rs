//! Typed errors for the acquisition library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each error also reports
//! whether a fallback cascade may move on to its next tier.

use thiserror::Error;

/// How a cascade should react to a failed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Try the next tier.
    Recoverable,
    /// Stop and surface the error.
    Fatal,
}

/// Classifies an error for fallback selection.
pub trait Escalate {
    fn escalation(&self) -> Escalation;
}

/// Errors from the lightweight HTTP fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connection refused, TLS, body read)
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded its deadline
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Errors from the headless renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Browser could not be configured or started
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Navigation or DOM evaluation failed
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Navigation exceeded its deadline
    #[error("timeout rendering: {url}")]
    Timeout { url: String },

    /// Built without the `browser` feature
    #[error("headless rendering is not available in this build")]
    Unavailable,
}

/// Failure of any page-retrieval strategy.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Cascade built without any strategy
    #[error("no page fetch strategies configured")]
    NoStrategies,
}

impl Escalate for PageError {
    // A timed-out or unreachable page is treated the same as any other
    // network failure: the next strategy gets a go.
    fn escalation(&self) -> Escalation {
        match self {
            PageError::Fetch(FetchError::InvalidUrl { .. }) | PageError::NoStrategies => {
                Escalation::Fatal
            }
            _ => Escalation::Recoverable,
        }
    }
}

/// Errors from the remote crawl service.
#[derive(Debug, Error)]
pub enum CrawlServiceError {
    /// Memory limit or payment-required signal from the service
    #[error("crawl service quota exhausted: {message}")]
    Quota { message: String },

    /// Any other service failure
    #[error("crawl service error: {message}")]
    Service { message: String },
}

impl Escalate for CrawlServiceError {
    fn escalation(&self) -> Escalation {
        match self {
            CrawlServiceError::Quota { .. } => Escalation::Recoverable,
            CrawlServiceError::Service { .. } => Escalation::Fatal,
        }
    }
}

impl From<apify_client::ApifyError> for CrawlServiceError {
    fn from(err: apify_client::ApifyError) -> Self {
        if err.is_quota_exhausted() {
            CrawlServiceError::Quota {
                message: err.to_string(),
            }
        } else {
            CrawlServiceError::Service {
                message: err.to_string(),
            }
        }
    }
}

/// Errors surfaced by the content assembler.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// No privacy-policy URL was supplied or discoverable
    #[error("no privacy policy found for {site}")]
    NoPolicyFound { site: String },

    /// Content acquisition failed after the policy URL was known
    #[error("failed to acquire privacy content for {site}: {source}")]
    Failed {
        site: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AcquisitionError {
    pub(crate) fn failed(
        site: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AcquisitionError::Failed {
            site: site.to_string(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AcquisitionError::NoPolicyFound { .. })
    }
}

/// Result type alias for lightweight fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for headless renders.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Result type alias for any page strategy.
pub type PageResult<T> = std::result::Result<T, PageError>;

/// Result type alias for remote crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlServiceError>;

/// Result type alias for assembly.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;
