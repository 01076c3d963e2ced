use thiserror::Error;

/// Errors returned by the Apify client.
#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Apify API error ({status}): {message}")]
    Api {
        status: u16,
        /// Machine-readable `error.type` from the response body, when present.
        error_type: Option<String>,
        message: String,
    },

    #[error("Apify run ended with status {status}: {message}")]
    RunFailed { status: String, message: String },
}

impl ApifyError {
    /// True when the platform refused or killed the run for lack of memory or credit.
    ///
    /// Apify signals this with `402 Payment Required` or an
    /// `actor-memory-limit-exceeded` error type; a run that dies mid-flight
    /// reports the same condition only in its status message.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            ApifyError::Api {
                status,
                error_type,
                message,
            } => {
                *status == 402
                    || error_type
                        .as_deref()
                        .is_some_and(|t| t == MEMORY_LIMIT_EXCEEDED)
                    || mentions_memory_limit(message)
            }
            ApifyError::RunFailed { message, .. } => mentions_memory_limit(message),
            ApifyError::Http(_) => false,
        }
    }
}

pub(crate) const MEMORY_LIMIT_EXCEEDED: &str = "actor-memory-limit-exceeded";

fn mentions_memory_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains(MEMORY_LIMIT_EXCEEDED) || lower.contains("memory limit")
}

pub type Result<T> = std::result::Result<T, ApifyError>;
