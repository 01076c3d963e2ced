//! The assembled privacy corpus handed to analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::page::ScrapedPage;

/// How the final corpus was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMethod {
    /// Primary page only
    Simple,
    /// Primary text replaced by a richer remote re-fetch
    Enhanced,
    /// Primary plus supplementary pages
    Mixed,
}

impl fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AcquisitionMethod::Simple => "simple",
            AcquisitionMethod::Enhanced => "enhanced",
            AcquisitionMethod::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionMetadata {
    /// Always `1 + additional.len()`
    pub total_pages: usize,
    /// Whitespace-token count of `all_content`
    pub total_word_count: usize,
    pub acquisition_method: AcquisitionMethod,
    pub timestamp: DateTime<Utc>,
}

/// Primary policy text plus supplementary pages, merged into one document.
///
/// Built once per request and never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledPrivacyContent {
    pub primary: ScrapedPage,
    /// Supplementary pages in discovery order
    pub additional: Vec<ScrapedPage>,
    pub all_content: String,
    pub metadata: AcquisitionMetadata,
}

/// Marker line written before each supplementary block.
pub fn provenance_marker(url: &str) -> String {
    format!("--- Additional Privacy Content from {url} ---")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serialization() {
        assert_eq!(
            serde_json::to_string(&AcquisitionMethod::Enhanced).unwrap(),
            "\"enhanced\""
        );
        assert_eq!(AcquisitionMethod::Mixed.to_string(), "mixed");
    }

    #[test]
    fn test_provenance_marker() {
        assert_eq!(
            provenance_marker("https://example.com/cookies"),
            "--- Additional Privacy Content from https://example.com/cookies ---"
        );
    }
}
