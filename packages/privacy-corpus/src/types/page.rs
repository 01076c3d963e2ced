//! Scraped page types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which strategy produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrigin {
    Http,
    Browser,
    RemoteCrawl,
}

/// Headings and outbound links captured alongside page text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructure {
    /// `h1`–`h3` text in document order
    pub headers: Vec<String>,
    /// Absolute privacy-relevant links found on the page
    pub links: Vec<String>,
}

/// A retrieved page with normalized text.
///
/// Immutable once produced; owned by whichever strategy created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    /// Whitespace-normalized text
    pub text: String,
    /// `Last-Modified` response header, verbatim
    pub last_modified: Option<String>,
    pub word_count: Option<usize>,
    pub structure: Option<PageStructure>,
    pub origin: PageOrigin,
    pub fetched_at: DateTime<Utc>,
}

impl ScrapedPage {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        origin: PageOrigin,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
            last_modified: None,
            word_count: None,
            structure: None,
            origin,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn with_word_count(mut self, count: usize) -> Self {
        self.word_count = Some(count);
        self
    }

    pub fn with_structure(mut self, structure: PageStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Text length in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}
