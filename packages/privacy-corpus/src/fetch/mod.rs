//! Page retrieval strategies.
//!
//! - [`HttpFetcher`] - plain GET with a browser user agent, no JavaScript
//! - [`BrowserRenderer`] - isolated headless Chromium per call
//! - [`FetchCascade`] - ordered fallback across strategies

mod browser;
mod cascade;
mod http;

pub use browser::{BrowserOptions, BrowserRenderer};
pub use cascade::FetchCascade;
pub use http::HttpFetcher;
