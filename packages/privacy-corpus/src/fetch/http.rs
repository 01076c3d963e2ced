//! Lightweight HTTP fetcher.

use async_trait::async_trait;
use reqwest::header::LAST_MODIFIED;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult, PageResult};
use crate::extract::{extract_content, word_count};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::AcquisitionConfig;
use crate::types::page::{PageOrigin, ScrapedPage};

/// Fetches pages with a plain GET and extracts text from the static markup.
///
/// No JavaScript runs. For JS-rendered sites put a `BrowserRenderer`
/// behind it in a `FetchCascade`.
///
/// # Example
///
/// ```rust,ignore
/// use privacy_corpus::{AcquisitionConfig, HttpFetcher};
///
/// let fetcher = HttpFetcher::new(AcquisitionConfig::default())?;
/// let page = fetcher.fetch("https://example.com/privacy").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    config: AcquisitionConfig,
}

impl HttpFetcher {
    /// Create a fetcher whose client enforces the configured timeout and user agent.
    pub fn new(config: AcquisitionConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    /// GET a page and extract its content.
    pub async fn fetch(&self, url: &str) -> FetchResult<ScrapedPage> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(parsed).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            FetchError::from_reqwest(url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Capture final URL after redirects
        let final_url = response.url().clone();

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let content = extract_content(&html, &final_url, self.config.min_container_chars);
        let words = word_count(&content.text);

        debug!(
            url = %url,
            final_url = %final_url,
            chars = content.text.len(),
            words,
            "Page fetched successfully"
        );

        let mut page = ScrapedPage::new(url, content.title, content.text, PageOrigin::Http)
            .with_word_count(words)
            .with_structure(content.structure);
        if let Some(last_modified) = last_modified {
            page = page.with_last_modified(last_modified);
        }

        Ok(page)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> PageResult<ScrapedPage> {
        Ok(self.fetch(url).await?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(AcquisitionConfig::default()).unwrap()
    }

    async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_extracts_title_text_and_last_modified() {
        let server = MockServer::start().await;
        let html = r#"<html><head><title>Acme Privacy</title></head>
            <body><nav>Menu</nav><p>We never sell your data.</p><footer>(c)</footer></body></html>"#;
        serve(
            &server,
            "/privacy",
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .await;

        let url = format!("{}/privacy", server.uri());
        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert_eq!(page.title, "Acme Privacy");
        assert_eq!(page.text, "We never sell your data.");
        assert_eq!(page.word_count, Some(5));
        assert_eq!(page.origin, PageOrigin::Http);
        assert_eq!(
            page.last_modified.as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }

    #[tokio::test]
    async fn test_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", "TestAgent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
            .mount(&server)
            .await;

        let fetcher =
            HttpFetcher::new(AcquisitionConfig::default().with_user_agent("TestAgent/1.0")).unwrap();
        let page = fetcher.fetch(&format!("{}/ua", server.uri())).await.unwrap();
        assert_eq!(page.text, "ok");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        serve(&server, "/gone", ResponseTemplate::new(404)).await;

        let err = fetcher()
            .fetch(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/slow",
            ResponseTemplate::new(200)
                .set_body_string("<p>late</p>")
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let fetcher = HttpFetcher::new(
            AcquisitionConfig::default().with_fetch_timeout(Duration::from_millis(100)),
        )
        .unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Port 9 (discard) is closed on test hosts.
        let err = fetcher().fetch("http://127.0.0.1:9/privacy").await.unwrap_err();
        assert!(matches!(err, FetchError::Http { .. } | FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
