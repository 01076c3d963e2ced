//! Headless renderer for JavaScript-built pages.
//!
//! Every call launches its own Chromium with a throwaway profile directory
//! and tears it down before returning, success or not. Nothing is pooled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[cfg(not(feature = "browser"))]
use crate::error::RenderError;
use crate::error::{PageResult, RenderResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::config::AcquisitionConfig;
use crate::types::page::ScrapedPage;

/// Browser launch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Chrome/Chromium binary. `None` lets the driver search the usual locations.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Keep Chromium's sandbox on (default: true).
    /// Containers without user namespaces need this off.
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

fn default_sandbox() -> bool {
    true
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            sandbox: true,
            chrome_args: Vec::new(),
        }
    }
}

/// Renders pages in headless Chromium and extracts text from the live DOM.
pub struct BrowserRenderer {
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    config: AcquisitionConfig,
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    options: BrowserOptions,
}

impl BrowserRenderer {
    pub fn new(config: AcquisitionConfig, options: BrowserOptions) -> Self {
        Self { config, options }
    }

    /// Render a page and extract its content.
    #[cfg(feature = "browser")]
    pub async fn render(&self, url: &str) -> RenderResult<ScrapedPage> {
        imp::render(&self.config, &self.options, url).await
    }

    /// Rendering needs the `browser` feature.
    #[cfg(not(feature = "browser"))]
    pub async fn render(&self, _url: &str) -> RenderResult<ScrapedPage> {
        Err(RenderError::Unavailable)
    }
}

#[async_trait]
impl PageFetcher for BrowserRenderer {
    async fn fetch_page(&self, url: &str) -> PageResult<ScrapedPage> {
        Ok(self.render(url).await?)
    }

    fn name(&self) -> &str {
        "browser"
    }
}

#[cfg(feature = "browser")]
mod imp {
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use tracing::{debug, info, warn};
    use url::Url;

    use super::BrowserOptions;
    use crate::error::{RenderError, RenderResult};
    use crate::extract::{extract_content, word_count, NON_CONTENT_SELECTOR};
    use crate::types::config::AcquisitionConfig;
    use crate::types::page::{PageOrigin, ScrapedPage};

    /// Resolves once no new resource entries have appeared for 500ms after
    /// the document finished loading, or after 10s regardless.
    const NETWORK_IDLE_SCRIPT: &str = r#"
        new Promise((resolve) => {
            const started = Date.now();
            let last = performance.getEntriesByType('resource').length;
            let quiet = 0;
            const tick = () => {
                const now = performance.getEntriesByType('resource').length;
                quiet = (now === last && document.readyState === 'complete') ? quiet + 100 : 0;
                last = now;
                if (quiet >= 500 || Date.now() - started > 10000) {
                    resolve(now);
                } else {
                    setTimeout(tick, 100);
                }
            };
            tick();
        })
    "#;

    pub(super) async fn render(
        config: &AcquisitionConfig,
        options: &BrowserOptions,
        url: &str,
    ) -> RenderResult<ScrapedPage> {
        // Throwaway profile so concurrent calls never share state.
        let profile_dir =
            tempfile::tempdir().map_err(|e| RenderError::Launch(e.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir.path())
            .request_timeout(config.render_timeout)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--disable-background-networking");

        if let Some(ref path) = options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !options.sandbox {
            builder = builder.arg("--no-sandbox");
        }
        for arg in &options.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder.build().map_err(RenderError::Launch)?;

        info!(url = %url, "Launching headless browser");
        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = render_in(&browser, config, url).await;

        // Teardown runs on every path; failures here are not the caller's problem.
        if let Err(e) = browser.close().await {
            debug!(error = %e, "Browser close failed");
        }
        if let Err(e) = browser.wait().await {
            debug!(error = %e, "Browser process wait failed");
        }
        handler_task.abort();
        drop(profile_dir);

        result
    }

    async fn render_in(
        browser: &Browser,
        config: &AcquisitionConfig,
        url: &str,
    ) -> RenderResult<ScrapedPage> {
        let navigation = async {
            let page = browser.new_page("about:blank").await?;
            page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
                .await?;
            page.goto(url).await?;
            Ok::<Page, CdpError>(page)
        };

        let page = tokio::time::timeout(config.render_timeout, navigation)
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| navigation_error(url, e))?;

        let extracted = tokio::time::timeout(config.render_timeout, extract_live(&page, config, url))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
            });

        if let Err(e) = page.close().await {
            debug!(error = %e, "Page close failed");
        }

        extracted?
    }

    async fn extract_live(
        page: &Page,
        config: &AcquisitionConfig,
        url: &str,
    ) -> RenderResult<ScrapedPage> {
        if let Err(e) = page.evaluate(NETWORK_IDLE_SCRIPT.to_string()).await {
            warn!(url = %url, error = %e, "Could not wait for network idle");
        }
        tokio::time::sleep(config.render_settle).await;

        let strip = format!(
            "document.querySelectorAll({:?}).forEach((el) => el.remove()); true",
            NON_CONTENT_SELECTOR
        );
        page.evaluate(strip)
            .await
            .map_err(|e| navigation_error(url, e))?;

        let html = page.content().await.map_err(|e| navigation_error(url, e))?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .or_else(|| Url::parse(url).ok())
            .ok_or_else(|| RenderError::Navigation {
                url: url.to_string(),
                message: "unparseable page URL".to_string(),
            })?;

        let content = extract_content(&html, &final_url, config.min_container_chars);
        let words = word_count(&content.text);

        debug!(url = %url, chars = content.text.len(), words, "Page rendered");

        Ok(
            ScrapedPage::new(url, content.title, content.text, PageOrigin::Browser)
                .with_word_count(words)
                .with_structure(content.structure),
        )
    }

    fn navigation_error(url: &str, e: CdpError) -> RenderError {
        RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_keep_sandbox() {
        let options = BrowserOptions::default();
        assert!(options.sandbox);
        assert!(options.chrome_executable.is_none());
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: BrowserOptions = serde_json::from_str(r#"{"chrome_args":["--lang=en"]}"#).unwrap();
        assert!(options.sandbox);
        assert_eq!(options.chrome_args, vec!["--lang=en"]);
    }

    #[test]
    fn test_renderer_name() {
        let renderer = BrowserRenderer::new(AcquisitionConfig::default(), BrowserOptions::default());
        assert_eq!(renderer.name(), "browser");
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_render_unavailable_without_feature() {
        let renderer = BrowserRenderer::new(AcquisitionConfig::default(), BrowserOptions::default());
        let err = renderer.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, RenderError::Unavailable));
    }
}
