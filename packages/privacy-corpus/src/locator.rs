//! Privacy-policy URL discovery.
//!
//! Looks for the policy link on the home page, then in the footer, then
//! probes conventional paths. First hit wins.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::extract::normalize_text;
use crate::traits::locator::PolicyFinder;
use crate::types::config::AcquisitionConfig;
use crate::url::{resolve_href, site_root};

/// Phrases that identify a privacy-policy link. Matched against link text
/// as-is and against the href with spaces replaced by hyphens.
pub const POLICY_KEYWORDS: &[&str] = &[
    "privacy policy",
    "privacy notice",
    "data policy",
    "cookie policy",
    "privacy statement",
    "data protection",
    "privacy practices",
];

/// Conventional policy locations, probed in order.
pub const COMMON_POLICY_PATHS: &[&str] = &[
    "/privacy",
    "/privacy-policy",
    "/privacy.html",
    "/privacy.php",
    "/cookie-policy",
    "/data-policy",
    "/privacy-notice",
    "/privacy-statement",
];

const PRIVACY_ANCHORS: &str = "a[href*=\"privacy\" i], a[href*=\"cookie\" i], \
     a[href*=\"data-policy\" i], a[href*=\"data-protection\" i], \
     a.privacy-policy, a.privacy-link, a#privacy-policy, a#privacy-link, \
     .privacy-policy a, .privacy-link a";

const FOOTER_ANCHORS: &str = "footer a, .footer a";

// Constant selectors; parsing cannot fail.
static PRIVACY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(PRIVACY_ANCHORS).expect("valid selector"));
static FOOTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(FOOTER_ANCHORS).expect("valid selector"));

/// Finds a site's privacy-policy URL.
///
/// Never errors: an unreachable site is simply "not found".
pub struct PolicyLocator {
    client: reqwest::Client,
    config: AcquisitionConfig,
}

impl PolicyLocator {
    pub fn new(config: AcquisitionConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    /// Run the heuristics against `site_url`, which must be absolute.
    pub async fn find_policy_url(&self, site_url: &str) -> Option<String> {
        let site = match Url::parse(site_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(site = %site_url, error = %e, "Site URL is not absolute");
                return None;
            }
        };

        debug!(site = %site, "Fetching home page");
        let response = match self
            .client
            .get(site.clone())
            .timeout(self.config.locator_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(site = %site, error = %e, "Home page unreachable");
                return None;
            }
        };

        // Redirects (http → https, apex → www) decide the real base.
        let base = response.url().clone();

        if response.status().is_success() {
            match response.text().await {
                Ok(html) => {
                    if let Some(found) = find_in_document(&html, &base) {
                        info!(site = %site, policy_url = %found, "Policy link found on home page");
                        return Some(found);
                    }
                }
                Err(e) => warn!(site = %site, error = %e, "Failed to read home page body"),
            }
        } else {
            debug!(site = %site, status = %response.status(), "Home page returned error status");
        }

        let found = self.probe_common_paths(&base).await;
        match &found {
            Some(url) => info!(site = %site, policy_url = %url, "Policy found at conventional path"),
            None => info!(site = %site, "No privacy policy found"),
        }
        found
    }

    /// HEAD each conventional path; first 200 wins.
    async fn probe_common_paths(&self, base: &Url) -> Option<String> {
        let root = site_root(base);

        for path in COMMON_POLICY_PATHS {
            let candidate = format!("{root}{path}");
            match self
                .client
                .head(&candidate)
                .timeout(self.config.probe_timeout)
                .send()
                .await
            {
                Ok(response) if response.status().as_u16() == 200 => return Some(candidate),
                Ok(response) => {
                    debug!(url = %candidate, status = %response.status(), "Probe missed");
                }
                Err(e) => debug!(url = %candidate, error = %e, "Probe failed"),
            }
        }

        None
    }
}

#[async_trait]
impl PolicyFinder for PolicyLocator {
    async fn find_policy_url(&self, site_url: &str) -> Option<String> {
        PolicyLocator::find_policy_url(self, site_url).await
    }
}

/// Privacy-oriented anchors first, then footer anchors.
pub fn find_in_document(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    [&*PRIVACY_SELECTOR, &*FOOTER_SELECTOR]
        .into_iter()
        .find_map(|selector| {
            document
                .select(selector)
                .filter(|anchor| mentions_policy(anchor))
                .find_map(|anchor| {
                    anchor
                        .value()
                        .attr("href")
                        .and_then(|href| resolve_href(base, href))
                })
        })
}

fn mentions_policy(anchor: &ElementRef<'_>) -> bool {
    let text = normalize_text(&anchor.text().collect::<String>()).to_lowercase();
    let href = anchor
        .value()
        .attr("href")
        .unwrap_or_default()
        .to_lowercase();

    POLICY_KEYWORDS
        .iter()
        .any(|k| text.contains(k) || href.contains(&k.replace(' ', "-")))
}
