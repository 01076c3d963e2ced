//! Policy URL discovery trait.

use async_trait::async_trait;

/// Finds the single most likely privacy-policy URL for a site.
#[async_trait]
pub trait PolicyFinder: Send + Sync {
    /// Returns `None` when nothing is found, including when the site is unreachable.
    async fn find_policy_url(&self, site_url: &str) -> Option<String>;
}
