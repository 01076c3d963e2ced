//! Comprehensive content assembly.
//!
//! Resolves the primary policy URL, fetches it through the page cascade,
//! pulls supplementary privacy pages from the remote crawler and merges
//! everything into one corpus.

use chrono::Utc;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AcquisitionError, AcquisitionResult};
use crate::extract::word_count;
use crate::traits::{crawler::SiteCrawler, fetcher::PageFetcher, locator::PolicyFinder};
use crate::types::config::AcquisitionConfig;
use crate::types::content::{
    provenance_marker, AcquisitionMetadata, AcquisitionMethod, AssembledPrivacyContent,
};
use crate::types::page::ScrapedPage;
use crate::url::{is_irrelevant_path, normalize_url, same_page, same_site};

/// Builds an [`AssembledPrivacyContent`] for a site.
///
/// Every collaborator is constructed once by the caller and shared. Calls
/// are independent; nothing is cached between them.
///
/// # Example
///
/// ```rust,ignore
/// let assembler = ContentAssembler::new(
///     Arc::new(PolicyLocator::new(config.clone())?),
///     Arc::new(FetchCascade::standard(config.clone(), BrowserOptions::default())?),
///     Arc::new(RemoteCrawler::new(ApifyBackend::new(&token), &config)),
///     config,
/// );
/// let corpus = assembler.assemble("https://example.com", None).await?;
/// ```
pub struct ContentAssembler {
    locator: Arc<dyn PolicyFinder>,
    fetcher: Arc<dyn PageFetcher>,
    crawler: Arc<dyn SiteCrawler>,
    config: AcquisitionConfig,
}

impl ContentAssembler {
    pub fn new(
        locator: Arc<dyn PolicyFinder>,
        fetcher: Arc<dyn PageFetcher>,
        crawler: Arc<dyn SiteCrawler>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            locator,
            fetcher,
            crawler,
            config,
        }
    }

    /// Run the full pipeline.
    ///
    /// Fails with [`AcquisitionError::NoPolicyFound`] when no primary URL is
    /// supplied or located, and with [`AcquisitionError::Failed`] when the
    /// primary page cannot be retrieved. Remote-crawl trouble only costs
    /// supplementary content.
    pub async fn assemble(
        &self,
        site_url: &str,
        policy_url: Option<&str>,
    ) -> AcquisitionResult<AssembledPrivacyContent> {
        let primary_url = self.resolve_primary_url(site_url, policy_url).await?;
        info!(site = %site_url, policy_url = %primary_url, "Assembling privacy content");

        let mut primary = self.acquire_primary(site_url, &primary_url).await?;

        let additional = self.gather_supplementary(site_url, &primary.url).await;
        let mut method = if additional.is_empty() {
            AcquisitionMethod::Simple
        } else {
            AcquisitionMethod::Mixed
        };

        // Last write wins: an enhanced primary reports `enhanced` even with supplements.
        if let Some(enhanced) = self.enhance(&primary).await {
            primary = enhanced;
            method = AcquisitionMethod::Enhanced;
        }

        let content = build_content(primary, additional, method);
        info!(
            site = %site_url,
            pages = content.metadata.total_pages,
            words = content.metadata.total_word_count,
            method = %content.metadata.acquisition_method,
            "Privacy content assembled"
        );
        Ok(content)
    }

    /// Full pipeline, falling back to primary-only acquisition on failure.
    ///
    /// A missing policy URL is returned as-is: there is nothing to fall back to.
    pub async fn assemble_with_fallback(
        &self,
        site_url: &str,
        policy_url: Option<&str>,
    ) -> AcquisitionResult<AssembledPrivacyContent> {
        match self.assemble(site_url, policy_url).await {
            Ok(content) => Ok(content),
            Err(e) if e.is_not_found() => Err(e),
            Err(e) => {
                warn!(site = %site_url, error = %e, "Full assembly failed, trying primary-only");
                self.assemble_primary_only(site_url, policy_url).await
            }
        }
    }

    /// Locate and fetch the primary page; no remote crawling.
    pub async fn assemble_primary_only(
        &self,
        site_url: &str,
        policy_url: Option<&str>,
    ) -> AcquisitionResult<AssembledPrivacyContent> {
        let primary_url = self.resolve_primary_url(site_url, policy_url).await?;
        let primary = self.acquire_primary(site_url, &primary_url).await?;
        Ok(build_content(primary, Vec::new(), AcquisitionMethod::Simple))
    }

    async fn resolve_primary_url(
        &self,
        site_url: &str,
        policy_url: Option<&str>,
    ) -> AcquisitionResult<String> {
        if let Some(url) = policy_url.map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }

        self.locator
            .find_policy_url(site_url)
            .await
            .ok_or_else(|| AcquisitionError::NoPolicyFound {
                site: site_url.to_string(),
            })
    }

    async fn acquire_primary(&self, site_url: &str, url: &str) -> AcquisitionResult<ScrapedPage> {
        self.fetcher
            .fetch_page(url)
            .await
            .map_err(|e| AcquisitionError::failed(site_url, e))
    }

    /// Discover, filter and scrape supplementary pages.
    async fn gather_supplementary(&self, site_url: &str, primary_url: &str) -> Vec<ScrapedPage> {
        let candidates = self.select_candidates(
            site_url,
            primary_url,
            self.crawler.find_related_pages(site_url).await,
        );
        if candidates.is_empty() {
            debug!(site = %site_url, "No supplementary candidates");
            return Vec::new();
        }

        let mut seeds = Vec::with_capacity(candidates.len() + 1);
        seeds.push(primary_url.to_string());
        seeds.extend(candidates);

        let pages = match self.crawler.scrape_pages(&seeds).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(site = %site_url, error = %e, "Supplementary scrape failed");
                return Vec::new();
            }
        };

        let mut seen = IndexSet::new();
        pages
            .into_iter()
            .filter(|page| !same_page(&page.url, primary_url))
            .filter(|page| page.text_len() > self.config.min_supplementary_chars)
            .filter(|page| seen.insert(normalize_url(&page.url)))
            .collect()
    }

    fn select_candidates(
        &self,
        site_url: &str,
        primary_url: &str,
        related: Vec<String>,
    ) -> Vec<String> {
        let mut seen = IndexSet::new();
        related
            .into_iter()
            .filter(|url| same_site(url, site_url))
            .filter(|url| !same_page(url, primary_url))
            .filter(|url| !is_irrelevant_path(url))
            .filter(|url| seen.insert(normalize_url(url)))
            .take(self.config.max_supplementary)
            .collect()
    }

    /// Re-scrape a thin primary page remotely; `Some` only when strictly longer.
    async fn enhance(&self, primary: &ScrapedPage) -> Option<ScrapedPage> {
        let current = primary.text_len();
        if current >= self.config.enhance_below_chars {
            return None;
        }

        debug!(url = %primary.url, chars = current, "Primary content thin, attempting enhancement");
        let pages = match self.crawler.scrape_pages(&[primary.url.clone()]).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(url = %primary.url, error = %e, "Enhancement scrape failed");
                return None;
            }
        };

        let richer = pages.into_iter().next()?;
        if richer.text_len() <= current {
            debug!(url = %primary.url, "Enhancement produced no improvement");
            return None;
        }

        info!(url = %primary.url, before = current, after = richer.text_len(), "Primary content enhanced");
        Some(ScrapedPage {
            title: richer.title,
            text: richer.text,
            word_count: richer.word_count,
            structure: richer.structure.or_else(|| primary.structure.clone()),
            origin: richer.origin,
            fetched_at: richer.fetched_at,
            ..primary.clone()
        })
    }
}

/// Merge primary and supplementary text and compute metadata.
fn build_content(
    primary: ScrapedPage,
    additional: Vec<ScrapedPage>,
    method: AcquisitionMethod,
) -> AssembledPrivacyContent {
    let mut blocks = Vec::with_capacity(additional.len() + 1);
    blocks.push(primary.text.clone());
    blocks.extend(
        additional
            .iter()
            .map(|page| format!("{}\n{}", provenance_marker(&page.url), page.text)),
    );
    let all_content = blocks.join("\n\n");

    AssembledPrivacyContent {
        metadata: AcquisitionMetadata {
            total_pages: 1 + additional.len(),
            total_word_count: word_count(&all_content),
            acquisition_method: method,
            timestamp: Utc::now(),
        },
        primary,
        additional,
        all_content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, PageError};
    use crate::testing::{MockCrawlCall, MockFetcher, MockPolicyFinder, MockSiteCrawler};
    use crate::types::page::PageOrigin;

    const SITE: &str = "https://example.com";
    const POLICY: &str = "https://example.com/privacy";

    fn text_of(chars: usize) -> String {
        "abcd ".repeat(chars / 5 + 1).chars().take(chars).collect()
    }

    fn page(url: &str, chars: usize, origin: PageOrigin) -> ScrapedPage {
        ScrapedPage::new(url, "Title", text_of(chars), origin)
    }

    fn assembler(
        locator: MockPolicyFinder,
        fetcher: MockFetcher,
        crawler: MockSiteCrawler,
    ) -> ContentAssembler {
        ContentAssembler::new(
            Arc::new(locator),
            Arc::new(fetcher),
            Arc::new(crawler),
            AcquisitionConfig::default(),
        )
    }

    fn primary_fetcher(chars: usize) -> MockFetcher {
        MockFetcher::new("http").with_page(page(POLICY, chars, PageOrigin::Http))
    }

    #[tokio::test]
    async fn test_simple_when_nothing_related() {
        let asm = assembler(
            MockPolicyFinder::found(POLICY),
            primary_fetcher(1500),
            MockSiteCrawler::new(),
        );

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Simple);
        assert_eq!(content.metadata.total_pages, 1);
        assert_eq!(content.all_content, content.primary.text);
    }

    #[tokio::test]
    async fn test_mixed_with_supplementary_pages() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec![
                "https://example.com/terms".to_string(),
                "https://example.com/cookies".to_string(),
            ])
            .with_page(page(POLICY, 1500, PageOrigin::RemoteCrawl))
            .with_page(page("https://example.com/terms", 300, PageOrigin::RemoteCrawl))
            .with_page(page("https://example.com/cookies", 250, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler.clone());

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Mixed);
        assert_eq!(content.metadata.total_pages, 3);
        assert_eq!(content.additional[0].url, "https://example.com/terms");
        assert_eq!(content.additional[1].url, "https://example.com/cookies");

        let expected = format!(
            "{}\n\n{}\n{}\n\n{}\n{}",
            content.primary.text,
            provenance_marker("https://example.com/terms"),
            content.additional[0].text,
            provenance_marker("https://example.com/cookies"),
            content.additional[1].text,
        );
        assert_eq!(content.all_content, expected);

        assert_eq!(
            crawler.scrape_calls()[0],
            vec![
                POLICY.to_string(),
                "https://example.com/terms".to_string(),
                "https://example.com/cookies".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_candidates_exclude_primary_and_irrelevant_paths() {
        let related = vec![
            "https://EXAMPLE.com/privacy/".to_string(),
            "https://example.com/contact-privacy".to_string(),
            "https://example.com/blog/privacy-tips".to_string(),
            "https://example.com/careers".to_string(),
            "https://example.com/terms".to_string(),
        ];
        let crawler = MockSiteCrawler::new().with_related(related);
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler.clone());

        asm.assemble(SITE, None).await.unwrap();

        assert_eq!(
            crawler.scrape_calls()[0],
            vec![POLICY.to_string(), "https://example.com/terms".to_string()]
        );
    }

    #[tokio::test]
    async fn test_candidates_capped_at_five() {
        let related: Vec<String> = (0..8).map(|i| format!("https://example.com/legal/{i}")).collect();
        let crawler = MockSiteCrawler::new().with_related(related);
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler.clone());

        asm.assemble(SITE, None).await.unwrap();

        assert_eq!(crawler.scrape_calls()[0].len(), 6);
    }

    #[tokio::test]
    async fn test_candidate_cap_follows_config() {
        let related: Vec<String> = (0..4).map(|i| format!("https://example.com/legal/{i}")).collect();
        let crawler = MockSiteCrawler::new().with_related(related);
        let asm = ContentAssembler::new(
            Arc::new(MockPolicyFinder::found(POLICY)),
            Arc::new(primary_fetcher(1500)),
            Arc::new(crawler.clone()),
            AcquisitionConfig::default().with_max_supplementary(2),
        );

        asm.assemble(SITE, None).await.unwrap();

        assert_eq!(
            crawler.scrape_calls()[0],
            vec![
                POLICY.to_string(),
                "https://example.com/legal/0".to_string(),
                "https://example.com/legal/1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_candidates_stay_on_site_host() {
        let related = vec![
            "https://policies.google.com/privacy".to_string(),
            "https://www.example.com/terms".to_string(),
            "https://help.example.com/cookies".to_string(),
        ];
        let crawler = MockSiteCrawler::new().with_related(related);
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler.clone());

        asm.assemble(SITE, None).await.unwrap();

        assert_eq!(
            crawler.scrape_calls()[0],
            vec![POLICY.to_string(), "https://www.example.com/terms".to_string()]
        );
    }

    #[tokio::test]
    async fn test_primary_under_variant_url_is_not_supplementary() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec!["https://example.com/terms".to_string()])
            .with_page(page("https://EXAMPLE.com/privacy/", 1800, PageOrigin::RemoteCrawl))
            .with_page(page("https://example.com/terms", 300, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler);

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Mixed);
        assert_eq!(content.additional.len(), 1);
        assert_eq!(content.additional[0].url, "https://example.com/terms");
        assert_eq!(content.metadata.total_pages, 2);
    }

    #[tokio::test]
    async fn test_short_supplementary_pages_are_not_merged() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec!["https://example.com/terms".to_string()])
            .with_page(page("https://example.com/terms", 150, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(1500), crawler);

        let content = asm.assemble(SITE, None).await.unwrap();

        assert!(content.additional.is_empty());
        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Simple);
        assert_eq!(content.metadata.total_pages, 1);
    }

    #[tokio::test]
    async fn test_thin_primary_is_enhanced() {
        let crawler = MockSiteCrawler::new().with_page(page(POLICY, 2000, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(400), crawler.clone());

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Enhanced);
        assert_eq!(content.primary.text_len(), 2000);
        assert_eq!(content.primary.origin, PageOrigin::RemoteCrawl);
        assert_eq!(crawler.scrape_calls(), vec![vec![POLICY.to_string()]]);
    }

    #[tokio::test]
    async fn test_enhancement_requires_strictly_longer_text() {
        let crawler = MockSiteCrawler::new().with_page(page(POLICY, 400, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(400), crawler);

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Simple);
        assert_eq!(content.primary.origin, PageOrigin::Http);
    }

    #[tokio::test]
    async fn test_enhanced_overrides_mixed() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec!["https://example.com/terms".to_string()])
            .with_page(page(POLICY, 2000, PageOrigin::RemoteCrawl))
            .with_page(page("https://example.com/terms", 300, PageOrigin::RemoteCrawl));
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(400), crawler);

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Enhanced);
        assert_eq!(content.metadata.total_pages, 2);
    }

    #[tokio::test]
    async fn test_supplied_url_skips_locator() {
        let locator = MockPolicyFinder::not_found();
        let asm = assembler(locator.clone(), primary_fetcher(1500), MockSiteCrawler::new());

        let content = asm.assemble(SITE, Some(POLICY)).await.unwrap();

        assert_eq!(content.primary.url, POLICY);
        assert!(locator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_policy_found() {
        let asm = assembler(
            MockPolicyFinder::not_found(),
            MockFetcher::new("http"),
            MockSiteCrawler::new(),
        );

        let err = asm.assemble(SITE, None).await.unwrap_err();
        assert!(err.is_not_found());

        let err = asm.assemble_with_fallback(SITE, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_primary_fetch_failure_is_wrapped() {
        let fetcher = MockFetcher::new("http").with_failure(POLICY, || {
            FetchError::Timeout { url: POLICY.into() }.into()
        });
        let asm = assembler(MockPolicyFinder::found(POLICY), fetcher, MockSiteCrawler::new());

        let err = asm.assemble(SITE, None).await.unwrap_err();

        match err {
            AcquisitionError::Failed { site, source } => {
                assert_eq!(site, SITE);
                assert!(source.downcast_ref::<PageError>().is_some());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_failures_degrade_gracefully() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec!["https://example.com/terms".to_string()])
            .with_scrape_failure("actor crashed");
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(400), crawler.clone());

        let content = asm.assemble(SITE, None).await.unwrap();

        assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Simple);
        assert_eq!(content.primary.text_len(), 400);
        assert_eq!(crawler.scrape_calls().len(), 2);
        assert!(matches!(crawler.calls()[0], MockCrawlCall::FindRelated { .. }));
    }

    #[tokio::test]
    async fn test_primary_only_skips_crawler() {
        let crawler = MockSiteCrawler::new()
            .with_related(vec!["https://example.com/terms".to_string()]);
        let asm = assembler(MockPolicyFinder::found(POLICY), primary_fetcher(400), crawler.clone());

        let content = asm.assemble_primary_only(SITE, None).await.unwrap();

        assert_eq!(content.metadata.total_pages, 1);
        assert!(crawler.calls().is_empty());
    }
}
