//! Integration tests for the acquisition pipeline.
//!
//! A wiremock server plays the target website; the crawl service is a
//! `MockCrawlBackend` behind the real `RemoteCrawler`.
//!
//! 1. Locate the policy link on the home page
//! 2. Fetch it over HTTP
//! 3. Discover and scrape supplementary pages remotely
//! 4. Merge with provenance markers

use privacy_corpus::{
    testing::{MockCrawlBackend, MockFetcher},
    types::content::provenance_marker,
    AcquisitionConfig, AcquisitionError, AcquisitionMethod, ContentAssembler, CrawlRecord,
    CrawlServiceError, ExtractMode, FetchCascade, HttpFetcher, NullCrawler, PageOrigin,
    PolicyLocator, RemoteCrawler, ScrapedPage, SiteCrawler,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Roughly `chars` characters of policy prose.
fn prose(chars: usize) -> String {
    "We value your privacy. "
        .repeat(chars / 23 + 1)
        .chars()
        .take(chars)
        .collect::<String>()
        .trim()
        .to_string()
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body>\
         <nav><a href=\"/\">Home</a></nav><main><p>{body}</p></main>\
         <footer><a href=\"/privacy-policy\">Privacy Policy</a></footer></body></html>"
    )
}

async fn serve(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Site with a home page linking to a policy of `policy_chars` characters.
async fn start_site(policy_chars: usize) -> MockServer {
    let server = MockServer::start().await;
    serve(&server, "/", html_page("Acme", "Welcome to Acme.")).await;
    serve(&server, "/privacy-policy", html_page("Acme Privacy Policy", &prose(policy_chars))).await;
    server
}

fn record(url: String, chars: usize) -> CrawlRecord {
    CrawlRecord {
        url,
        title: Some("Related".to_string()),
        text: Some(prose(chars)),
        ..Default::default()
    }
}

fn assembler(crawler: Arc<dyn SiteCrawler>) -> ContentAssembler {
    let config = AcquisitionConfig::default();
    ContentAssembler::new(
        Arc::new(PolicyLocator::new(config.clone()).unwrap()),
        Arc::new(FetchCascade::new().then(HttpFetcher::new(config.clone()).unwrap())),
        crawler,
        config,
    )
}

fn remote(backend: &MockCrawlBackend) -> Arc<dyn SiteCrawler> {
    Arc::new(RemoteCrawler::new(backend.clone(), &AcquisitionConfig::default()))
}

#[tokio::test]
async fn test_simple_acquisition_without_crawl_service() {
    let site = start_site(1500).await;

    let content = assembler(Arc::new(NullCrawler))
        .assemble(&site.uri(), None)
        .await
        .unwrap();

    assert_eq!(content.primary.url, format!("{}/privacy-policy", site.uri()));
    assert_eq!(content.primary.title, "Acme Privacy Policy");
    assert_eq!(content.primary.origin, PageOrigin::Http);
    assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Simple);
    assert_eq!(content.metadata.total_pages, 1);
    assert!(!content.all_content.contains("Home"));
}

#[tokio::test]
async fn test_mixed_acquisition_merges_in_discovery_order() {
    let site = start_site(1500).await;
    let terms = format!("{}/terms", site.uri());
    let cookies = format!("{}/cookie-policy", site.uri());

    let backend = MockCrawlBackend::new()
        .with_discovered_links(vec![
            format!("{}/privacy-policy", site.uri()),
            terms.clone(),
            format!("{}/careers/privacy", site.uri()),
            cookies.clone(),
        ])
        .with_record(record(format!("{}/privacy-policy", site.uri()), 1500))
        .with_record(record(terms.clone(), 300))
        .with_record(record(cookies.clone(), 250));

    let content = assembler(remote(&backend))
        .assemble(&site.uri(), None)
        .await
        .unwrap();

    assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Mixed);
    assert_eq!(content.metadata.total_pages, 3);
    assert_eq!(content.metadata.total_pages, 1 + content.additional.len());

    let primary_at = content.all_content.find(&content.primary.text).unwrap();
    let terms_at = content.all_content.find(&provenance_marker(&terms)).unwrap();
    let cookies_at = content.all_content.find(&provenance_marker(&cookies)).unwrap();
    assert!(primary_at < terms_at && terms_at < cookies_at);
    assert!(content.all_content.len() >= content.primary.text.len());

    let jobs = backend.jobs();
    assert_eq!(jobs[0].extract_mode, ExtractMode::LinkHarvest);
    assert_eq!(
        jobs[1].seed_urls,
        vec![format!("{}/privacy-policy", site.uri()), terms, cookies]
    );
}

#[tokio::test]
async fn test_thin_policy_is_enhanced_remotely() {
    let site = start_site(400).await;
    let policy = format!("{}/privacy-policy", site.uri());
    let backend = MockCrawlBackend::new().with_record(record(policy.clone(), 2000));

    let content = assembler(remote(&backend))
        .assemble(&site.uri(), Some(&policy))
        .await
        .unwrap();

    assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Enhanced);
    assert!(content.primary.text_len() > 1000);
    assert_eq!(content.primary.origin, PageOrigin::RemoteCrawl);
}

#[tokio::test]
async fn test_quota_exhaustion_retries_light_profile_with_same_urls() {
    let site = start_site(1500).await;
    let terms = format!("{}/terms", site.uri());

    // Rich extraction only runs on the full profile; make it hit the memory limit.
    let backend = MockCrawlBackend::new()
        .with_discovered_links(vec![terms.clone()])
        .with_record(record(terms.clone(), 300))
        .fail_mode(ExtractMode::RichContent, || CrawlServiceError::Quota {
            message: "actor-memory-limit-exceeded".to_string(),
        });

    let content = assembler(remote(&backend))
        .assemble(&site.uri(), None)
        .await
        .unwrap();

    let scrapes: Vec<_> = backend
        .jobs()
        .into_iter()
        .filter(|j| j.link_selector.is_none())
        .collect();
    assert_eq!(scrapes.len(), 2);
    assert_eq!(scrapes[0].extract_mode, ExtractMode::RichContent);
    assert_eq!(scrapes[1].extract_mode, ExtractMode::PlainText);
    assert_eq!(scrapes[0].seed_urls, scrapes[1].seed_urls);
    assert_eq!(content.metadata.acquisition_method, AcquisitionMethod::Mixed);
    assert_eq!(content.additional[0].url, terms);
}

#[tokio::test]
async fn test_no_policy_found_is_not_masked() {
    let server = MockServer::start().await;
    serve(&server, "/", "<html><body><p>Nothing here</p></body></html>".to_string()).await;

    let asm = assembler(Arc::new(NullCrawler));

    let err = asm.assemble(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, AcquisitionError::NoPolicyFound { .. }));

    let err = asm.assemble_with_fallback(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, AcquisitionError::NoPolicyFound { .. }));
}

#[tokio::test]
async fn test_unreachable_policy_fails_after_fallback() {
    let server = MockServer::start().await;
    let missing = format!("{}/gone", server.uri());

    let err = assembler(Arc::new(NullCrawler))
        .assemble_with_fallback(&server.uri(), Some(&missing))
        .await
        .unwrap_err();

    assert!(matches!(err, AcquisitionError::Failed { .. }));
}

#[tokio::test]
async fn test_fetch_falls_back_to_second_tier() {
    let server = MockServer::start().await;
    let url = format!("{}/privacy", server.uri());
    let config = AcquisitionConfig::default();

    let rendered = MockFetcher::new("browser").with_page(ScrapedPage::new(
        url.clone(),
        "Rendered",
        prose(1200),
        PageOrigin::Browser,
    ));
    let cascade = FetchCascade::new()
        .then(HttpFetcher::new(config.clone()).unwrap())
        .then(rendered.clone());

    let asm = ContentAssembler::new(
        Arc::new(PolicyLocator::new(config.clone()).unwrap()),
        Arc::new(cascade),
        Arc::new(NullCrawler),
        config,
    );
    let content = asm.assemble(&server.uri(), Some(&url)).await.unwrap();

    assert_eq!(content.primary.origin, PageOrigin::Browser);
    assert_eq!(rendered.calls(), vec![url]);
}
