use anyhow::{bail, Context, Result};
use privacy_corpus::{
    ApifyBackend, BrowserRenderer, ContentAssembler, FetchCascade, NullCrawler, PageFetcher,
    PolicyLocator, RemoteCrawler, SiteCrawler,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;

pub async fn locate(config: &Config, site: &str) -> Result<()> {
    let locator = PolicyLocator::new(config.acquisition()).context("Failed to build locator")?;

    match locator.find_policy_url(site).await {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => bail!("no privacy policy found for {site}"),
    }
}

pub async fn fetch(config: &Config, url: &str, render: bool) -> Result<()> {
    let fetcher: Box<dyn PageFetcher> = if render {
        Box::new(BrowserRenderer::new(config.acquisition(), config.browser()))
    } else {
        Box::new(
            FetchCascade::standard(config.acquisition(), config.browser())
                .context("Failed to build fetch cascade")?,
        )
    };

    let page = fetcher
        .fetch_page(url)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;
    print_json(&page)
}

pub async fn assemble(
    config: &Config,
    site: &str,
    policy_url: Option<&str>,
    fallback: bool,
) -> Result<()> {
    let assembler = build_assembler(config)?;

    let content = if fallback {
        assembler.assemble_with_fallback(site, policy_url).await
    } else {
        assembler.assemble(site, policy_url).await
    }
    .with_context(|| format!("Failed to assemble privacy content for {site}"))?;

    print_json(&content)
}

fn build_assembler(config: &Config) -> Result<ContentAssembler> {
    let acquisition = config.acquisition();

    let crawler: Arc<dyn SiteCrawler> = match &config.apify_api_token {
        Some(token) => {
            let mut backend = ApifyBackend::new(token)
                .with_job_timeout(config.crawl_job_timeout)
                .with_min_container_chars(acquisition.min_container_chars);
            if let Some(base_url) = &config.apify_base_url {
                backend = backend.with_base_url(base_url.clone());
            }
            Arc::new(RemoteCrawler::new(backend, &acquisition))
        }
        None => {
            tracing::info!("APIFY_API_TOKEN not set, remote crawling disabled");
            Arc::new(NullCrawler)
        }
    };

    Ok(ContentAssembler::new(
        Arc::new(PolicyLocator::new(acquisition.clone()).context("Failed to build locator")?),
        Arc::new(
            FetchCascade::standard(acquisition.clone(), config.browser())
                .context("Failed to build fetch cascade")?,
        ),
        crawler,
        acquisition,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
