//! URL normalization and resolution helpers.

use url::Url;

/// Path segments that mark a page as off-topic even when a privacy keyword
/// appears somewhere in its URL.
const IRRELEVANT_SEGMENTS: &[&str] = &["contact", "careers", "press", "blog"];

/// Build the dedup key for a URL: scheme, host (with explicit port) and path,
/// lower-cased, without trailing slashes, query or fragment.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) if url.has_host() => {
            let host = url.host_str().unwrap_or_default();
            let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
            let path = url.path().trim_end_matches('/');
            format!("{}://{}{}{}", url.scheme(), host, port, path).to_lowercase()
        }
        _ => trimmed.trim_end_matches('/').to_lowercase(),
    }
}

/// True when both URLs share a dedup key.
pub fn same_page(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}

/// True when both URLs live on the same host, treating `www.` as optional.
///
/// Unparseable or host-less URLs never match.
pub fn same_site(a: &str, b: &str) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn site_host(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Resolve an `href` against a base URL.
///
/// Returns `None` for fragment-only links and non-navigational schemes.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// True when the URL points at contact, careers, press or blog content.
pub fn is_irrelevant_path(raw: &str) -> bool {
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => raw.to_ascii_lowercase(),
    };

    path.split(['/', '-', '_', '.'])
        .any(|segment| IRRELEVANT_SEGMENTS.contains(&segment))
}

/// Scheme, host and port of a URL, e.g. `https://example.com:8443`.
pub fn site_root(url: &Url) -> String {
    let mut root = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        root.push_str(&format!(":{port}"));
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trailing_slash_and_host_case() {
        assert_eq!(
            normalize_url("https://Example.COM/Privacy/"),
            normalize_url("https://example.com/privacy")
        );
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            normalize_url("https://example.com/privacy?lang=en#cookies"),
            "https://example.com/privacy"
        );
    }

    #[test]
    fn test_port_is_kept() {
        assert_ne!(
            normalize_url("http://127.0.0.1:8080/privacy"),
            normalize_url("http://127.0.0.1:9090/privacy")
        );
    }

    #[test]
    fn test_root_paths_match() {
        assert!(same_page("https://example.com/", "https://EXAMPLE.com"));
    }

    #[test]
    fn test_unparseable_falls_back() {
        assert_eq!(normalize_url("Not A Url/"), "not a url");
    }

    #[test]
    fn test_same_site_ignores_www_and_path() {
        assert!(same_site("https://www.databricks.com/legal/privacy", "https://databricks.com"));
        assert!(same_site("https://Example.com/a", "http://example.com:8080/b"));
        assert!(!same_site("https://policies.google.com/privacy", "https://databricks.com"));
        assert!(!same_site("https://docs.example.com/privacy", "https://example.com"));
        assert!(!same_site("not a url", "https://example.com"));
    }

    #[test]
    fn test_resolve_relative_href() {
        let base = Url::parse("https://example.com/en/home").unwrap();
        assert_eq!(
            resolve_href(&base, "/privacy-policy"),
            Some("https://example.com/privacy-policy".to_string())
        );
        assert_eq!(
            resolve_href(&base, "legal/privacy"),
            Some("https://example.com/en/legal/privacy".to_string())
        );
    }

    #[test]
    fn test_resolve_skips_non_links() {
        let base = Url::parse("https://example.com").unwrap();
        assert_eq!(resolve_href(&base, "#top"), None);
        assert_eq!(resolve_href(&base, "javascript:void(0)"), None);
        assert_eq!(resolve_href(&base, "mailto:privacy@example.com"), None);
        assert_eq!(resolve_href(&base, "tel:+15555550100"), None);
    }

    #[test]
    fn test_irrelevant_paths() {
        assert!(is_irrelevant_path("https://example.com/contact/privacy"));
        assert!(is_irrelevant_path("https://example.com/careers/data-privacy"));
        assert!(is_irrelevant_path("https://example.com/press-privacy"));
        assert!(is_irrelevant_path("https://example.com/blog/cookie-policy-update"));
        assert!(!is_irrelevant_path("https://example.com/legal/cookie-policy"));
        assert!(!is_irrelevant_path("https://example.com/privacy"));
    }

    #[test]
    fn test_site_root() {
        let url = Url::parse("http://127.0.0.1:4000/some/page").unwrap();
        assert_eq!(site_root(&url), "http://127.0.0.1:4000");
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(site_root(&url), "https://example.com");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            host in "[a-zA-Z][a-zA-Z0-9]{0,10}\\.(com|org|io)",
            path in "(/[a-zA-Z0-9_-]{1,8}){0,4}",
            slash in proptest::bool::ANY,
        ) {
            let raw = format!("https://{host}{path}{}", if slash { "/" } else { "" });
            let once = normalize_url(&raw);
            prop_assert_eq!(normalize_url(&once), once.clone());
        }

        #[test]
        fn slash_and_host_case_do_not_change_key(
            host in "[a-z][a-z0-9]{0,10}\\.(com|org|io)",
            path in "(/[a-z0-9_-]{1,8}){0,4}",
        ) {
            let plain = format!("https://{host}{path}");
            let shouted = format!("https://{}{path}/", host.to_uppercase());
            prop_assert_eq!(normalize_url(&plain), normalize_url(&shouted));
        }
    }
}
