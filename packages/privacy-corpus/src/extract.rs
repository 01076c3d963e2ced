//! DOM text extraction shared by the fetcher and the renderer.
//!
//! Strips non-content elements, picks the first substantial content
//! container from a priority list and normalizes whitespace.

use indexmap::IndexSet;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::types::page::PageStructure;
use crate::url::resolve_href;

/// Elements whose text never belongs to the policy body.
pub const NON_CONTENT_SELECTOR: &str = "script, style, noscript, template, nav, header, footer, aside, \
     .nav, .navigation, .menu, .sidebar, [role=\"navigation\"]";

/// Content containers in priority order.
pub const CONTENT_CONTAINERS: &[&str] = &[
    "main",
    ".main-content",
    ".content",
    ".policy-content",
    ".privacy-policy",
    ".privacy-content",
    "article",
    ".article",
];

/// URL keywords that mark a link as privacy-related.
pub const RELATED_LINK_KEYWORDS: &[&str] =
    &["privacy", "policy", "terms", "cookie", "legal", "data"];

/// Elements that start a new line of text. Inline elements join their
/// neighbours without a separator.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "body", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Title used when a page has neither `<title>` nor `<h1>`.
pub const FALLBACK_TITLE: &str = "Privacy Policy";

// The selectors below are compile-time constants; parsing cannot fail.
static NON_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(NON_CONTENT_SELECTOR).expect("valid selector"));
static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_CONTAINERS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").expect("valid selector"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Title, body text and structure pulled from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub text: String,
    pub structure: PageStructure,
}

/// Extract normalized content from an HTML document.
///
/// `base_url` is used to absolutize harvested links.
pub fn extract_content(html: &str, base_url: &Url, min_container_chars: usize) -> ExtractedContent {
    let document = Html::parse_document(html);

    ExtractedContent {
        title: extract_title(&document),
        text: extract_main_text(&document, min_container_chars),
        structure: PageStructure {
            headers: extract_headings(&document),
            links: extract_related_links(&document, base_url),
        },
    }
}

/// `<title>`, else the first `<h1>`, else "Privacy Policy".
pub fn extract_title(document: &Html) -> String {
    [&*TITLE, &*H1]
        .into_iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Text of the first container over the threshold, else of the whole body.
pub fn extract_main_text(document: &Html, min_container_chars: usize) -> String {
    for selector in CONTAINERS.iter() {
        if let Some(container) = document.select(selector).next() {
            let text = visible_text(container);
            if text.chars().count() > min_container_chars {
                return text;
            }
        }
    }

    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    visible_text(root)
}

/// Normalized text of an element, skipping non-content subtrees.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_text(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if NON_CONTENT.matches(&child_el) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                collect_text(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn extract_headings(document: &Html) -> Vec<String> {
    document
        .select(&HEADINGS)
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn extract_related_links(document: &Html, base_url: &Url) -> Vec<String> {
    let links: IndexSet<String> = document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(base_url, href))
        .filter(|link| is_related_link(link))
        .collect();
    links.into_iter().collect()
}

/// True when a URL path mentions any privacy/policy/terms/cookie/legal/data keyword.
///
/// The host is ignored so that `datadog.com/pricing` does not qualify.
pub fn is_related_link(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url.to_ascii_lowercase(),
    };
    RELATED_LINK_KEYWORDS.iter().any(|k| path.contains(k))
}

/// Collapse every whitespace run to one space and trim.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
