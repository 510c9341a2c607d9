//! HTML parser for extracting links and metadata
//!
//! This module handles parsing fetched pages to extract:
//! - Links to follow, preferring navigation and content areas
//! - Page metadata for the artifact's front matter

use crate::markdown::PageMetadata;
use crate::url::{canonicalize, UrlFilter};
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Selectors for anchors in navigation, tables of contents and main content
const NAVIGATION_SELECTORS: &[&str] = &[
    "nav a[href]",
    ".toc a[href]",
    ".table-of-contents a[href]",
    ".sidebar a[href]",
    ".menu a[href]",
    "main a[href]",
    ".docs a[href]",
    ".documentation a[href]",
    "article a[href]",
];

/// Extracts crawlable links from a page
///
/// # Link Extraction Rules
///
/// 1. Collect anchors inside navigation, table-of-contents, sidebar, menu and
///    main-content areas
/// 2. If fewer than `min_nav_links` distinct links survive, scan every anchor
///    on the page instead
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only links
/// - Anything `filter` rejects (other sites, binary files, download actions)
///
/// Fragments are stripped. The result is deduplicated and in document order.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `page_url` - URL the page was served from, for resolving relative links
/// * `filter` - The crawl's link filter
/// * `min_nav_links` - Threshold below which all anchors are scanned
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sumi_scribe::crawler::extract_links;
/// use sumi_scribe::url::UrlFilter;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/guide/").unwrap();
/// let document = Html::parse_document(r#"<a href="intro">Intro</a><a href="/file.pdf">PDF</a>"#);
/// let links = extract_links(&document, &base, &UrlFilter::new(base.clone()), 5);
/// assert_eq!(links, vec!["https://docs.example.com/guide/intro"]);
/// ```
pub fn extract_links(
    document: &Html,
    page_url: &Url,
    filter: &UrlFilter,
    min_nav_links: usize,
) -> Vec<String> {
    let navigation = collect_links(document, NAVIGATION_SELECTORS, page_url, filter);

    if navigation.len() >= min_nav_links {
        return navigation;
    }

    tracing::trace!(
        url = %page_url,
        found = navigation.len(),
        "Few navigation links, scanning all anchors"
    );
    collect_links(document, &["a[href]"], page_url, filter)
}

/// Collects filtered links for the given selectors in document order
fn collect_links(
    document: &Html,
    selectors: &[&str],
    page_url: &Url,
    filter: &UrlFilter,
) -> Vec<String> {
    let selector_list = selectors.join(", ");
    let Ok(selector) = Selector::parse(&selector_list) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(url) = canonicalize(href, page_url) else {
            continue;
        };

        if filter.is_valid_url(&url) && seen.insert(url.to_string()) {
            links.push(url.to_string());
        }
    }

    links
}

/// Extracts front matter metadata from a page
///
/// Missing fields are left empty. The capture time is now.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `url` - The page URL recorded in the metadata
pub fn extract_metadata(document: &Html, url: &Url) -> PageMetadata {
    let mut metadata = PageMetadata {
        url: url.to_string(),
        title: extract_title(document).unwrap_or_default(),
        scraped_at: Some(Utc::now()),
        ..Default::default()
    };

    let Ok(meta_selector) = Selector::parse("meta[content]") else {
        return metadata;
    };

    for meta in document.select(&meta_selector) {
        let element = meta.value();
        let key = element
            .attr("name")
            .or_else(|| element.attr("property"))
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        let content = element.attr("content").unwrap_or("").trim();

        if content.is_empty() {
            continue;
        }

        match key.as_str() {
            "description" => metadata.description = content.to_string(),
            "og:description" if metadata.description.is_empty() => {
                metadata.description = content.to_string()
            }
            "keywords" => {
                metadata.keywords = content
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            }
            "author" => metadata.author = content.to_string(),
            _ => {}
        }
    }

    metadata
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    fn filter() -> UrlFilter {
        UrlFilter::new(Url::parse("https://docs.example.com/guide/").unwrap())
    }

    fn links(html: &str, min_nav_links: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        extract_links(&document, &page_url(), &filter(), min_nav_links)
    }

    #[test]
    fn test_extract_relative_link() {
        assert_eq!(
            links(r#"<a href="setup">Setup</a>"#, 5),
            vec!["https://docs.example.com/guide/setup"]
        );
    }

    #[test]
    fn test_fragment_stripped_and_deduplicated() {
        assert_eq!(
            links(
                r##"<a href="setup#a">A</a><a href="setup#b">B</a><a href="/guide/setup">C</a>"##,
                5
            ),
            vec!["https://docs.example.com/guide/setup"]
        );
    }

    #[test]
    fn test_skip_special_links() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@b.c">mail</a>
            <a href="tel:123">tel</a>
            <a href="data:text/plain,hi">data</a>
            <a href="#top">top</a>
            <a href="/guide/file.zip" download>zip</a>
            <a href="/guide/report" download>report</a>
            <a href="https://elsewhere.example.org/">other</a>
            <a href="/guide/ok">ok</a>
        "##;
        assert_eq!(links(html, 5), vec!["https://docs.example.com/guide/ok"]);
    }

    #[test]
    fn test_navigation_links_preferred() {
        let html = r#"<html><body>
            <nav>
                <a href="/guide/a">A</a><a href="/guide/b">B</a>
            </nav>
            <div class="footer"><a href="/guide/footer">F</a></div>
        </body></html>"#;

        assert_eq!(
            links(html, 2),
            vec!["https://docs.example.com/guide/a", "https://docs.example.com/guide/b"]
        );
    }

    #[test]
    fn test_fallback_to_all_anchors_below_threshold() {
        let html = r#"<html><body>
            <nav><a href="/guide/a">A</a></nav>
            <div class="footer"><a href="/guide/footer">F</a></div>
        </body></html>"#;

        assert_eq!(
            links(html, 5),
            vec!["https://docs.example.com/guide/a", "https://docs.example.com/guide/footer"]
        );
    }

    #[test]
    fn test_document_order_across_selectors() {
        let html = r#"<html><body>
            <main><a href="/guide/one">1</a></main>
            <nav><a href="/guide/two">2</a></nav>
        </body></html>"#;

        assert_eq!(
            links(html, 1),
            vec!["https://docs.example.com/guide/one", "https://docs.example.com/guide/two"]
        );
    }

    #[test]
    fn test_extract_metadata() {
        let html = r#"<html><head>
            <title>  Intro | Docs  </title>
            <meta name="description" content="Getting started">
            <meta name="keywords" content="rust, docs, , crawler ">
            <meta name="author" content="Docs Team">
        </head><body></body></html>"#;
        let metadata = extract_metadata(&Html::parse_document(html), &page_url());

        assert_eq!(metadata.url, "https://docs.example.com/guide/intro");
        assert_eq!(metadata.title, "Intro | Docs");
        assert_eq!(metadata.description, "Getting started");
        assert_eq!(metadata.keywords, vec!["rust", "docs", "crawler"]);
        assert_eq!(metadata.author, "Docs Team");
        assert!(metadata.scraped_at.is_some());
    }

    #[test]
    fn test_og_description_fallback() {
        let html = r#"<html><head>
            <meta property="og:description" content="From Open Graph">
        </head></html>"#;
        let metadata = extract_metadata(&Html::parse_document(html), &page_url());
        assert_eq!(metadata.description, "From Open Graph");
    }

    #[test]
    fn test_plain_description_beats_og() {
        let html = r#"<html><head>
            <meta property="og:description" content="OG">
            <meta name="description" content="Plain">
        </head></html>"#;
        let metadata = extract_metadata(&Html::parse_document(html), &page_url());
        assert_eq!(metadata.description, "Plain");
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let metadata = extract_metadata(&Html::parse_document("<p>x</p>"), &page_url());
        assert!(metadata.title.is_empty());
        assert!(metadata.description.is_empty());
        assert!(metadata.keywords.is_empty());
        assert!(metadata.author.is_empty());
    }
}
