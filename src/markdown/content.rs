use crate::config::NamedSelector;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Containers that usually hold the documentation itself, in priority order
const CONTENT_CONTAINERS: &[&str] = &[
    "main",
    "article",
    ".content",
    ".documentation",
    ".docs",
    ".doc-content",
    ".main-content",
    ".primary-content",
    "#content",
    "#main",
    ".markdown-body",
    "[role=\"main\"]",
    ".prose",
];

/// Page chrome removed when falling back to the whole body
const CHROME_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "script",
    "style",
    "noscript",
    ".navigation",
    ".nav",
    ".sidebar",
    ".menu",
    ".header",
    ".footer",
    ".ad",
    ".ads",
    ".advertisement",
    ".cookie-notice",
    ".cookie-banner",
    ".banner",
    ".social",
    ".share",
    ".related",
    ".comments",
];

/// Which rule picked the main content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A user-supplied selector, by name
    Custom(String),
    /// One of the built-in documentation containers
    Container(&'static str),
    /// The body with navigation and other chrome removed
    Body,
    /// The whole document; the page had no body
    Document,
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => write!(f, "custom selector '{}'", name),
            Self::Container(selector) => write!(f, "container '{}'", selector),
            Self::Body => write!(f, "cleaned body"),
            Self::Document => write!(f, "whole document"),
        }
    }
}

/// The HTML fragment chosen as a page's main content
#[derive(Debug, Clone)]
pub struct MainContent {
    pub html: String,
    pub source: ContentSource,
}

/// Selects the part of a page that holds the documentation
///
/// # Selection Order
///
/// 1. `custom` selectors in the given order; the first one matching wins
/// 2. Common documentation containers (`main`, `article`, `.content`, ...)
/// 3. `<body>` with navigation, headers, footers, ads and similar chrome removed
/// 4. The whole document
///
/// Custom selectors are validated at startup; one that fails to parse here is
/// ignored.
///
/// # Examples
///
/// ```
/// use sumi_scribe::markdown::{select_main_content, ContentSource};
///
/// let html = "<html><body><nav>menu</nav><main><h1>Guide</h1></main></body></html>";
/// let content = select_main_content(html, &[]);
/// assert_eq!(content.source, ContentSource::Container("main"));
/// assert!(content.html.contains("Guide"));
/// ```
pub fn select_main_content(html: &str, custom: &[NamedSelector]) -> MainContent {
    let mut document = Html::parse_document(html);

    for named in custom {
        let Ok(selector) = Selector::parse(&named.css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            tracing::debug!(name = %named.name, css = %named.css, "Using custom selector");
            return MainContent {
                html: element.html(),
                source: ContentSource::Custom(named.name.clone()),
            };
        }
    }

    for &css in CONTENT_CONTAINERS {
        if let Some(element) = first_match(&document, css) {
            tracing::debug!(selector = css, "Using documentation container");
            return MainContent {
                html: element.html(),
                source: ContentSource::Container(css),
            };
        }
    }

    let chrome: Vec<_> = match first_match(&document, "body") {
        Some(body) => CHROME_SELECTORS
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .flat_map(|selector| body.select(&selector).map(|e| e.id()).collect::<Vec<_>>())
            .collect(),
        None => {
            return MainContent {
                html: document.root_element().html(),
                source: ContentSource::Document,
            }
        }
    };

    for id in chrome {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    match first_match(&document, "body") {
        Some(body) => MainContent {
            html: body.html(),
            source: ContentSource::Body,
        },
        None => MainContent {
            html: document.root_element().html(),
            source: ContentSource::Document,
        },
    }
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, css: &str) -> NamedSelector {
        NamedSelector {
            name: name.to_string(),
            css: css.to_string(),
        }
    }

    #[test]
    fn test_custom_selector_wins() {
        let html = r#"<html><body><main>generic</main><div class="api-body">special</div></body></html>"#;
        let content = select_main_content(html, &[named("api", ".api-body")]);

        assert_eq!(content.source, ContentSource::Custom("api".to_string()));
        assert!(content.html.contains("special"));
        assert!(!content.html.contains("generic"));
    }

    #[test]
    fn test_custom_selectors_in_order() {
        let html = r#"<html><body><div id="a">A</div><div id="b">B</div></body></html>"#;
        let content = select_main_content(html, &[named("missing", "#zzz"), named("b", "#b"), named("a", "#a")]);

        assert_eq!(content.source, ContentSource::Custom("b".to_string()));
    }

    #[test]
    fn test_container_priority() {
        let html = r#"<html><body><div class="content">content</div><article>article</article></body></html>"#;
        let content = select_main_content(html, &[]);

        assert_eq!(content.source, ContentSource::Container("article"));
    }

    #[test]
    fn test_role_main_container() {
        let html = r#"<html><body><div role="main">docs</div></body></html>"#;
        let content = select_main_content(html, &[]);

        assert_eq!(content.source, ContentSource::Container("[role=\"main\"]"));
    }

    #[test]
    fn test_body_fallback_removes_chrome() {
        let html = r#"<html><body>
            <nav>Top menu</nav>
            <header>Site header</header>
            <div class="sidebar">Side links</div>
            <div class="cookie-banner">Accept cookies</div>
            <script>var x = 1;</script>
            <div><h1>Real title</h1><p>Real text</p></div>
            <footer>Copyright</footer>
        </body></html>"#;
        let content = select_main_content(html, &[]);

        assert_eq!(content.source, ContentSource::Body);
        assert!(content.html.contains("Real title"));
        assert!(content.html.contains("Real text"));
        for chrome in ["Top menu", "Site header", "Side links", "Accept cookies", "var x", "Copyright"] {
            assert!(!content.html.contains(chrome), "{} should be removed", chrome);
        }
    }

    #[test]
    fn test_invalid_custom_selector_ignored() {
        let html = r#"<html><body><main>generic</main></body></html>"#;
        let content = select_main_content(html, &[named("broken", "[[[")]);

        assert_eq!(content.source, ContentSource::Container("main"));
    }
}
