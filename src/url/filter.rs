use crate::url::domain::site_key;
use url::Url;

/// File extensions that never hold documentation pages
const DENIED_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "epub",
    // archives
    "zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz",
    // images
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "avif",
    // video
    "mp4", "mov", "avi", "mkv", "webm",
    // audio
    "mp3", "wav", "ogg", "flac",
    // stylesheets, scripts and feeds
    "css", "js", "mjs", "json", "xml", "rss", "atom", "map",
    // executables and packages
    "exe", "msi", "dmg", "deb", "rpm", "apk", "bin", "iso",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
];

/// Query-string fragments that signal a non-content action
const DENIED_QUERY_INTENTS: &[&str] = &["download", "export", "print"];

/// Cheap pre-filter deciding which links may enter the frontier
///
/// A link is admitted when it lives on the same site as the crawl's base URL,
/// does not point at a binary or asset file, and does not trigger a download,
/// export or print action. This is advisory filtering, not a security boundary.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    base: Url,
    site: Option<String>,
}

impl UrlFilter {
    /// Creates a filter scoped to the site of `base`
    pub fn new(base: Url) -> Self {
        let site = site_key(&base);
        Self { base, site }
    }

    /// The base URL this filter is scoped to
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns true if `url` may be crawled
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_scribe::url::UrlFilter;
    /// use url::Url;
    ///
    /// let filter = UrlFilter::new(Url::parse("https://docs.example.com/guide/").unwrap());
    /// assert!(filter.is_valid_url(&Url::parse("https://docs.example.com/guide/intro").unwrap()));
    /// assert!(!filter.is_valid_url(&Url::parse("https://docs.example.com/guide/file.pdf").unwrap()));
    /// ```
    pub fn is_valid_url(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if self.site.is_none() || site_key(url) != self.site {
            return false;
        }

        if has_denied_extension(url.path()) {
            return false;
        }

        if let Some(query) = url.query() {
            let query = query.to_ascii_lowercase();
            if DENIED_QUERY_INTENTS
                .iter()
                .any(|intent| query.contains(intent))
            {
                return false;
            }
        }

        true
    }
}

/// Checks the last path segment against the extension denylist
fn has_denied_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_ascii_lowercase();
            DENIED_EXTENSIONS.contains(&extension.as_str())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> UrlFilter {
        UrlFilter::new(Url::parse("https://docs.example.com/guide/").unwrap())
    }

    fn valid(url: &str) -> bool {
        Url::parse(url)
            .map(|parsed| filter().is_valid_url(&parsed))
            .unwrap_or(false)
    }

    #[test]
    fn test_same_domain_pages_admitted() {
        assert!(valid("https://docs.example.com/guide/intro"));
        assert!(valid("https://docs.example.com/guide/setup"));
    }

    #[test]
    fn test_same_domain_outside_base_path_admitted() {
        assert!(valid("https://docs.example.com/blog/post"));
    }

    #[test]
    fn test_extension_denylist() {
        assert!(!valid("https://docs.example.com/guide/file.pdf"));
        assert!(!valid("https://docs.example.com/assets/logo.PNG"));
        assert!(!valid("https://docs.example.com/static/app.js"));
        assert!(!valid("https://docs.example.com/releases/tool.tar.gz"));
        assert!(!valid("https://docs.example.com/fonts/inter.woff2"));
    }

    #[test]
    fn test_extension_only_checked_on_last_segment() {
        assert!(valid("https://docs.example.com/v1.json/overview"));
        assert!(valid("https://docs.example.com/guide/v2.0"));
    }

    #[test]
    fn test_other_domains_rejected() {
        assert!(!valid("https://example.org/guide/intro"));
        assert!(!valid("https://blog.example.com/guide/intro"));
    }

    #[test]
    fn test_www_prefix_is_same_site() {
        let filter = UrlFilter::new(Url::parse("https://example.com/docs/").unwrap());
        let page = Url::parse("https://www.example.com/docs/intro").unwrap();
        assert!(filter.is_valid_url(&page));
    }

    #[test]
    fn test_scheme_change_is_same_site() {
        assert!(valid("http://docs.example.com/guide/intro"));
    }

    #[test]
    fn test_port_must_match() {
        assert!(!valid("https://docs.example.com:8443/guide/intro"));
    }

    #[test]
    fn test_query_intents_rejected() {
        assert!(!valid("https://docs.example.com/guide/intro?format=print"));
        assert!(!valid("https://docs.example.com/page?action=Download"));
        assert!(!valid("https://docs.example.com/page?export=csv"));
    }

    #[test]
    fn test_harmless_query_admitted() {
        assert!(valid("https://docs.example.com/search?q=routing"));
    }

    #[test]
    fn test_unparseable_rejected() {
        assert!(!valid("not a url"));
    }
}
