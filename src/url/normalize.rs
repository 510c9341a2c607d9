use crate::UrlError;
use url::Url;

/// Schemes that can never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href into the canonical form stored in the frontier
///
/// # Canonicalization Steps
///
/// 1. Trim the href; reject empty and fragment-only values
/// 2. Reject `javascript:`, `mailto:`, `tel:` and `data:` links
/// 3. Resolve against `base` (the page the link was found on)
/// 4. Keep only HTTP and HTTPS results
/// 5. Remove the fragment (everything after #)
///
/// Host lowercasing and dot-segment removal come from the `url` crate's own
/// parsing. Paths, trailing slashes and query strings are kept verbatim since
/// documentation sites routinely distinguish `/guide` from `/guide/`.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/guide/").unwrap();
/// let url = canonicalize("intro#install", &base).unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide/intro");
/// ```
pub fn canonicalize(href: &str, base: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Parse("empty href".to_string()));
    }

    if href.starts_with('#') {
        return Err(UrlError::Filtered(format!("fragment-only link {}", href)));
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return Err(UrlError::InvalidScheme(href.to_string()));
    }

    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Parses an absolute URL string and canonicalizes it
///
/// Used for seed URLs supplied by the user.
pub fn parse_absolute(url_str: &str) -> Result<Url, UrlError> {
    let parsed = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(parsed.as_str(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    #[test]
    fn test_relative_sibling() {
        let url = canonicalize("setup", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/guide/setup");
    }

    #[test]
    fn test_root_relative() {
        let url = canonicalize("/blog/post", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/blog/post");
    }

    #[test]
    fn test_fragment_removed() {
        let url = canonicalize("/guide/setup#step-2", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/guide/setup");
    }

    #[test]
    fn test_query_preserved() {
        let url = canonicalize("/search?q=rust", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/search?q=rust");
    }

    #[test]
    fn test_trailing_slash_preserved() {
        let url = canonicalize("/guide/", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/guide/");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let url = canonicalize("../api/./index", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/api/index");
    }

    #[test]
    fn test_host_lowercased() {
        let url = canonicalize("https://DOCS.Example.COM/Page", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/Page");
    }

    #[test]
    fn test_fragment_only_rejected() {
        assert!(matches!(
            canonicalize("#section", &base()),
            Err(UrlError::Filtered(_))
        ));
    }

    #[test]
    fn test_special_schemes_rejected() {
        for href in [
            "javascript:void(0)",
            "mailto:team@example.com",
            "tel:+123",
            "data:text/html,hi",
            "JavaScript:alert(1)",
        ] {
            assert!(
                matches!(canonicalize(href, &base()), Err(UrlError::InvalidScheme(_))),
                "{} should be rejected",
                href
            );
        }
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(canonicalize("ftp://example.com/file", &base()).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(canonicalize("   ", &base()).is_err());
    }

    #[test]
    fn test_parse_absolute() {
        let url = parse_absolute("  https://docs.example.com/guide/#top ").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/guide/");
    }

    #[test]
    fn test_parse_absolute_rejects_relative() {
        assert!(parse_absolute("guide/intro").is_err());
    }
}
