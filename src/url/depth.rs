use url::Url;

/// Calculates the scheduling depth of `url` relative to the crawl's `base`
///
/// Depth only orders the frontier (shallower pages first); nothing depends on
/// it for correctness.
///
/// - At or directly under the base path: depth 0
///   (`/guide/` and `/guide/setup` for base `/guide/`)
/// - Further under the base path: one per extra segment (`/guide/a/b` is 1)
/// - Outside the base path: the page's own segment count plus one, which keeps
///   sibling sections behind the section being documented
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::calculate_depth;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/guide/").unwrap();
/// let page = Url::parse("https://docs.example.com/guide/setup").unwrap();
/// assert_eq!(calculate_depth(&base, &page), 0);
/// ```
pub fn calculate_depth(base: &Url, url: &Url) -> u32 {
    let base_segments = path_segments(base);
    let url_segments = path_segments(url);

    if url_segments.starts_with(&base_segments) {
        let extra = url_segments.len() - base_segments.len();
        return extra.saturating_sub(1) as u32;
    }

    url_segments.len() as u32 + 1
}

/// Non-empty path segments of a URL
fn path_segments(url: &Url) -> Vec<&str> {
    url.path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}
