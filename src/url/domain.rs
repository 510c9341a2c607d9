use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key used to decide whether two URLs belong to the same site
///
/// The key is the lowercase host without a leading `www.`, followed by the
/// explicit port when one is present. `https://www.example.com/` and
/// `https://example.com/docs` share a key; `https://blog.example.com/` does not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::site_key;
///
/// let a = Url::parse("https://www.example.com/").unwrap();
/// let b = Url::parse("https://example.com/docs").unwrap();
/// assert_eq!(site_key(&a), site_key(&b));
/// ```
pub fn site_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
