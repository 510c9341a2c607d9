//! Page fetching strategies
//!
//! This module handles retrieving page HTML for the crawler, including:
//! - Building the shared HTTP client with the configured user agent
//! - Classifying HTTP and network failures
//! - Decoding response bodies with the declared or sniffed character set
//! - Selecting the static or rendered strategy once per crawl

use crate::config::{Config, FetchConfig};
use crate::crawler::parser::{extract_links, extract_metadata};
use crate::markdown::PageMetadata;
use crate::url::UrlFilter;
use crate::{ConfigError, FetchError};
use async_trait::async_trait;
use encoding_rs::{Encoding, WINDOWS_1252};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Bytes inspected for a `<meta charset>` declaration
const CHARSET_SNIFF_BYTES: usize = 1024;

/// How pages are retrieved, chosen once per crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchEngine {
    /// Plain HTTP GET
    #[default]
    Static,
    /// Headless browser that executes scripts before capture
    Rendered,
}

impl fmt::Display for FetchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// HTML as delivered by a fetch strategy
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL after redirects
    pub final_url: Url,
    /// Decoded document
    pub html: String,
}

/// A fetched page with its links and metadata extracted
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,
    /// URL after redirects
    pub final_url: Url,
    pub html: String,
    /// Canonical, filtered links in document order
    pub links: Vec<String>,
    pub metadata: PageMetadata,
}

/// A strategy for retrieving the HTML of one page
///
/// Implementations are shared by every unit of a crawl and must tolerate
/// concurrent calls.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// The engine this strategy implements
    fn engine(&self) -> FetchEngine;

    /// Retrieves the HTML of `url`
    async fn fetch_html(&self, url: &Url) -> Result<RawPage, FetchError>;

    /// Releases resources at the end of a crawl
    async fn shutdown(&self) {}
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_scribe::config::FetchConfig;
/// use sumi_scribe::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP strategy backed by one shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let client = build_http_client(config)
            .map_err(|e| ConfigError::Validation(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn engine(&self) -> FetchEngine {
        FetchEngine::Static
    }

    /// Fetches a page with a single GET request
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with an HTML, XML or text body | `RawPage` |
    /// | Any other status | `FetchError::Http` |
    /// | Request or body timeout | `FetchError::Timeout` |
    /// | Connection, TLS or redirect failure | `FetchError::Network` |
    /// | Binary content type | `FetchError::Decode` |
    async fn fetch_html(&self, url: &Url) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        if let Some(content_type) = &content_type {
            if !is_textual(content_type) {
                return Err(FetchError::Decode {
                    url: url.to_string(),
                    message: format!("unsupported content type {}", content_type),
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(RawPage {
            final_url,
            html: decode_body(&body, content_type.as_deref()),
        })
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Returns true for content types that can carry a document
fn is_textual(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

/// Decodes a response body
///
/// # Decoding Order
///
/// 1. `charset` parameter of the `Content-Type` header
/// 2. `<meta charset>` or `http-equiv` declaration in the first 1024 bytes
/// 3. Byte order mark
/// 4. UTF-8 if the bytes are valid UTF-8
/// 5. windows-1252
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes));

    if let Some(encoding) = declared {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Looks for a charset declaration in the first meta tags of a document
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(pos) = rest.find("<meta") {
        rest = &rest[pos + "<meta".len()..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];

        if let Some(encoding) = charset_param(tag).and_then(|l| Encoding::for_label(l.as_bytes())) {
            return Some(encoding);
        }
    }

    None
}

/// Extracts the value following `charset=`, without quotes
fn charset_param(text: &str) -> Option<&str> {
    let start = text.find("charset=")? + "charset=".len();
    let value = text[start..].trim_start_matches(['"', '\'', ' ']);
    let end = value
        .find(|c: char| matches!(c, '"' | '\'' | ';' | '>' | '/') || c.is_whitespace())
        .unwrap_or(value.len());

    let label = &value[..end];
    (!label.is_empty()).then_some(label)
}

/// Fetches a page and extracts its links and metadata
///
/// # Arguments
///
/// * `fetcher` - The crawl's fetch strategy
/// * `url` - The URL to fetch
/// * `filter` - Link filter applied to discovered links
/// * `min_nav_links` - Threshold for scanning every anchor
///
/// # Returns
///
/// * `Ok(FetchedPage)` - The page with its links and metadata
/// * `Err(FetchError)` - The page could not be retrieved
pub async fn fetch_page(
    fetcher: &dyn PageFetcher,
    url: &Url,
    filter: &UrlFilter,
    min_nav_links: usize,
) -> Result<FetchedPage, FetchError> {
    let raw = fetcher.fetch_html(url).await?;

    let (links, metadata) = {
        let document = Html::parse_document(&raw.html);
        (
            extract_links(&document, &raw.final_url, filter, min_nav_links),
            extract_metadata(&document, url),
        )
    };

    Ok(FetchedPage {
        url: url.clone(),
        final_url: raw.final_url,
        html: raw.html,
        links,
        metadata,
    })
}

/// Builds the fetch strategy selected by the configuration
///
/// The rendered engine is probed here so that a missing browser is reported
/// before any crawling starts.
pub fn build_fetcher(config: &Config) -> Result<Arc<dyn PageFetcher>, ConfigError> {
    match config.fetch.engine {
        FetchEngine::Static => Ok(Arc::new(StaticFetcher::new(&config.fetch)?)),
        #[cfg(feature = "rendered")]
        FetchEngine::Rendered => Ok(Arc::new(
            crate::crawler::rendered::RenderedFetcher::probe(&config.fetch)?,
        )),
        #[cfg(not(feature = "rendered"))]
        FetchEngine::Rendered => Err(ConfigError::RenderedUnavailable(
            "this build does not include the rendered engine".to_string(),
        )),
    }
}
