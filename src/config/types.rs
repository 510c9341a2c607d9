use crate::crawler::FetchEngine;
use crate::output::OutputFormat;
use crate::url::parse_absolute;
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default user agent: a current desktop Chrome string
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Sumi-Scribe
///
/// Every key is optional in the TOML file; CLI flags are applied on top of
/// the file values before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub crawl: CrawlConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    /// Named CSS selectors tried first when locating a page's main content
    pub selectors: Vec<NamedSelector>,
}

impl Config {
    /// Returns the canonical base URL of the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The parsed base URL
    /// * `Err(ConfigError)` - The base URL is missing or not absolute http(s)
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .crawl
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("a base URL is required".to_string()))?;

        parse_absolute(raw).map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))
    }
}

/// Crawl scope and pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Starting point of the crawl; also fixes the site that may be crawled
    pub base_url: Option<String>,

    /// Upper bound on pages dispatched or skipped in this run
    pub max_pages: Option<usize>,

    /// Politeness delay after each fetch, in seconds
    pub delay: f64,

    /// Maximum number of pages in flight
    pub concurrency: usize,
}

impl CrawlConfig {
    /// The politeness delay as a `Duration`
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_pages: None,
            delay: 1.0,
            concurrency: 5,
        }
    }
}

/// Page retrieval settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Fetch strategy used for every page of the crawl
    pub engine: FetchEngine,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request and navigation timeout in seconds
    pub timeout_secs: u64,

    /// Rendered engine: wait after navigation before capturing, in milliseconds
    pub settle_ms: u64,

    /// Rendered engine: viewport scrolls used to trigger lazy content
    pub scroll_steps: u32,

    /// Navigation links below which every anchor on a page is scanned
    pub min_nav_links: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            engine: FetchEngine::Static,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            settle_ms: 2000,
            scroll_steps: 3,
            min_nav_links: 5,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving one artifact per crawled page
    pub directory: PathBuf,

    /// Artifact file format
    pub format: OutputFormat,

    /// Directory holding the resumable crawl caches
    pub cache_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./docs_output"),
            format: OutputFormat::Markdown,
            cache_dir: PathBuf::from(".sumi-scribe"),
        }
    }
}

/// A user-supplied content selector
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedSelector {
    /// Label used in logs
    pub name: String,
    /// CSS selector
    pub css: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.crawl.base_url.is_none());
        assert!(config.crawl.max_pages.is_none());
        assert_eq!(config.crawl.delay, 1.0);
        assert_eq!(config.crawl.concurrency, 5);
        assert_eq!(config.fetch.engine, FetchEngine::Static);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.settle_ms, 2000);
        assert_eq!(config.fetch.scroll_steps, 3);
        assert_eq!(config.fetch.min_nav_links, 5);
        assert_eq!(config.output.directory, PathBuf::from("./docs_output"));
        assert_eq!(config.output.format, OutputFormat::Markdown);
        assert!(config.selectors.is_empty());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.crawl.concurrency, 5);
        assert_eq!(config.output.cache_dir, PathBuf::from(".sumi-scribe"));
    }

    #[test]
    fn test_delay_duration() {
        let mut crawl = CrawlConfig::default();
        crawl.delay = 0.25;
        assert_eq!(crawl.delay_duration(), Duration::from_millis(250));
        crawl.delay = -1.0;
        assert_eq!(crawl.delay_duration(), Duration::ZERO);
    }

    #[test]
    fn test_base_url_required() {
        let config = Config::default();
        assert!(matches!(config.base_url(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_base_url_canonicalized() {
        let mut config = Config::default();
        config.crawl.base_url = Some("https://Docs.Example.com/guide/#top".to_string());
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://docs.example.com/guide/"
        );
    }

    #[test]
    fn test_base_url_invalid() {
        let mut config = Config::default();
        config.crawl.base_url = Some("ftp://example.com/".to_string());
        assert!(matches!(config.base_url(), Err(ConfigError::InvalidUrl(_))));
    }
}
