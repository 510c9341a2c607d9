//! Sumi-Scribe: a polite documentation scribe
//!
//! This crate implements a resumable web crawler that turns documentation sites
//! into cleaned, front-matter-annotated Markdown files, respecting a bounded
//! concurrency level and a per-request politeness delay.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod markdown;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] markdown::ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl cancelled by user")]
    Cancelled,
}

/// Configuration-specific errors
///
/// Any of these stops the process before crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{name}': {message}")]
    InvalidSelector { name: String, message: String },

    #[error("Rendered fetch engine unavailable: {0}")]
    RenderedUnavailable(String),

    #[error("Interactive prompt failed: {0}")]
    Prompt(String),
}

/// URL-specific errors
///
/// Links rejected here never reach the frontier; callers drop them silently.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("URL filtered out: {0}")]
    Filtered(String),
}

/// Errors raised while retrieving a single page
///
/// These are recorded against the URL in the frontier and never abort a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Failed to decode body of {url}: {message}")]
    Decode { url: String, message: String },
}

/// Result type alias for Sumi-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use frontier::{Frontier, FrontierStats};
pub use state::{UrlRecord, UrlState};
pub use crate::url::{calculate_depth, canonicalize, UrlFilter};
