//! Configuration module for Sumi-Scribe
//!
//! This module handles loading TOML configuration files, parsing selector
//! lists, validating the merged settings and prompting for them interactively.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! validate(&config).unwrap();
//! println!("Crawling with {} workers", config.crawl.concurrency);
//! ```

mod interactive;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FetchConfig, NamedSelector, OutputConfig, DEFAULT_USER_AGENT,
};

// Re-export functions
pub use interactive::prompt_config;
pub use parser::{load_config, parse_selectors};
pub use validation::validate;
