use crate::config::types::{Config, CrawlConfig, FetchConfig, NamedSelector};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
///
/// Runs once at startup, after file values and command-line overrides have
/// been merged. Any failure stops the process before crawling starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.base_url()?;
    if base_url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' has no host",
            base_url
        )));
    }

    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates crawl pacing and limits
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every custom selector is named and parses
fn validate_selectors(selectors: &[NamedSelector]) -> Result<(), ConfigError> {
    for selector in selectors {
        if selector.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' needs a name",
                selector.css
            )));
        }

        Selector::parse(&selector.css).map_err(|e| ConfigError::InvalidSelector {
            name: selector.name.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}
