use crate::config::types::{Config, NamedSelector};
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The result is not validated yet: command-line overrides are applied on
/// top of it first, then [`validate`](crate::config::validate) runs once.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_scribe::config::load_config;
///
/// let config = load_config(Path::new("scribe.toml")).unwrap();
/// println!("Concurrency: {}", config.crawl.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Parses a `name=css,name2=css2` selector list
///
/// Order is preserved. Whitespace around names and selectors is trimmed and
/// empty entries are ignored.
///
/// # Example
///
/// ```
/// use sumi_scribe::config::parse_selectors;
///
/// let selectors = parse_selectors("content=.doc-body, api=#api").unwrap();
/// assert_eq!(selectors[0].name, "content");
/// assert_eq!(selectors[1].css, "#api");
/// ```
pub fn parse_selectors(raw: &str) -> Result<Vec<NamedSelector>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, css) = pair.split_once('=').ok_or_else(|| {
                ConfigError::Validation(format!(
                    "selector '{}' must have the form name=css",
                    pair
                ))
            })?;

            Ok(NamedSelector {
                name: name.trim().to_string(),
                css: css.trim().to_string(),
            })
        })
        .collect()
}
