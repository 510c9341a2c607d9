//! Interactive configuration prompts
//!
//! Used when no URL is given on the command line, or with `--interactive`.

use crate::config::parser::parse_selectors;
use crate::config::types::Config;
use crate::crawler::{rendered_available, FetchEngine};
use crate::output::OutputFormat;
use crate::url::parse_absolute;
use crate::ConfigError;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

impl From<dialoguer::Error> for ConfigError {
    fn from(e: dialoguer::Error) -> Self {
        ConfigError::Prompt(e.to_string())
    }
}

/// Refuses a rendered engine request when no browser can be launched
fn check_engine(engine: FetchEngine, rendered_available: bool) -> Result<(), ConfigError> {
    if engine == FetchEngine::Rendered && !rendered_available {
        return Err(ConfigError::RenderedUnavailable(
            "no headless browser available; rerun without --playwright".to_string(),
        ));
    }
    Ok(())
}

/// Walks the user through every crawl setting
///
/// `defaults` pre-fills each prompt, so values from a config file or the
/// command line only need confirming.
///
/// # Returns
///
/// * `Ok(Some(Config))` - The user confirmed the summary
/// * `Ok(None)` - The user declined to start
/// * `Err(ConfigError)` - The terminal could not be prompted
pub fn prompt_config(defaults: Config) -> Result<Option<Config>, ConfigError> {
    let theme = ColorfulTheme::default();
    let mut config = defaults;
    let rendered = rendered_available();
    check_engine(config.fetch.engine, rendered)?;

    println!();
    println!("Sumi-Scribe interactive setup");
    println!("=============================");

    let mut url_prompt = Input::<String>::with_theme(&theme)
        .with_prompt("Documentation URL")
        .validate_with(|input: &String| -> Result<(), String> {
            let url = parse_absolute(input).map_err(|e| e.to_string())?;
            match url.scheme() {
                "http" | "https" => Ok(()),
                other => Err(format!("unsupported scheme '{}'", other)),
            }
        });
    if let Some(base_url) = &config.crawl.base_url {
        url_prompt = url_prompt.default(base_url.clone());
    }
    config.crawl.base_url = Some(url_prompt.interact_text()?.trim().to_string());

    let directory: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default(config.output.directory.display().to_string())
        .interact_text()?;
    config.output.directory = PathBuf::from(directory.trim());

    let max_pages: String = Input::with_theme(&theme)
        .with_prompt("Maximum pages (empty for no limit)")
        .default(
            config
                .crawl
                .max_pages
                .map(|n| n.to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            match input.trim() {
                "" => Ok(()),
                value => match value.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(()),
                    _ => Err("enter a whole number of at least 1".to_string()),
                },
            }
        })
        .interact_text()?;
    config.crawl.max_pages = max_pages.trim().parse().ok();

    config.crawl.delay = Input::with_theme(&theme)
        .with_prompt("Delay between requests (seconds)")
        .default(config.crawl.delay)
        .validate_with(|input: &f64| -> Result<(), &str> {
            if input.is_finite() && *input >= 0.0 {
                Ok(())
            } else {
                Err("delay must be zero or more")
            }
        })
        .interact_text()?;

    config.crawl.concurrency = Input::with_theme(&theme)
        .with_prompt("Concurrent pages")
        .default(config.crawl.concurrency)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("concurrency must be between 1 and 100")
            }
        })
        .interact_text()?;

    if rendered {
        let engines = [FetchEngine::Static, FetchEngine::Rendered];
        let current = engines
            .iter()
            .position(|engine| *engine == config.fetch.engine)
            .unwrap_or(0);
        let choice = Select::with_theme(&theme)
            .with_prompt("Fetch engine")
            .items(&["static (plain HTTP)", "rendered (headless browser)"])
            .default(current)
            .interact()?;
        config.fetch.engine = engines[choice];
    }

    let mdx = Confirm::with_theme(&theme)
        .with_prompt("Write MDX files instead of Markdown?")
        .default(config.output.format == OutputFormat::Mdx)
        .interact()?;
    config.output.format = if mdx {
        OutputFormat::Mdx
    } else {
        OutputFormat::Markdown
    };

    let selectors: String = Input::with_theme(&theme)
        .with_prompt("Content selectors (name=css,..., empty for automatic)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            parse_selectors(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    if !selectors.trim().is_empty() {
        config.selectors = parse_selectors(&selectors)?;
    }

    print_summary(&config);

    let start = Confirm::with_theme(&theme)
        .with_prompt("Start crawling?")
        .default(true)
        .interact()?;

    Ok(start.then_some(config))
}

/// Prints the settings the crawl is about to use
fn print_summary(config: &Config) {
    println!();
    println!("Crawl settings");
    println!("--------------");
    println!(
        "URL:          {}",
        config.crawl.base_url.as_deref().unwrap_or("")
    );
    println!("Output:       {}", config.output.directory.display());
    match config.crawl.max_pages {
        Some(n) => println!("Max pages:    {}", n),
        None => println!("Max pages:    unlimited"),
    }
    println!("Delay:        {:.2}s", config.crawl.delay);
    println!("Concurrency:  {}", config.crawl.concurrency);
    println!("Engine:       {}", config.fetch.engine);
    println!("Format:       {}", config.output.format);
    if !config.selectors.is_empty() {
        let names: Vec<&str> = config.selectors.iter().map(|s| s.name.as_str()).collect();
        println!("Selectors:    {}", names.join(", "));
    }
    println!();
}
