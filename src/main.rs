//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe documentation crawler.

use clap::{ArgGroup, Parser};
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use sumi_scribe::config::{load_config, parse_selectors, prompt_config, validate, Config};
use sumi_scribe::crawler::{run_crawl, FetchEngine};
use sumi_scribe::output::{
    analyze_directory, convert_to_mdx, fix_formatting, print_analysis, print_final_report,
    OutputFormat,
};
use sumi_scribe::{ConfigError, ScribeError};
use tokio::sync::watch;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Sumi-Scribe: A polite documentation scribe
///
/// Sumi-Scribe crawls a documentation site with bounded concurrency and a
/// politeness delay, and writes every page as a cleaned Markdown file with
/// front matter. Interrupted crawls resume where they stopped.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version = "1.0.0")]
#[command(about = "A polite documentation scribe", long_about = None)]
#[command(group(
    ArgGroup::new("utility")
        .args(["analyze", "fix_format", "convert_mdx"])
        .multiple(false)
        .conflicts_with_all([
            "url", "output", "max_pages", "delay", "concurrency", "rendered",
            "mdx", "selectors", "interactive", "config", "cache_dir",
        ])
))]
struct Cli {
    /// Documentation URL to crawl (prompts interactively when omitted)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output directory [default: ./docs_output]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of pages to process in this run
    #[arg(short, long, value_name = "N")]
    max_pages: Option<usize>,

    /// Delay after each request in seconds [default: 1.0]
    #[arg(short, long, value_name = "SECS")]
    delay: Option<f64>,

    /// Number of pages fetched concurrently [default: 5]
    #[arg(short, long, value_name = "N")]
    concurrency: Option<usize>,

    /// Render pages in a headless browser before extracting them
    #[arg(short = 'p', long = "playwright", visible_alias = "rendered")]
    rendered: bool,

    /// Write .mdx files instead of .md
    #[arg(long)]
    mdx: bool,

    /// Content selectors as name=css pairs, tried in order
    #[arg(short, long, value_name = "NAME=CSS,...")]
    selectors: Option<String>,

    /// Confirm every setting interactively before crawling
    #[arg(short, long)]
    interactive: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding resumable crawl state [default: .sumi-scribe]
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Also write a detailed log to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report file counts, sizes and formatting issues of an output directory
    #[arg(long, value_name = "DIR")]
    analyze: Option<PathBuf>,

    /// Re-clean the Markdown body of every file in an output directory
    #[arg(long, value_name = "DIR")]
    fix_format: Option<PathBuf>,

    /// Rename every .md file in an output directory to .mdx
    #[arg(long, value_name = "DIR")]
    convert_mdx: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    // Handle different modes
    let result = if let Some(dir) = &cli.analyze {
        handle_analyze(dir)
    } else if let Some(dir) = &cli.fix_format {
        handle_fix_format(dir)
    } else if let Some(dir) = &cli.convert_mdx {
        handle_convert_mdx(dir)
    } else {
        handle_crawl(&cli).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ScribeError::Cancelled) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// With a log file, a second plain-text layer records debug output there
/// regardless of the console verbosity.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(filter);

    let file = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(EnvFilter::new("sumi_scribe=debug,info")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    Ok(())
}

/// Merges the config file, command-line overrides and interactive answers
///
/// # Returns
///
/// * `Ok(Some(Config))` - Validated configuration
/// * `Ok(None)` - The user declined the interactive summary
/// * `Err(ConfigError)` - Invalid or unreadable configuration
fn build_config(cli: &Cli) -> Result<Option<Config>, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.crawl.base_url = Some(url.clone());
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = Some(max_pages);
    }
    if let Some(delay) = cli.delay {
        config.crawl.delay = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawl.concurrency = concurrency;
    }
    if cli.rendered {
        config.fetch.engine = FetchEngine::Rendered;
    }
    if cli.mdx {
        config.output.format = OutputFormat::Mdx;
    }
    if let Some(selectors) = &cli.selectors {
        config.selectors = parse_selectors(selectors)?;
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.output.cache_dir = cache_dir.clone();
    }

    if cli.interactive || config.crawl.base_url.is_none() {
        match prompt_config(config)? {
            Some(confirmed) => config = confirmed,
            None => return Ok(None),
        }
    }

    validate(&config)?;
    Ok(Some(config))
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli) -> Result<(), ScribeError> {
    let Some(config) = build_config(cli)? else {
        eprintln!("Cancelled.");
        return Err(ScribeError::Cancelled);
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let interrupts = Box::pin(futures::stream::unfold((), |()| async {
        tokio::signal::ctrl_c().await.ok().map(|_| ((), ()))
    }));
    tokio::spawn(async move {
        if forward_interrupts(interrupts, shutdown_tx).await {
            eprintln!("Second interrupt received; quitting without waiting for in-flight pages.");
            std::process::exit(130);
        }
    });

    match run_crawl(config, shutdown_rx).await {
        Ok(report) => {
            print_final_report(&report);
            Ok(())
        }
        Err(ScribeError::Cancelled) => {
            eprintln!("Crawl interrupted; progress saved. Run the same command again to resume.");
            Err(ScribeError::Cancelled)
        }
        Err(e) => Err(e),
    }
}

/// Turns the first interrupt into a shutdown request
///
/// Returns true when a second interrupt arrives, meaning the user wants out
/// without waiting for in-flight pages.
async fn forward_interrupts<S>(mut interrupts: S, shutdown_tx: watch::Sender<bool>) -> bool
where
    S: Stream<Item = ()> + Unpin,
{
    if interrupts.next().await.is_none() {
        return false;
    }
    tracing::warn!("Interrupt received, finishing in-flight pages (press Ctrl+C again to quit)");
    let _ = shutdown_tx.send(true);

    interrupts.next().await.is_some()
}

/// Handles the --analyze mode
fn handle_analyze(dir: &Path) -> Result<(), ScribeError> {
    let report = analyze_directory(dir)?;
    print_analysis(&report);
    Ok(())
}

/// Handles the --fix-format mode
fn handle_fix_format(dir: &Path) -> Result<(), ScribeError> {
    let fixed = fix_formatting(dir)?;
    println!("✓ Fixed formatting in {} file(s)", fixed);
    Ok(())
}

/// Handles the --convert-mdx mode
fn handle_convert_mdx(dir: &Path) -> Result<(), ScribeError> {
    let converted = convert_to_mdx(dir)?;
    println!("✓ Converted {} file(s) to MDX", converted);
    Ok(())
}
