//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the batch loop that coordinates the crawl:
//! - Opening the resumable frontier for the configured site
//! - Skipping pages whose artifact already exists
//! - Fetching, converting and writing pages concurrently
//! - Applying page outcomes to the frontier from a single task
//! - Handling interrupts and producing the final report

use crate::config::{Config, NamedSelector};
use crate::crawler::fetcher::{build_fetcher, fetch_page, FetchedPage, PageFetcher};
use crate::crawler::scheduler::Scheduler;
use crate::frontier::Frontier;
use crate::markdown::{
    add_front_matter, clean_markdown, html_to_markdown, select_main_content, ExtractError,
};
use crate::output::{artifact_path, write_artifact, CrawlReport};
use crate::storage::{cache_path_for, FrontierStore, SqliteStorage};
use crate::url::{extract_domain, UrlFilter};
use crate::{Result, ScribeError};
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use url::Url;

/// Skip reason recorded when a page's artifact is already on disk
pub const SKIP_EXISTING: &str = "artifact already exists";

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Frontier opened, nothing dispatched yet
    Init,
    /// Batches are being dispatched
    Crawling,
    /// The crawl stopped; the frontier has been persisted
    Done,
}

/// What happened to one dispatched page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The artifact was written
    Saved {
        url: String,
        path: PathBuf,
        /// Links found on the page
        links: Vec<String>,
    },
    /// Fetching, converting or writing failed
    Failed { url: String, error: String },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Saved { url, .. } | Self::Failed { url, .. } => url,
        }
    }
}

/// Shared, read-only view handed to every unit of a batch
struct UnitContext<'a> {
    fetcher: &'a dyn PageFetcher,
    filter: &'a UrlFilter,
    scheduler: &'a Scheduler,
    selectors: &'a [NamedSelector],
    min_nav_links: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    frontier: Frontier,
    fetcher: Arc<dyn PageFetcher>,
    scheduler: Scheduler,
    domain: String,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScribeError)` - The fetcher, frontier or output directory could
    ///   not be set up
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = build_fetcher(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator that retrieves pages through `fetcher`
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let base_url = config.base_url()?;
        let domain = extract_domain(&base_url).unwrap_or_default();

        std::fs::create_dir_all(&config.output.directory)?;

        let store = open_store(&config, &base_url)?;
        let frontier = match Frontier::open(base_url.clone(), store) {
            Ok(frontier) => frontier,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Crawl cache is unreadable; starting fresh in memory"
                );
                Frontier::open(base_url, Box::new(SqliteStorage::new_in_memory()?))?
            }
        };

        let scheduler = Scheduler::new(config.crawl.concurrency, config.crawl.delay_duration());

        Ok(Self {
            config,
            frontier,
            fetcher,
            scheduler,
            domain,
            phase: CrawlPhase::Init,
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the crawl until the frontier is exhausted, the page ceiling is
    /// reached or `shutdown` turns true
    ///
    /// # Batch Loop
    ///
    /// 1. Stop on ceiling or shutdown request
    /// 2. Take the next batch, shallowest URLs first
    /// 3. Skip URLs whose artifact already exists, without fetching them
    /// 4. Process the rest concurrently, bounded by the scheduler
    /// 5. Apply outcomes to the frontier in batch order
    /// 6. Persist the frontier and log progress
    ///
    /// Per-page failures are recorded in the frontier and never end the crawl.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished or hit its ceiling
    /// * `Err(ScribeError::Cancelled)` - Shutdown was requested; progress was saved
    /// * `Err(ScribeError)` - The frontier could not be persisted
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<CrawlReport> {
        let span = tracing::info_span!("crawl", domain = %self.domain);
        self.run_batches(shutdown).instrument(span).await
    }

    async fn run_batches(&mut self, shutdown: watch::Receiver<bool>) -> Result<CrawlReport> {
        let start_time = Instant::now();
        let base_url = self.frontier.base_url().clone();

        if !self.frontier.is_empty() {
            let stats = self.frontier.stats();
            tracing::info!(
                known = stats.discovered,
                pending = stats.pending,
                last_update = ?self.frontier.last_update(),
                "Resuming crawl"
            );
        }

        self.frontier.add_discovered([base_url.as_str()], None);
        self.phase = CrawlPhase::Crawling;

        tracing::info!(
            base_url = %base_url,
            engine = %self.fetcher.engine(),
            concurrency = self.scheduler.concurrency(),
            delay = ?self.scheduler.delay(),
            "Starting crawl"
        );

        let ceiling = self.config.crawl.max_pages;
        let mut counted = 0usize;
        let mut saved = 0usize;
        let mut cancelled = false;

        loop {
            if *shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping crawl");
                cancelled = true;
                break;
            }

            let remaining = ceiling.map(|max| max.saturating_sub(counted));
            if remaining == Some(0) {
                tracing::info!(max_pages = ?ceiling, "Page ceiling reached");
                break;
            }

            let batch = self
                .frontier
                .next_batch(self.scheduler.batch_size(remaining));
            if batch.is_empty() {
                tracing::info!("Frontier exhausted, crawl complete");
                break;
            }

            let (dispatch, skipped) = self.partition_batch(batch);
            counted += skipped + dispatch.len();

            let outcomes = self.dispatch(dispatch).await;
            saved += self.apply_outcomes(outcomes);

            if let Err(e) = self.frontier.save() {
                tracing::warn!(error = %e, "Failed to persist frontier; will retry after the next batch");
            }

            let stats = self.frontier.stats();
            tracing::info!(
                visited = stats.visited,
                failed = stats.failed,
                skipped = stats.skipped,
                pending = stats.pending,
                "Batch complete"
            );
        }

        self.phase = CrawlPhase::Done;
        let persisted = self.frontier.save();
        self.fetcher.shutdown().await;
        persisted?;

        if cancelled {
            return Err(ScribeError::Cancelled);
        }

        let report = CrawlReport {
            domain: self.domain.clone(),
            output_dir: self.config.output.directory.clone(),
            engine: self.fetcher.engine(),
            format: self.config.output.format,
            stats: self.frontier.stats(),
            saved_this_run: saved,
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            saved,
            elapsed = ?report.elapsed,
            "Crawl finished"
        );

        Ok(report)
    }

    /// Splits a batch into URLs to fetch and URLs skipped on the spot
    ///
    /// Returns the URLs to dispatch with their artifact paths, and the number
    /// of URLs marked skipped or failed without a fetch.
    fn partition_batch(&mut self, batch: Vec<String>) -> (Vec<(Url, PathBuf)>, usize) {
        let mut dispatch = Vec::with_capacity(batch.len());
        let mut claimed = HashSet::new();
        let mut settled = 0;

        for url in batch {
            let parsed = match Url::parse(&url) {
                Ok(parsed) => parsed,
                Err(e) => {
                    self.frontier.mark_failed(&url, &format!("invalid URL: {}", e));
                    settled += 1;
                    continue;
                }
            };

            let path = artifact_path(
                &self.config.output.directory,
                &parsed,
                self.config.output.format,
            );

            if path.exists() {
                tracing::debug!(url = %url, path = %path.display(), "Artifact exists, skipping");
                self.frontier.mark_skipped(&url, SKIP_EXISTING);
                settled += 1;
                continue;
            }

            // Two URLs of one batch can map to the same file (`/a` and `/a/`)
            if !claimed.insert(path.clone()) {
                tracing::debug!(url = %url, path = %path.display(), "Artifact claimed in this batch, skipping");
                self.frontier.mark_skipped(&url, SKIP_EXISTING);
                settled += 1;
                continue;
            }

            dispatch.push((parsed, path));
        }

        (dispatch, settled)
    }

    /// Processes the dispatched URLs concurrently
    ///
    /// Outcomes are returned in dispatch order.
    async fn dispatch(&self, dispatch: Vec<(Url, PathBuf)>) -> Vec<PageOutcome> {
        let context = UnitContext {
            fetcher: self.fetcher.as_ref(),
            filter: self.frontier.filter(),
            scheduler: &self.scheduler,
            selectors: &self.config.selectors,
            min_nav_links: self.config.fetch.min_nav_links,
        };

        let units = dispatch.into_iter().map(|(url, path)| {
            let span = tracing::info_span!("unit", url = %url);
            process_unit(&context, url, path).instrument(span)
        });

        join_all(units).await
    }

    /// Applies outcomes to the frontier in order; returns the pages saved
    fn apply_outcomes(&mut self, outcomes: Vec<PageOutcome>) -> usize {
        let mut saved = 0;

        for outcome in outcomes {
            match outcome {
                PageOutcome::Saved { url, path, links } => {
                    self.frontier.mark_visited(&url);
                    let added = self.frontier.add_discovered(&links, Some(url.as_str()));
                    tracing::debug!(
                        url = %url,
                        path = %path.display(),
                        links = links.len(),
                        new = added.len(),
                        "Page saved"
                    );
                    saved += 1;
                }
                PageOutcome::Failed { url, error } => {
                    tracing::warn!(url = %url, error = %error, "Page failed");
                    self.frontier.mark_failed(&url, &error);
                }
            }
        }

        saved
    }
}

/// Opens the crawl's cache, falling back to memory when the file is unusable
fn open_store(config: &Config, base_url: &Url) -> Result<Box<dyn FrontierStore>> {
    let path = cache_path_for(&config.output.cache_dir, base_url, &config.output.directory);

    match SqliteStorage::new(&path) {
        Ok(storage) => {
            tracing::debug!(path = %path.display(), "Opened crawl cache");
            Ok(Box::new(storage))
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Cannot open crawl cache; progress will not survive this run"
            );
            Ok(Box::new(SqliteStorage::new_in_memory()?))
        }
    }
}

/// Fetches, converts and writes one page
///
/// Holds a scheduler permit for the whole unit, including the politeness
/// delay that follows a successful fetch.
async fn process_unit(context: &UnitContext<'_>, url: Url, path: PathBuf) -> PageOutcome {
    let Some(_permit) = context.scheduler.acquire().await else {
        return PageOutcome::Failed {
            url: url.to_string(),
            error: "scheduler closed".to_string(),
        };
    };

    tracing::debug!("Fetching");

    let page = match fetch_page(context.fetcher, &url, context.filter, context.min_nav_links).await
    {
        Ok(page) => page,
        Err(e) => {
            return PageOutcome::Failed {
                url: url.to_string(),
                error: e.to_string(),
            }
        }
    };

    let written = save_page(&page, &path, context.selectors).await;
    context.scheduler.politeness_delay().await;

    match written {
        Ok(()) => PageOutcome::Saved {
            url: url.to_string(),
            path,
            links: page.links,
        },
        Err(e) => PageOutcome::Failed {
            url: url.to_string(),
            error: e.to_string(),
        },
    }
}

async fn save_page(page: &FetchedPage, path: &Path, selectors: &[NamedSelector]) -> Result<()> {
    let document = build_document(page, selectors)?;
    write_artifact(path, &document).await?;
    Ok(())
}

/// Turns a fetched page into artifact content
///
/// Selects the main content, converts it to Markdown, cleans it and prepends
/// the page's front matter. A page whose cleaned body is empty is an error.
pub fn build_document(
    page: &FetchedPage,
    selectors: &[NamedSelector],
) -> std::result::Result<String, ExtractError> {
    let main = select_main_content(&page.html, selectors);
    tracing::debug!(source = %main.source, "Main content selected");

    let markdown = clean_markdown(&html_to_markdown(&main.html)?);
    if markdown.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok(add_front_matter(&markdown, &page.metadata))
}

/// Runs a complete crawl with the given configuration
///
/// # Arguments
///
/// * `config` - The validated crawl configuration
/// * `shutdown` - Turns true when the crawl should stop
pub async fn run_crawl(config: Config, shutdown: watch::Receiver<bool>) -> Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run(shutdown).await
}
