//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Static (HTTP) and rendered (headless browser) fetch strategies
//! - Link and metadata extraction
//! - Concurrency and politeness limits
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
#[cfg(feature = "rendered")]
mod rendered;
mod scheduler;

pub use coordinator::{
    build_document, run_crawl, CrawlPhase, Coordinator, PageOutcome, SKIP_EXISTING,
};
pub use fetcher::{
    build_fetcher, build_http_client, fetch_page, FetchEngine, FetchedPage, PageFetcher, RawPage,
    StaticFetcher,
};
pub use parser::{extract_links, extract_metadata};
#[cfg(feature = "rendered")]
pub use rendered::RenderedFetcher;
pub use scheduler::Scheduler;

/// Returns true if the rendered engine can run on this machine
///
/// Always false when the crate is built without the `rendered` feature.
pub fn rendered_available() -> bool {
    #[cfg(feature = "rendered")]
    {
        RenderedFetcher::probe(&crate::config::FetchConfig::default()).is_ok()
    }
    #[cfg(not(feature = "rendered"))]
    {
        false
    }
}
