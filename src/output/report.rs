use crate::crawler::FetchEngine;
use crate::frontier::FrontierStats;
use crate::output::OutputFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Host of the base URL
    pub domain: String,
    pub output_dir: PathBuf,
    pub engine: FetchEngine,
    pub format: OutputFormat,
    /// Frontier counts at the end of the run (including earlier runs)
    pub stats: FrontierStats,
    /// Pages written during this run
    pub saved_this_run: usize,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Average wall time per page written during this run
    pub fn average_per_page(&self) -> Option<Duration> {
        if self.saved_this_run == 0 {
            return None;
        }
        Some(self.elapsed / self.saved_this_run as u32)
    }
}

/// Prints the end-of-crawl summary to stdout
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_final_report(report: &CrawlReport) {
    let stats = &report.stats;

    println!();
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Domain: {}", report.domain);
    println!("  Output directory: {}", report.output_dir.display());
    println!("  Engine: {}", report.engine);
    println!("  Format: {}", report.format);
    println!();

    println!("URLs by State:");
    println!("  Discovered: {}", stats.discovered);
    println!("  Visited: {}", stats.visited);
    println!("  Failed: {}", stats.failed);
    println!("  Skipped: {}", stats.skipped);
    println!("  Pending: {}", stats.pending);
    println!();

    println!("Timing:");
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!("  Pages written this run: {}", report.saved_this_run);
    if let Some(average) = report.average_per_page() {
        println!("  Average per page: {:.2}s", average.as_secs_f64());
    }

    if stats.failed > 0 {
        println!();
        println!(
            "{} URL(s) failed; run with -v or --log-file for the individual errors.",
            stats.failed
        );
    }

    if stats.pending > 0 {
        println!();
        println!(
            "{} URL(s) still pending; run the same command again to resume.",
            stats.pending
        );
    }
}
