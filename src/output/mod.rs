//! Output module: page artifacts, reports and post-crawl utilities
//!
//! This module handles:
//! - Mapping URLs to artifact paths
//! - Writing artifacts atomically
//! - The end-of-crawl report
//! - The analyze / fix-format / convert-mdx directory utilities

mod paths;
mod report;
mod traits;
mod utilities;
mod writer;

pub use paths::artifact_path;
pub use report::{print_final_report, CrawlReport};
pub use traits::{OutputError, OutputFormat, OutputResult};
pub use utilities::{
    analyze_directory, convert_to_mdx, fix_formatting, print_analysis, AnalysisReport,
    FileAnalysis,
};
pub use writer::{write_artifact, write_artifact_blocking};
