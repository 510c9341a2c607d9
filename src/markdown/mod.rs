//! Content extraction and Markdown processing
//!
//! Turns a fetched HTML page into the body of a page artifact:
//!
//! 1. [`select_main_content`] picks the documentation part of the page
//! 2. [`html_to_markdown`] converts it
//! 3. [`clean_markdown`] fixes common conversion artifacts
//! 4. [`add_front_matter`] prepends the page metadata
//!
//! [`analyze_markdown`] reports the same artifacts on existing files.

mod analyze;
mod clean;
mod content;
mod convert;
mod front_matter;

pub use analyze::{analyze_markdown, IssueKind, MarkdownIssue};
pub use clean::clean_markdown;
pub use content::{select_main_content, ContentSource, MainContent};
pub use convert::{html_to_markdown, strip_html};
pub use front_matter::{add_front_matter, split_front_matter, PageMetadata};

use thiserror::Error;

/// Errors raised while turning a page into Markdown
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTML to Markdown conversion failed: {0}")]
    Conversion(String),

    #[error("Page has no extractable text")]
    Empty,
}
