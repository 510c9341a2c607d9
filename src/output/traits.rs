//! Output error and format types

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or post-processing artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// File format of page artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "md")]
    Markdown,
    #[serde(rename = "mdx")]
    Mdx,
}

impl OutputFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Mdx => "mdx",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "Markdown (.md)"),
            Self::Mdx => write!(f, "MDX (.mdx)"),
        }
    }
}
