//! Post-crawl utilities over an output directory
//!
//! These never touch the crawl cache; they only read and rewrite artifacts.

use crate::markdown::{analyze_markdown, clean_markdown, split_front_matter, MarkdownIssue};
use crate::output::writer::write_artifact_blocking;
use crate::output::{OutputError, OutputResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Analysis of one artifact
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub line_count: usize,
    pub issues: Vec<MarkdownIssue>,
}

/// Analysis of an output directory
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub markdown_files: usize,
    pub mdx_files: usize,
    pub total_bytes: u64,
    /// Sorted by path
    pub files: Vec<FileAnalysis>,
}

impl AnalysisReport {
    pub fn total_files(&self) -> usize {
        self.markdown_files + self.mdx_files
    }

    pub fn average_size(&self) -> u64 {
        match self.total_files() {
            0 => 0,
            n => self.total_bytes / n as u64,
        }
    }

    pub fn total_issues(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }

    /// The `n` largest files, biggest first
    pub fn largest(&self, n: usize) -> Vec<&FileAnalysis> {
        let mut files: Vec<&FileAnalysis> = self.files.iter().collect();
        files.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then(a.path.cmp(&b.path)));
        files.truncate(n);
        files
    }
}

/// Lists every `.md` and `.mdx` file under `dir`, sorted by path
fn markdown_files(dir: &Path) -> OutputResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(OutputError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && extension_of(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// `Some("md")` or `Some("mdx")` for artifact files
fn extension_of(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md") => Some("md"),
        Some("mdx") => Some("mdx"),
        _ => None,
    }
}

/// Collects size, line and formatting statistics for an output directory
///
/// # Arguments
///
/// * `dir` - Output directory of a previous crawl
///
/// # Returns
///
/// * `Ok(AnalysisReport)` - Statistics for every `.md`/`.mdx` file found
/// * `Err(OutputError::MissingDirectory)` - `dir` does not exist
pub fn analyze_directory(dir: &Path) -> OutputResult<AnalysisReport> {
    let mut report = AnalysisReport::default();

    for path in markdown_files(dir)? {
        let content = std::fs::read_to_string(&path)?;
        let size_bytes = content.len() as u64;

        match extension_of(&path) {
            Some("mdx") => report.mdx_files += 1,
            _ => report.markdown_files += 1,
        }
        report.total_bytes += size_bytes;

        report.files.push(FileAnalysis {
            issues: analyze_markdown(&content),
            line_count: content.lines().count(),
            size_bytes,
            path,
        });
    }

    tracing::debug!(files = report.total_files(), "Analyzed output directory");
    Ok(report)
}

/// Prints an [`AnalysisReport`] to stdout
pub fn print_analysis(report: &AnalysisReport) {
    println!("=== Output Analysis ===\n");

    println!("Files:");
    println!("  Markdown (.md): {}", report.markdown_files);
    println!("  MDX (.mdx): {}", report.mdx_files);
    println!("  Total size: {:.2} MB", report.total_bytes as f64 / (1024.0 * 1024.0));
    println!("  Average size: {:.2} KB", report.average_size() as f64 / 1024.0);
    println!();

    if report.total_files() == 0 {
        println!("No Markdown files found.");
        return;
    }

    println!("Largest files:");
    for file in report.largest(5) {
        println!("  {:>10} KB  {}", format!("{:.1}", file.size_bytes as f64 / 1024.0), file.path.display());
    }
    println!();

    let with_issues: Vec<&FileAnalysis> =
        report.files.iter().filter(|f| !f.issues.is_empty()).collect();

    if with_issues.is_empty() {
        println!("No formatting issues found.");
        return;
    }

    println!(
        "Formatting issues ({} in {} files):",
        report.total_issues(),
        with_issues.len()
    );
    for file in with_issues {
        println!("  {} ({} lines)", file.path.display(), file.line_count);
        for issue in &file.issues {
            println!("    - {}", issue);
        }
    }
    println!();
    println!("Run with --fix-format to repair most of these.");
}

/// Re-runs Markdown cleanup over every artifact in `dir`
///
/// Front matter is kept as is; only the body is cleaned. Files whose content
/// does not change are left untouched.
///
/// # Returns
///
/// * `Ok(usize)` - Number of files rewritten
/// * `Err(OutputError::MissingDirectory)` - `dir` does not exist
pub fn fix_formatting(dir: &Path) -> OutputResult<usize> {
    let mut fixed = 0;

    for path in markdown_files(dir)? {
        let content = std::fs::read_to_string(&path)?;
        let (front_matter, body) = split_front_matter(&content);

        let mut cleaned = String::with_capacity(content.len());
        cleaned.push_str(front_matter.unwrap_or(""));
        cleaned.push_str(&clean_markdown(body));

        if cleaned != content {
            write_artifact_blocking(&path, &cleaned)?;
            tracing::info!(path = %path.display(), "Fixed formatting");
            fixed += 1;
        }
    }

    Ok(fixed)
}

/// Renames every `.md` artifact in `dir` to `.mdx`
///
/// Content is not modified. A file whose `.mdx` counterpart already exists
/// is left alone.
///
/// # Returns
///
/// * `Ok(usize)` - Number of files renamed
/// * `Err(OutputError::MissingDirectory)` - `dir` does not exist
pub fn convert_to_mdx(dir: &Path) -> OutputResult<usize> {
    let mut converted = 0;

    for path in markdown_files(dir)? {
        if extension_of(&path) != Some("md") {
            continue;
        }

        let target = path.with_extension("mdx");
        if target.exists() {
            tracing::warn!(
                path = %path.display(),
                "Not converting: {} already exists",
                target.display()
            );
            continue;
        }

        std::fs::rename(&path, &target)?;
        tracing::debug!(from = %path.display(), to = %target.display(), "Converted to MDX");
        converted += 1;
    }

    Ok(converted)
}
