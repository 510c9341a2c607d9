use crate::output::OutputFormat;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

/// Longest file stem kept before truncating and hashing
const MAX_STEM_BYTES: usize = 180;

/// Characters replaced by `_` in file names
const RESERVED: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*'];

/// Returns where the artifact for `url` is written
///
/// The URL path, stripped of surrounding slashes, becomes a flat file name with
/// `/` and reserved characters replaced by `_`; the site root becomes `index`.
/// Paths that already contained `_` or another replaced character, paths with a
/// query string, and overly long paths get a short hash suffix so that two
/// distinct URLs never share a file.
///
/// # Examples
///
/// ```
/// use sumi_scribe::output::{artifact_path, OutputFormat};
/// use std::path::Path;
/// use url::Url;
///
/// let url = Url::parse("https://docs.example.com/guide/intro").unwrap();
/// let path = artifact_path(Path::new("out"), &url, OutputFormat::Markdown);
/// assert_eq!(path, Path::new("out/guide_intro.md"));
/// ```
pub fn artifact_path(output_dir: &Path, url: &Url, format: OutputFormat) -> PathBuf {
    let raw = url.path().trim_matches('/');

    let mut needs_hash = url.query().is_some();
    let mut stem = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '_' || RESERVED.contains(&c) || c.is_whitespace() {
            needs_hash = true;
        }
        if c == '/' || RESERVED.contains(&c) || c.is_whitespace() {
            stem.push('_');
        } else {
            stem.push(c);
        }
    }

    if stem.is_empty() {
        stem.push_str("index");
    }

    if stem.len() > MAX_STEM_BYTES {
        let mut cut = MAX_STEM_BYTES;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        stem.truncate(cut);
        needs_hash = true;
    }

    if needs_hash {
        stem.push('-');
        stem.push_str(&short_hash(url));
    }

    output_dir.join(format!("{}.{}", stem, format.extension()))
}

/// First 8 hex digits of the SHA-256 of the URL's path and query
fn short_hash(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.path().as_bytes());
    if let Some(query) = url.query() {
        hasher.update(b"?");
        hasher.update(query.as_bytes());
    }
    hex::encode(hasher.finalize())[..8].to_string()
}
