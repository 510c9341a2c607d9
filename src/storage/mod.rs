//! Storage module for persisting crawl state
//!
//! Each crawl keeps its frontier in one SQLite file under the cache directory,
//! so an interrupted run can be resumed with the same arguments.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{FrontierStore, StorageError, StorageResult};

use crate::url::site_key;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

/// Returns the cache file used for a crawl of `base_url` into `output_dir`
///
/// The name combines the site with a short hash of the base URL and output
/// directory, so the same site crawled into two directories gets two caches.
///
/// # Arguments
///
/// * `cache_dir` - Directory holding all crawl caches
/// * `base_url` - The crawl's base URL
/// * `output_dir` - The crawl's output directory
///
/// # Examples
///
/// ```
/// use sumi_scribe::storage::cache_path_for;
/// use std::path::Path;
/// use url::Url;
///
/// let base = Url::parse("https://docs.example.com/guide/").unwrap();
/// let path = cache_path_for(Path::new(".sumi-scribe"), &base, Path::new("./out"));
/// let name = path.file_name().unwrap().to_str().unwrap();
/// assert!(name.starts_with("docs.example.com-"));
/// assert!(name.ends_with(".sqlite"));
/// ```
pub fn cache_path_for(cache_dir: &Path, base_url: &Url, output_dir: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(base_url.as_str().as_bytes());
    hasher.update(output_dir.to_string_lossy().as_bytes());
    let digest = hex::encode(hasher.finalize());

    let site = site_key(base_url)
        .unwrap_or_else(|| "site".to_string())
        .replace(':', "_");

    cache_dir.join(format!("{}-{}.sqlite", site, &digest[..12]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_path_is_deterministic() {
        let base = Url::parse("https://docs.example.com/guide/").unwrap();
        let a = cache_path_for(Path::new(".cache"), &base, Path::new("out"));
        let b = cache_path_for(Path::new(".cache"), &base, Path::new("out"));
        assert_eq!(a, b);
        assert!(a.starts_with(".cache"));
    }

    #[test]
    fn test_cache_path_depends_on_output_dir() {
        let base = Url::parse("https://docs.example.com/guide/").unwrap();
        let a = cache_path_for(Path::new(".cache"), &base, Path::new("out-a"));
        let b = cache_path_for(Path::new(".cache"), &base, Path::new("out-b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_path_port_is_filename_safe() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let path = cache_path_for(Path::new(".cache"), &base, Path::new("out"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("127.0.0.1_8080-"));
    }
}
