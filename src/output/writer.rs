use crate::output::OutputResult;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// Distinguishes temporary files of concurrent writes within this process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes a page artifact so that readers never see a partial file
///
/// The content goes to a temporary sibling first, is flushed to disk, and is
/// then renamed over `path`. Missing parent directories are created.
///
/// # Arguments
///
/// * `path` - Final location of the artifact
/// * `content` - Complete file content (front matter and body)
pub async fn write_artifact(path: &Path, content: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp = temp_sibling(path);
    let result = write_then_rename(&temp, path, content).await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp).await;
    }

    Ok(result?)
}

async fn write_then_rename(temp: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp).await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp, path).await
}

/// Blocking variant of [`write_artifact`] for the utility modes
pub fn write_artifact_blocking(path: &Path, content: &str) -> OutputResult<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = temp_sibling(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&temp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp);
    }

    Ok(result?)
}

/// Hidden temporary file next to `path`, unique to this write
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        name,
        std::process::id(),
        sequence
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("page.md");

        write_artifact(&path, "---\n---\nbody").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "---\n---\nbody");
    }

    #[tokio::test]
    async fn test_write_replaces_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");

        write_artifact(&path, "first").await.unwrap();
        write_artifact(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_temp_names_are_unique_per_write() {
        let path = Path::new("/out/guide/page.md");
        assert_ne!(temp_sibling(path), temp_sibling(path));
        assert_eq!(temp_sibling(path).parent(), path.parent());
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_same_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");

        let (a, b) = tokio::join!(
            write_artifact(&path, "from a"),
            write_artifact(&path, "from b")
        );

        assert!(a.is_ok() && b.is_ok());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content == "from a" || content == "from b");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_blocking_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.mdx");

        write_artifact_blocking(&path, "content").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }
}
