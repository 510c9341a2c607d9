//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.

use crate::state::{UrlRecord, UrlState};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Metadata key holding the time of the last successful save
const LAST_UPDATE_KEY: &str = "last_update";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the cache database at `path`
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    ///
    /// Used in tests and as the fallback when the cache file cannot be opened;
    /// nothing survives the process.
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl FrontierStore for SqliteStorage {
    fn load_records(&self) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, state, depth, source_url, discovered_at, processed_at,
                    failed_at, skipped_at, error, skip_reason
             FROM urls",
        )?;

        let rows = stmt.query_map([], RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }

        Ok(records)
    }

    fn save_records(&mut self, records: &[UrlRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO urls
                 (url, state, depth, source_url, discovered_at, processed_at,
                  failed_at, skipped_at, error, skip_reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.url,
                    record.state.to_db_string(),
                    record.depth,
                    record.source_url,
                    record.discovered_at.to_rfc3339(),
                    record.processed_at.map(|t| t.to_rfc3339()),
                    record.failed_at.map(|t| t.to_rfc3339()),
                    record.skipped_at.map(|t| t.to_rfc3339()),
                    record.error,
                    record.skip_reason,
                ])?;
            }

            tx.execute(
                "INSERT OR REPLACE INTO crawl_meta (key, value) VALUES (?1, ?2)",
                params![LAST_UPDATE_KEY, Utc::now().to_rfc3339()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn last_update(&self) -> StorageResult<Option<DateTime<Utc>>> {
        match self.get_meta(LAST_UPDATE_KEY)? {
            Some(value) => parse_timestamp(&value).map(Some),
            None => Ok(None),
        }
    }

    fn set_meta(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO crawl_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM crawl_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

/// Column values of one `urls` row before validation
struct RawRow {
    url: String,
    state: String,
    depth: u32,
    source_url: Option<String>,
    discovered_at: String,
    processed_at: Option<String>,
    failed_at: Option<String>,
    skipped_at: Option<String>,
    error: Option<String>,
    skip_reason: Option<String>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            state: row.get(1)?,
            depth: row.get(2)?,
            source_url: row.get(3)?,
            discovered_at: row.get(4)?,
            processed_at: row.get(5)?,
            failed_at: row.get(6)?,
            skipped_at: row.get(7)?,
            error: row.get(8)?,
            skip_reason: row.get(9)?,
        })
    }

    fn into_record(self) -> StorageResult<UrlRecord> {
        let state = UrlState::from_db_string(&self.state).ok_or_else(|| {
            StorageError::Corrupt(format!("unknown state '{}' for {}", self.state, self.url))
        })?;

        Ok(UrlRecord {
            state,
            depth: self.depth,
            source_url: self.source_url,
            discovered_at: parse_timestamp(&self.discovered_at)?,
            processed_at: self.processed_at.as_deref().map(parse_timestamp).transpose()?,
            failed_at: self.failed_at.as_deref().map(parse_timestamp).transpose()?,
            skipped_at: self.skipped_at.as_deref().map(parse_timestamp).transpose()?,
            error: self.error,
            skip_reason: self.skip_reason,
            url: self.url,
        })
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(url: &str, state: UrlState) -> UrlRecord {
        let mut record = UrlRecord::discovered(url, 1, Some("https://example.com/".into()));
        match state {
            UrlState::Discovered => {}
            UrlState::Failed => {
                record.transition(state, Some("HTTP 500".into()), Utc::now());
            }
            UrlState::Skipped => {
                record.transition(state, Some("artifact already exists".into()), Utc::now());
            }
            UrlState::Visited => {
                record.transition(state, None, Utc::now());
            }
        }
        record
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_save_and_load_records() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let records = vec![
            record("https://example.com/a", UrlState::Discovered),
            record("https://example.com/b", UrlState::Visited),
            record("https://example.com/c", UrlState::Failed),
            record("https://example.com/d", UrlState::Skipped),
        ];

        storage.save_records(&records).unwrap();

        let mut loaded = storage.load_records().unwrap();
        loaded.sort_by(|a, b| a.url.cmp(&b.url));
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded[2].state, UrlState::Failed);
        assert_eq!(loaded[2].error.as_deref(), Some("HTTP 500"));
        assert_eq!(loaded[3].skip_reason.as_deref(), Some("artifact already exists"));
        assert_eq!(loaded[1].source_url.as_deref(), Some("https://example.com/"));
        assert!(loaded[1].processed_at.is_some());
    }

    #[test]
    fn test_save_is_upsert() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut rec = record("https://example.com/a", UrlState::Discovered);
        storage.save_records(&[rec.clone()]).unwrap();

        rec.transition(UrlState::Visited, None, Utc::now());
        storage.save_records(&[rec]).unwrap();

        let loaded = storage.load_records().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].state, UrlState::Visited);
    }

    #[test]
    fn test_last_update_stamped_on_save() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.last_update().unwrap().is_none());

        storage.save_records(&[]).unwrap();
        assert!(storage.last_update().unwrap().is_some());
    }

    #[test]
    fn test_meta_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.set_meta("base_url", "https://example.com/").unwrap();
        assert_eq!(
            storage.get_meta("base_url").unwrap().as_deref(),
            Some("https://example.com/")
        );
        assert!(storage.get_meta("missing").unwrap().is_none());
    }

    #[test]
    fn test_unknown_state_is_corrupt() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO urls (url, state, depth, discovered_at) VALUES (?1, ?2, 0, ?3)",
                params!["https://example.com/", "processing", Utc::now().to_rfc3339()],
            )
            .unwrap();

        assert!(matches!(
            storage.load_records(),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_file_backed_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.sqlite");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            storage
                .save_records(&[record("https://example.com/a", UrlState::Visited)])
                .unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        let loaded = storage.load_records().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].state, UrlState::Visited);
    }
}
