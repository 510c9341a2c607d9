//! Storage traits and error types
//!
//! This module defines the trait interface for frontier persistence backends
//! and associated error types.

use crate::state::UrlRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while persisting or restoring crawl state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence backend for the frontier
///
/// The frontier keeps every record in memory; a store only has to hand the
/// full set back on startup and accept batches of changed records.
pub trait FrontierStore: Send {
    /// Loads every persisted record
    fn load_records(&self) -> StorageResult<Vec<UrlRecord>>;

    /// Inserts or replaces the given records in a single transaction
    ///
    /// Also stamps the `last_update` metadata key.
    fn save_records(&mut self, records: &[UrlRecord]) -> StorageResult<()>;

    /// Time of the most recent successful `save_records`
    fn last_update(&self) -> StorageResult<Option<DateTime<Utc>>>;

    /// Stores a crawl-level metadata value
    fn set_meta(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Reads a crawl-level metadata value
    fn get_meta(&self, key: &str) -> StorageResult<Option<String>>;
}
