//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::{NewRecord, StoredRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// Records are created once and never updated or deleted. The profile link
/// is the only deduplication key.
pub trait RecordStore {
    /// Ensures the backing schema exists
    ///
    /// Idempotent; safe to call on every run.
    fn initialize(&mut self) -> StorageResult<()>;

    /// Persists a record unless one with the same profile link exists
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A new row was written
    /// * `Ok(false)` - The link was already stored; nothing changed
    fn insert_if_absent(&mut self, record: &NewRecord) -> StorageResult<bool>;

    /// Total number of stored records
    fn count_records(&self) -> StorageResult<u64>;

    /// Looks up a record by its profile link
    fn get_by_link(&self, profile_link: &str) -> StorageResult<Option<StoredRecord>>;

    /// Most recently stored records, newest first
    fn recent_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>>;
}
