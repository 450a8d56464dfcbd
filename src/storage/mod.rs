//! Storage module for persisting discovered profiles
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Deduplicated, insert-only persistence keyed by profile link
//! - Read queries backing statistics output

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::crawler::ParsedProfile;
use crate::SweepError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Store handle shared by every processing unit of a run
pub type SharedStore = Arc<Mutex<dyn RecordStore + Send>>;

/// Initializes or opens a record store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(SweepError)` - Failed to open or initialize the database
pub fn open_store(path: &Path) -> Result<SqliteStore, SweepError> {
    SqliteStore::new(path)
}

/// Wraps a store for sharing across processing units
pub fn share<S: RecordStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// A profile about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub profile_link: String,
    pub display_name: String,
    pub level: String,
}

impl NewRecord {
    pub fn from_profile(profile_link: impl Into<String>, profile: ParsedProfile) -> Self {
        Self {
            profile_link: profile_link.into(),
            display_name: profile.display_name,
            level: profile.level,
        }
    }
}

/// A profile as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Surrogate key assigned by the store
    pub id: i64,
    pub profile_link: String,
    pub display_name: String,
    pub level: String,
    /// RFC 3339 timestamp of the first discovery
    pub discovered_at: String,
}
