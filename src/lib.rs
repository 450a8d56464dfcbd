//! Profile-Sweep: an exhaustive profile enumerator
//!
//! This crate enumerates every fixed-length identifier over an alphabet,
//! probes a profile URL for each one, parses the profile pages that exist,
//! and stores each discovered profile exactly once.

pub mod candidates;
pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Profile-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processing unit for {url} failed: {message}")]
    Unit { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid candidate configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for Profile-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use candidates::{generate, probe_url, space_size, Candidates};
pub use config::Config;
pub use crawler::{Coordinator, FetchOutcome, ParsedProfile, SweepSummary};
pub use storage::{RecordStore, SqliteStore, StoredRecord};
