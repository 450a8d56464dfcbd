//! Statistics generation from the profile database
//!
//! This module provides functionality for extracting and displaying
//! sweep statistics from the storage layer.

use crate::storage::{RecordStore, StoredRecord};
use crate::SweepError;

/// Number of records listed by default in the statistics view
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct SweepStatistics {
    /// Total number of stored profiles
    pub total_records: u64,

    /// Most recently stored profiles, newest first
    pub recent: Vec<StoredRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The record store to query
/// * `recent_limit` - How many of the newest records to include
pub fn load_statistics(
    store: &dyn RecordStore,
    recent_limit: usize,
) -> Result<SweepStatistics, SweepError> {
    let total_records = store.count_records()?;
    let recent = store.recent_records(recent_limit)?;

    Ok(SweepStatistics {
        total_records,
        recent,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SweepStatistics) {
    println!("=== Sweep Statistics ===\n");

    println!("Overview:");
    println!("  Stored profiles: {}", stats.total_records);
    println!();

    if stats.recent.is_empty() {
        println!("No profiles stored yet.");
        return;
    }

    println!("Most Recent ({}):", stats.recent.len());
    for record in &stats.recent {
        println!(
            "  [{}] {} - {} - level {} ({})",
            record.id, record.profile_link, record.display_name, record.level, record.discovered_at
        );
    }
}
