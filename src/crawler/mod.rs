//! Crawler module for probing the candidate space
//!
//! This module contains the core sweep logic, including:
//! - HTTP fetching with timeout backoff
//! - Profile page parsing
//! - Batch scheduling with a run-wide admission gate
//! - Overall sweep coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_batches, run_sweep, Coordinator, Pipeline, SweepSummary, UnitOutcome};
pub use fetcher::{
    build_http_client, FetchGate, FetchOutcome, ReqwestTransport, Transport, TransportError,
    TransportResponse,
};
pub use parser::{HtmlDocument, MarkupQuery, ParsedProfile, ProfileParser, UNKNOWN};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete sweep operation
///
/// This is the main entry point for starting a sweep. It will:
/// 1. Open the record store and ensure its schema
/// 2. Build the HTTP client
/// 3. Enumerate the candidate space batch by batch
/// 4. Probe, parse and store each candidate
///
/// # Returns
///
/// * `Ok(SweepSummary)` - Every batch completed
/// * `Err(SweepError)` - Initialization or configuration failed
pub async fn sweep(config: Config) -> Result<SweepSummary, SweepError> {
    run_sweep(config).await
}
