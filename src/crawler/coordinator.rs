//! Sweep coordinator - batch orchestration logic
//!
//! This module drives the candidate space through the probe pipeline:
//! - Slicing the candidate sequence into fixed-size batches
//! - Running one processing unit per candidate (fetch, parse, store)
//! - Bounding in-flight fetches with a single run-wide admission gate
//! - Waiting for every unit of a batch before starting the next one
//! - Isolating per-unit failures and tallying a run summary

use crate::candidates::{generate, probe_url};
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchGate, FetchOutcome, ReqwestTransport, Transport};
use crate::crawler::parser::ProfileParser;
use crate::storage::{self, NewRecord, SharedStore, StorageError};
use crate::{ConfigError, SweepError};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// How a single candidate's processing unit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// A new record was written
    Stored,
    /// The profile link was already in the store
    AlreadyPresent,
    /// The page was served but reports no such profile
    NoProfile,
    /// The server answered 404
    NotFound,
    /// Every permitted attempt timed out
    TimedOut,
    /// Non-success status or transport error
    FetchFailed,
}

impl UnitOutcome {
    /// Outcome for a fetch that produced no parsable profile
    fn from_fetch(outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Content(_) => Self::NoProfile,
            FetchOutcome::NotFound => Self::NotFound,
            FetchOutcome::TransientFailure(_) => Self::TimedOut,
            FetchOutcome::PermanentFailure(_) => Self::FetchFailed,
        }
    }
}

/// Totals for one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub candidates: u64,
    pub batches: u64,
    pub stored: u64,
    pub already_present: u64,
    pub no_profile: u64,
    pub not_found: u64,
    pub timed_out: u64,
    pub fetch_failed: u64,
    /// Units that ended in a storage error or did not run to completion
    pub unit_failures: u64,
}

impl SweepSummary {
    fn record(&mut self, outcome: UnitOutcome) {
        self.candidates += 1;
        match outcome {
            UnitOutcome::Stored => self.stored += 1,
            UnitOutcome::AlreadyPresent => self.already_present += 1,
            UnitOutcome::NoProfile => self.no_profile += 1,
            UnitOutcome::NotFound => self.not_found += 1,
            UnitOutcome::TimedOut => self.timed_out += 1,
            UnitOutcome::FetchFailed => self.fetch_failed += 1,
        }
    }

    fn record_failure(&mut self) {
        self.candidates += 1;
        self.unit_failures += 1;
    }

    /// Profiles seen this run, new or already stored
    pub fn profiles_found(&self) -> u64 {
        self.stored + self.already_present
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Candidates processed: {}", self.candidates)?;
        writeln!(f, "Batches: {}", self.batches)?;
        writeln!(f, "New records: {}", self.stored)?;
        writeln!(f, "Already stored: {}", self.already_present)?;
        writeln!(f, "No profile: {}", self.no_profile)?;
        writeln!(f, "Not found (404): {}", self.not_found)?;
        writeln!(f, "Timed out: {}", self.timed_out)?;
        writeln!(f, "Fetch failures: {}", self.fetch_failed)?;
        write!(f, "Unit failures: {}", self.unit_failures)
    }
}

/// Everything a processing unit needs, shared read-only across the run
pub struct Pipeline {
    base_url: String,
    timeout: Duration,
    gate: FetchGate,
    parser: ProfileParser,
    store: SharedStore,
}

impl Pipeline {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        gate: FetchGate,
        parser: ProfileParser,
        store: SharedStore,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            gate,
            parser,
            store,
        }
    }

    /// Runs one candidate through fetch, parse and store
    ///
    /// Fetch and parse conditions are folded into the returned outcome; only
    /// storage failures surface as errors.
    pub async fn process(
        &self,
        candidate: &str,
        admission: &Semaphore,
    ) -> Result<UnitOutcome, SweepError> {
        let url = probe_url(&self.base_url, candidate);

        let outcome = {
            let _permit = admission.acquire().await.map_err(|e| SweepError::Unit {
                url: url.clone(),
                message: e.to_string(),
            })?;
            self.gate.fetch(&url, self.timeout).await
        };

        let profile = match self.parser.parse(&outcome) {
            Some(profile) => profile,
            None => {
                let unit = UnitOutcome::from_fetch(&outcome);
                tracing::debug!("No profile at {} ({:?})", url, unit);
                return Ok(unit);
            }
        };

        let record = NewRecord::from_profile(url.clone(), profile);
        let inserted = self.insert(record.clone()).await?;

        if inserted {
            tracing::info!(
                "Processed: {} - {} - {}",
                record.profile_link,
                record.display_name,
                record.level
            );
            Ok(UnitOutcome::Stored)
        } else {
            tracing::debug!("Already stored: {}", record.profile_link);
            Ok(UnitOutcome::AlreadyPresent)
        }
    }

    /// Moves the blocking insert off the async workers
    async fn insert(&self, record: NewRecord) -> Result<bool, SweepError> {
        let store = Arc::clone(&self.store);
        let url = record.profile_link.clone();

        let inserted = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock().map_err(|_| StorageError::LockPoisoned)?;
            guard.insert_if_absent(&record)
        })
        .await
        .map_err(|e| SweepError::Unit {
            url,
            message: e.to_string(),
        })??;

        Ok(inserted)
    }
}

/// Runs every candidate through the pipeline, one batch at a time
///
/// # Algorithm
///
/// 1. Take the next `batch_size` candidates from the sequence
/// 2. Spawn one processing unit per candidate
/// 3. Units share one admission gate of `concurrency_limit` permits, created
///    once for the whole run
/// 4. Wait for every unit of the batch (success or isolated failure)
/// 5. Repeat until the sequence is exhausted
///
/// Only one batch of identifiers is held in memory at a time.
///
/// # Returns
///
/// * `Ok(SweepSummary)` - Every batch completed
/// * `Err(SweepError)` - `batch_size` or `concurrency_limit` was zero
pub async fn run_batches<I>(
    pipeline: Arc<Pipeline>,
    candidates: I,
    batch_size: usize,
    concurrency_limit: usize,
) -> Result<SweepSummary, SweepError>
where
    I: IntoIterator<Item = String>,
{
    if batch_size < 1 {
        return Err(ConfigError::Validation("batch_size must be >= 1".to_string()).into());
    }
    if concurrency_limit < 1 {
        return Err(
            ConfigError::Validation("concurrency_limit must be >= 1".to_string()).into(),
        );
    }

    let admission = Arc::new(Semaphore::new(concurrency_limit));
    let mut candidates = candidates.into_iter();
    let mut summary = SweepSummary::default();
    let start_time = Instant::now();

    loop {
        let batch: Vec<String> = candidates.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        summary.batches += 1;

        let mut units = JoinSet::new();
        for candidate in batch {
            let pipeline = Arc::clone(&pipeline);
            let admission = Arc::clone(&admission);
            units.spawn(async move {
                let result = pipeline.process(&candidate, &admission).await;
                (candidate, result)
            });
        }

        // Batch barrier
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((_, Ok(outcome))) => summary.record(outcome),
                Ok((candidate, Err(e))) => {
                    tracing::error!("Processing {} failed: {}", candidate, e);
                    summary.record_failure();
                }
                Err(e) => {
                    tracing::error!("Processing unit did not complete: {}", e);
                    summary.record_failure();
                }
            }
        }

        let elapsed = start_time.elapsed();
        let rate = summary.candidates as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        tracing::info!(
            "Batch {} done: {} candidates processed, {} new records, {:.2} candidates/sec",
            summary.batches,
            summary.candidates,
            summary.stored,
            rate
        );
    }

    Ok(summary)
}

/// Main sweep coordinator
pub struct Coordinator {
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
}

impl Coordinator {
    /// Creates a coordinator with the HTTP transport and SQLite store
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Store opened and client built
    /// * `Err(SweepError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self, SweepError> {
        let store = storage::open_store(Path::new(&config.output.database_path))?;
        let client = build_http_client(&config.target)?;
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(client));

        Ok(Self::with_components(config, transport, storage::share(store)))
    }

    /// Creates a coordinator over caller-supplied collaborators
    pub fn with_components(config: Config, transport: Arc<dyn Transport>, store: SharedStore) -> Self {
        let gate = FetchGate::new(
            transport,
            config.crawler.timeout_backoff(),
            config.crawler.timeout_retries,
        );
        let parser = ProfileParser::new(&config.parser);
        let pipeline = Pipeline::new(
            config.target.base_url.clone(),
            config.crawler.timeout(),
            gate,
            parser,
            store,
        );

        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Runs a full sweep over the configured candidate space
    pub async fn run(&self) -> Result<SweepSummary, SweepError> {
        let candidates = generate(&self.config.candidates.alphabet, self.config.candidates.length)?;

        tracing::info!(
            "Starting sweep of {} with {} characters, length {}",
            self.config.target.base_url,
            candidates.alphabet_len(),
            candidates.length()
        );

        let start_time = Instant::now();
        let summary = run_batches(
            Arc::clone(&self.pipeline),
            candidates,
            self.config.crawler.batch_size,
            self.config.crawler.concurrent_requests,
        )
        .await?;

        tracing::info!(
            "Sweep complete: {} candidates in {:?}, {} new records",
            summary.candidates,
            start_time.elapsed(),
            summary.stored
        );

        Ok(summary)
    }
}

/// Runs a complete sweep with the default collaborators
///
/// # Example
///
/// ```no_run
/// use profile_sweep::config::load_config;
/// use profile_sweep::crawler::run_sweep;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sweep.toml"))?;
/// let summary = run_sweep(config).await?;
/// println!("{}", summary);
/// # Ok(())
/// # }
/// ```
pub async fn run_sweep(config: Config) -> Result<SweepSummary, SweepError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
