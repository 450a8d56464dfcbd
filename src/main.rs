//! Profile-Sweep main entry point
//!
//! This is the command-line interface for the Profile-Sweep enumerator.

use anyhow::Context;
use clap::Parser;
use profile_sweep::candidates::{generate, space_size};
use profile_sweep::config::{load_config_with_hash, Config};
use profile_sweep::crawler::sweep;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Number of candidates shown by --dry-run
const PREVIEW_CANDIDATES: usize = 5;

/// Profile-Sweep: an exhaustive profile enumerator
///
/// Profile-Sweep builds every identifier of a fixed length over an alphabet,
/// probes the profile URL for each one, and stores every profile it finds
/// exactly once.
#[derive(Parser, Debug)]
#[command(name = "profile-sweep")]
#[command(version)]
#[command(about = "An exhaustive profile enumerator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the candidate space without probing
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_sweep(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("profile_sweep=info,warn"),
            1 => EnvFilter::new("profile_sweep=debug,info"),
            2 => EnvFilter::new("profile_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the candidate space and settings
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Profile-Sweep Dry Run ===\n");

    let candidates = generate(&config.candidates.alphabet, config.candidates.length)?;
    let total = space_size(candidates.alphabet_len(), candidates.length())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "more than u128::MAX".to_string());

    println!("Target:");
    println!("  Base URL: {}", config.target.base_url);
    println!("  User agent: {}", config.target.user_agent);

    println!("\nCandidate Space:");
    println!("  Alphabet: {} ({} characters)", config.candidates.alphabet, candidates.alphabet_len());
    println!("  Length: {}", candidates.length());
    println!("  Total candidates: {}", total);
    println!("  First probes:");
    for candidate in candidates.take(PREVIEW_CANDIDATES) {
        println!("    * {}{}", config.target.base_url, candidate);
    }

    println!("\nCrawler:");
    println!("  Concurrent requests: {}", config.crawler.concurrent_requests);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Timeout backoff: {}ms", config.crawler.timeout_backoff_ms);
    println!("  Timeout retries: {}", config.crawler.timeout_retries);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use profile_sweep::output::{load_statistics, print_statistics, DEFAULT_RECENT_LIMIT};
    use profile_sweep::storage::open_store;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open profile database")?;
    let stats = load_statistics(&store, DEFAULT_RECENT_LIMIT)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main sweep operation
async fn handle_sweep(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Probing {} with identifiers of length {}",
        config.target.base_url,
        config.candidates.length
    );

    match sweep(config).await {
        Ok(summary) => {
            tracing::info!("Parsing and data insertion complete.");
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            Err(e.into())
        }
    }
}
