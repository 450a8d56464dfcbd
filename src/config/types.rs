use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Profile-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub candidates: CandidateConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote service being probed
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// URL prefix every identifier is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User-Agent header sent with every probe
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Candidate space definition
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateConfig {
    /// Characters identifiers are built from, in enumeration order
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Number of characters in every identifier
    #[serde(default = "default_length")]
    pub length: usize,
}

/// Fetch pacing and scheduling
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight fetches across the whole run
    #[serde(rename = "concurrent-requests", default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of candidates dispatched between completion barriers
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay after a timed-out request (milliseconds)
    #[serde(rename = "timeout-backoff-ms", default = "default_timeout_backoff_ms")]
    pub timeout_backoff_ms: u64,

    /// Extra attempts after a timeout; 0 gives up after the backoff
    #[serde(rename = "timeout-retries", default)]
    pub timeout_retries: u32,
}

/// Markup queries used to read a profile page
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// `id` of the element carrying error messages
    #[serde(rename = "error-container-id", default = "default_error_container_id")]
    pub error_container_id: String,

    /// Text inside the error container that marks a missing profile
    #[serde(rename = "not-found-phrase", default = "default_not_found_phrase")]
    pub not_found_phrase: String,

    /// CSS selector for the display name
    #[serde(rename = "name-selector", default = "default_name_selector")]
    pub name_selector: String,

    /// CSS selector for the level
    #[serde(rename = "level-selector", default = "default_level_selector")]
    pub level_selector: String,

    /// Label removed from the level text before trimming
    #[serde(rename = "level-prefix", default = "default_level_prefix")]
    pub level_prefix: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            length: default_length(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
            timeout_backoff_ms: default_timeout_backoff_ms(),
            timeout_retries: 0,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            error_container_id: default_error_container_id(),
            not_found_phrase: default_not_found_phrase(),
            name_selector: default_name_selector(),
            level_selector: default_level_selector(),
            level_prefix: default_level_prefix(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("profile-sweep/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyz1234567890-_".to_string()
}

fn default_length() -> usize {
    3
}

fn default_concurrent_requests() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    500
}

fn default_timeout_backoff_ms() -> u64 {
    5000
}

fn default_error_container_id() -> String {
    "message".to_string()
}

fn default_not_found_phrase() -> String {
    "Указанный профиль не найден.".to_string()
}

fn default_name_selector() -> String {
    "span.actual_persona_name".to_string()
}

fn default_level_selector() -> String {
    "div.persona_name.persona_level".to_string()
}

fn default_level_prefix() -> String {
    "Уровень".to_string()
}

fn default_database_path() -> String {
    "user_data.db".to_string()
}

impl CrawlerConfig {
    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Post-timeout delay as a Duration
    pub fn timeout_backoff(&self) -> Duration {
        Duration::from_millis(self.timeout_backoff_ms)
    }
}
