use crate::candidates::generate;
use crate::config::types::{
    CandidateConfig, Config, CrawlerConfig, OutputConfig, ParserConfig, TargetConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on concurrent requests
const MAX_CONCURRENT_REQUESTS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_candidate_config(&config.candidates)?;
    validate_crawler_config(&config.crawler)?;
    validate_parser_config(&config.parser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the probe target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the candidate space by building (but not consuming) it
fn validate_candidate_config(config: &CandidateConfig) -> Result<(), ConfigError> {
    generate(&config.alphabet, config.length).map(|_| ())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrent_requests < 1 || config.concurrent_requests > MAX_CONCURRENT_REQUESTS {
        return Err(ConfigError::Validation(format!(
            "concurrent_requests must be between 1 and {}, got {}",
            MAX_CONCURRENT_REQUESTS, config.concurrent_requests
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates the markup queries
fn validate_parser_config(config: &ParserConfig) -> Result<(), ConfigError> {
    if config.error_container_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "error_container_id cannot be empty".to_string(),
        ));
    }

    if config.not_found_phrase.trim().is_empty() {
        return Err(ConfigError::Validation(
            "not_found_phrase cannot be empty".to_string(),
        ));
    }

    validate_selector(&config.name_selector)?;
    validate_selector(&config.level_selector)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a CSS selector compiles
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
