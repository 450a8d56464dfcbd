//! HTTP fetcher implementation
//!
//! This module handles every outbound probe, including:
//! - Building the HTTP client with the configured user agent
//! - The narrow transport contract the rest of the crawler depends on
//! - Classifying responses into fetch outcomes
//! - The post-timeout backoff and optional bounded retry

use crate::config::TargetConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The resource was served; holds the response body
    Content(String),

    /// The server reported the resource does not exist (HTTP 404)
    NotFound,

    /// The request timed out on every permitted attempt
    TransientFailure(String),

    /// Any other non-success status or transport error
    PermanentFailure(String),
}

impl FetchOutcome {
    /// Returns true if the outcome carries a response body
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }
}

/// Raw response returned by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body (empty for non-success statuses)
    pub body: String,
}

/// Errors a transport can report
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}

/// Capability to issue a GET with a timeout
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET request against `url`
    async fn get(&self, url: &str, timeout: Duration)
        -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(TransportResponse {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(classify_error)?;
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Maps a reqwest error onto the transport contract
fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(error.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use profile_sweep::config::TargetConfig;
/// use profile_sweep::crawler::build_http_client;
///
/// let config = TargetConfig {
///     base_url: "https://example.com/id/".to_string(),
///     user_agent: "ProfileSweep/0.1".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &TargetConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch policy wrapped around a transport
///
/// # Policy
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 2xx | `Content` with the body |
/// | HTTP 404 | `NotFound` (logged) |
/// | Other status | `PermanentFailure` (logged, not retried) |
/// | Timeout | Backoff, then retry while attempts remain, else `TransientFailure` |
/// | Other transport error | `PermanentFailure` (logged) |
///
/// With `timeout_retries == 0` a timed-out probe waits out the backoff and
/// gives up without re-issuing the request.
#[derive(Clone)]
pub struct FetchGate {
    transport: Arc<dyn Transport>,
    timeout_backoff: Duration,
    timeout_retries: u32,
}

impl FetchGate {
    /// Creates a gate over `transport`
    ///
    /// # Arguments
    ///
    /// * `transport` - The transport used for every attempt
    /// * `timeout_backoff` - Delay observed after each timeout
    /// * `timeout_retries` - Additional attempts allowed after a timeout
    pub fn new(transport: Arc<dyn Transport>, timeout_backoff: Duration, timeout_retries: u32) -> Self {
        Self {
            transport,
            timeout_backoff,
            timeout_retries,
        }
    }

    /// Probes `url`, classifying the result
    pub async fn fetch(&self, url: &str, timeout: Duration) -> FetchOutcome {
        let mut attempt: u32 = 0;

        loop {
            match self.transport.get(url, timeout).await {
                Ok(response) => return classify_response(url, response),
                Err(TransportError::Timeout) => {
                    tracing::warn!(
                        "Timeout for {}. Backing off {:?} (attempt {} of {})",
                        url,
                        self.timeout_backoff,
                        attempt + 1,
                        self.timeout_retries.saturating_add(1)
                    );
                    tokio::time::sleep(self.timeout_backoff).await;

                    if attempt >= self.timeout_retries {
                        return FetchOutcome::TransientFailure(format!(
                            "timed out after {} attempt(s)",
                            attempt + 1
                        ));
                    }
                    attempt += 1;
                }
                Err(TransportError::Other(message)) => {
                    tracing::error!("Request error for {}: {}", url, message);
                    return FetchOutcome::PermanentFailure(message);
                }
            }
        }
    }
}

/// Classifies a completed response by status code
fn classify_response(url: &str, response: TransportResponse) -> FetchOutcome {
    let status = StatusCode::from_u16(response.status).ok();

    match status {
        Some(s) if s.is_success() => FetchOutcome::Content(response.body),
        Some(s) if s == StatusCode::NOT_FOUND => {
            tracing::warn!("Failed request {} with status {}", url, response.status);
            FetchOutcome::NotFound
        }
        _ => {
            tracing::warn!("Failed request {} with status {}", url, response.status);
            FetchOutcome::PermanentFailure(format!("HTTP {}", response.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    /// Transport that replays a fixed script of results
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Other("script exhausted".to_string())))
        }
    }

    fn ok(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: body.to_string(),
        })
    }

    fn gate(transport: Arc<ScriptedTransport>, retries: u32) -> FetchGate {
        FetchGate::new(transport, Duration::from_millis(20), retries)
    }

    const URL: &str = "https://example.com/id/ab";
    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_success_returns_content() {
        let transport = ScriptedTransport::new(vec![ok(200, "<html></html>")]);
        let outcome = gate(transport.clone(), 0).fetch(URL, TIMEOUT).await;

        assert_eq!(outcome, FetchOutcome::Content("<html></html>".to_string()));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let transport = ScriptedTransport::new(vec![ok(404, "")]);
        let outcome = gate(transport, 0).fetch(URL, TIMEOUT).await;
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_permanent_and_not_retried() {
        let transport = ScriptedTransport::new(vec![ok(503, ""), ok(200, "late")]);
        let outcome = gate(transport.clone(), 3).fetch(URL, TIMEOUT).await;

        assert_eq!(
            outcome,
            FetchOutcome::PermanentFailure("HTTP 503".to_string())
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_permanent() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Other(
            "connection refused".to_string(),
        ))]);
        let outcome = gate(transport, 0).fetch(URL, TIMEOUT).await;
        assert!(matches!(outcome, FetchOutcome::PermanentFailure(_)));
    }

    #[tokio::test]
    async fn test_timeout_backs_off_then_gives_up() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            ok(200, "never fetched"),
        ]);

        let start = Instant::now();
        let outcome = gate(transport.clone(), 0).fetch(URL, TIMEOUT).await;

        assert!(matches!(outcome, FetchOutcome::TransientFailure(_)));
        assert_eq!(transport.calls(), 1);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_timeout_retry_recovers() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            ok(200, "body"),
        ]);

        let outcome = gate(transport.clone(), 2).fetch(URL, TIMEOUT).await;

        assert_eq!(outcome, FetchOutcome::Content("body".to_string()));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_timeout_retries_exhausted() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
        ]);

        let outcome = gate(transport.clone(), 2).fetch(URL, TIMEOUT).await;

        assert!(matches!(outcome, FetchOutcome::TransientFailure(_)));
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn test_build_http_client() {
        let config = TargetConfig {
            base_url: "https://example.com/id/".to_string(),
            user_agent: "TestSweep/1.0".to_string(),
        };
        assert!(build_http_client(&config).is_ok());
    }
}
