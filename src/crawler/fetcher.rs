//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with a fixed user agent string and timeout
//! - Retry with backoff for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors surfaced by a page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// HTTP status behind this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

/// Transport used by the crawl controller for every page request
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Outcome of a single request attempt
#[derive(Debug)]
enum Attempt {
    Success(String),
    Retryable {
        error: FetchError,
        retry_after: Option<u64>,
    },
    Fatal(FetchError),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use quote_trawler::config::UserAgentConfig;
/// use quote_trawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config, Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher with bounded retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return body |
/// | Status in the policy's forcelist | Retry after backoff (`Retry-After` on 413/429/503) |
/// | Timeout, connection error, broken body | Retry after backoff |
/// | Any other 4xx/5xx | Fail immediately |
/// | Attempt budget spent | Fail with the last cause |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    async fn attempt(&self, url: &Url) -> Attempt {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_send_error(url, e),
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let error = FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };

            if !self.policy.is_retryable_status(status.as_u16()) {
                return Attempt::Fatal(error);
            }

            let retry_after = if self.policy.honors_retry_after(status.as_u16()) {
                parse_retry_after(response.headers())
            } else {
                None
            };
            return Attempt::Retryable { error, retry_after };
        }

        match response.text().await {
            Ok(body) => Attempt::Success(body),
            Err(e) => classify_send_error(url, e),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let (error, retry_after) = match self.attempt(url).await {
                Attempt::Success(body) => return Ok(body),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retryable { error, retry_after } => (error, retry_after),
            };

            if attempt >= max_attempts {
                if attempt == 1 {
                    return Err(error);
                }
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let wait = match retry_after {
                Some(secs) => self.policy.retry_after_wait(secs),
                None => self.policy.backoff(attempt),
            };
            tracing::warn!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt,
                max_attempts,
                url,
                error,
                wait
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

/// Sorts a transport-level error into retryable or fatal
fn classify_send_error(url: &Url, e: reqwest::Error) -> Attempt {
    if e.is_timeout() {
        return Attempt::Retryable {
            error: FetchError::Timeout {
                url: url.to_string(),
            },
            retry_after: None,
        };
    }

    let error = FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    };

    if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
        Attempt::Retryable {
            error,
            retry_after: None,
        }
    } else {
        Attempt::Fatal(error)
    }
}

/// Reads a `Retry-After` header given in seconds
///
/// The HTTP-date form is ignored and falls back to regular backoff.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
