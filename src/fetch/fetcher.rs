//! HTTP fetcher implementation
//!
//! This module handles every HTTP request the archiver makes:
//! - Building the HTTP client from configuration
//! - GET requests for pages and assets
//! - Fixed-interval retry while the server answers 429 Too Many Requests
//! - Error classification

use crate::config::{FetchConfig, RetryConfig};
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// How rate-limited requests are retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause before each retry
    pub backoff: Duration,

    /// Upper bound on retries; `None` retries for as long as the server keeps
    /// rate limiting
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            backoff: Duration::from_millis(config.backoff_ms),
            max_retries: config.max_retries,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads pages and assets
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Creates a fetcher from the fetch and retry configuration sections
    pub fn from_config(fetch: &FetchConfig, retry: &RetryConfig) -> Result<Self, FetchError> {
        let client = build_http_client(fetch).map_err(FetchError::Client)?;
        Ok(Self::new(client, RetryPolicy::from(retry)))
    }

    /// Returns the retry policy in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetches the full body of `url`
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | HTTP 429 | Sleep for the backoff interval, then retry |
    /// | Retry budget exhausted | `FetchError::RateLimited` |
    /// | Any other status | `FetchError::Status` |
    /// | Transport failure | `FetchError::Http` |
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        tracing::debug!("Downloading {}", url);

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| FetchError::Http {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(max_retries) = self.retry.max_retries {
                    if attempts > max_retries {
                        return Err(FetchError::RateLimited {
                            url: url.to_string(),
                            attempts,
                        });
                    }
                }

                tracing::debug!(
                    "Too many requests for {}, retrying in {:?}",
                    url,
                    self.retry.backoff
                );
                tokio::time::sleep(self.retry.backoff).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            let body = response.bytes().await.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

            return Ok(body.to_vec());
        }
    }
}
