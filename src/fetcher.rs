//! Rate-limited HTTP fetcher
//!
//! Both remote services (the SPARQL endpoint and the dictionary) go through
//! an [`HttpFetcher`], which provides:
//! - a fixed User-Agent (the public endpoint rejects anonymous clients)
//! - rate limiting with governor, shared by every worker holding the fetcher
//! - per-request timeout
//! - bounded retry with exponential backoff on transient failures

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client, StatusCode,
};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry_if, RetryConfig};

/// Settings for one [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub requests_per_second: u32,
    pub retry: RetryConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("termlink/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            requests_per_second: 5,
            retry: RetryConfig::default(),
        }
    }
}

impl FetcherConfig {
    /// Derive fetcher settings from the run configuration
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            user_agent: config.endpoint.user_agent.clone(),
            timeout: config.request_timeout(),
            requests_per_second: config.endpoint.requests_per_second,
            retry: config.retry(),
        }
    }
}

/// HTTP GET client with rate limiting and retry
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Retry policy for transient failures
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Create a new fetcher
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .default_headers(headers)
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry: config.retry,
        })
    }

    /// GET `url` with query parameters, returning the body as text
    ///
    /// # Errors
    ///
    /// Returns the last `FetchError` once retries are exhausted, or the first
    /// non-recoverable one.
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: &'static str,
    ) -> Result<String, FetchError> {
        with_retry_if(
            &self.retry,
            || self.get_once(url, query, accept),
            FetchError::is_recoverable,
        )
        .await
    }

    async fn get_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: &'static str,
    ) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Sending request");

        let response = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, HeaderValue::from_static(accept))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, url));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })
    }

    /// Map a non-success status to an error
    fn status_error(status: StatusCode, url: &str) -> FetchError {
        match status.as_u16() {
            429 => FetchError::RateLimit,
            404 => FetchError::NotFound(url.to_string()),
            code => FetchError::ServerError(code),
        }
    }
}
