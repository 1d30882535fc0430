//! Transport layer for catalog requests
//!
//! The API client only needs "GET this URL, give me status and body". That
//! contract is the [`Transport`] trait; [`HttpTransport`] fulfils it with
//! reqwest and a client-side rate limiter. Dropping the returned future
//! cancels the request.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::errors::{TransportError, TransportResult};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET requests on behalf of the API client
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> TransportResult<RawResponse>;
}

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// reqwest-backed transport with client-side throttling
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    rate_limiter: DirectRateLimiter,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport from the client configuration
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP client cannot be built or the
    /// rate limit is zero
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let client = config.build_http_client()?;
        Self::with_client(client, config.rate_limit_rps, config.request_timeout)
    }

    /// Creates a transport around an existing client
    pub fn with_client(
        client: Client,
        rate_limit_rps: u32,
        request_timeout: Duration,
    ) -> TransportResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
            request_timeout,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> TransportResult<DirectRateLimiter> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            TransportError::RateLimiter {
                reason: "Rate limit must be non-zero".to_string(),
            }
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> TransportResult<RawResponse> {
        // Apply rate limiting with a little jitter so bursts spread out
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        debug!("GET {} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

impl HttpTransport {
    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            TransportError::Http(error)
        }
    }
}
