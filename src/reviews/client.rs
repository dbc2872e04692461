//! HTTP page fetcher using wreq for TLS fingerprint emulation.

use crate::config::{Config, RequestHeaders};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A page that could not be fetched. Terminal for that page; never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: wreq::Error,
    },

    #[error("request to {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: wreq::Error,
    },
}

/// Trait for fetching listing pages - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a page and returns its HTML.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Review page client with browser impersonation and request pacing.
pub struct ReviewClient {
    client: Client,
    headers: RequestHeaders,
    delay_ms: u64,
    delay_jitter_ms: u64,
    requests: AtomicU64,
}

impl ReviewClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            headers: config.headers.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            requests: AtomicU64::new(0),
        })
    }

    /// Waits between consecutive requests; the first request goes out immediately.
    async fn pace(&self) {
        let previous = self.requests.fetch_add(1, Ordering::SeqCst);
        if previous == 0 || (self.delay_ms == 0 && self.delay_jitter_ms == 0) {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    /// Returns the number of requests issued so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ReviewClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pace().await;

        debug!("GET {}", url);

        let mut request = self.client.get(url).emulation(Emulation::Chrome131);
        for (name, value) in self.headers.pairs() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Request { url: url.to_string(), source }
            }
        })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 || status == 429 {
            warn!("Rate limited ({}). Consider using a proxy or increasing delay.", status);
        }

        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        response.text().await.map_err(|source| FetchError::Body { url: url.to_string(), source })
    }
}
