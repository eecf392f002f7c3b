//! Resilient payload acquisition over an ordered endpoint chain.
//!
//! The data source sits behind a single primary URL that is not always
//! reachable from every client network, so the fetcher walks an ordered
//! attempt chain: the primary endpoint first, then each configured
//! [`RewriteRule`] applied to it, strictly sequentially, stopping at the
//! first success. Only the last attempt's failure is surfaced: one legible
//! cause beats an aggregate.

mod error;
mod rewrite;

pub use error::FetchError;
pub use rewrite::RewriteRule;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout in seconds. The payload is a single text document.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// HTTP client for fetching the raw tabular payload.
///
/// Designed to be created once and reused across loads, taking advantage of
/// connection pooling.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Creates a fetcher with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeout
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(concat!("venue-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches the raw payload text, walking the endpoint chain in order.
    ///
    /// Attempts the primary endpoint, then each rewrite applied to it, in
    /// declared sequence. An attempt succeeds only when the transport
    /// succeeds AND the response status is a success status; the first
    /// success returns the body and ends the chain. Failed attempts are
    /// logged and the chain continues.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when the primary endpoint does not
    /// parse, otherwise the LAST attempt's error once the chain is
    /// exhausted.
    #[instrument(skip(self, rewrites), fields(endpoint = %endpoint, rewrites = rewrites.len()))]
    pub async fn fetch_text(
        &self,
        endpoint: &str,
        rewrites: &[RewriteRule],
    ) -> Result<String, FetchError> {
        Url::parse(endpoint).map_err(|_| FetchError::invalid_url(endpoint))?;

        let mut last_error: Option<FetchError> = None;
        let attempts = std::iter::once(("primary", endpoint.to_string()))
            .chain(rewrites.iter().map(|rule| (rule.label(), rule.apply(endpoint))));

        for (label, url) in attempts {
            debug!(label, %url, "attempting fetch");
            match self.fetch_attempt(&url).await {
                Ok(body) => {
                    info!(label, bytes = body.len(), "fetch succeeded");
                    return Ok(body);
                }
                Err(error) => {
                    warn!(label, error = %error, "fetch attempt failed; trying next endpoint");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::invalid_url(endpoint)))
    }

    /// One GET attempt against one URL.
    async fn fetch_attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })
    }
}
