//! Scoped HTTP client shared by all source adapters.
//!
//! Each adapter instance owns one [`Transport`]. The orchestrators pair
//! every `open()` with exactly one `close()` on every exit path, so the
//! connection pool's lifetime is explicit rather than tied to drop order.
//!
//! All failure modes fold into "no data": a fetch against a closed
//! transport, a connection error, a non-2xx status, and a body read failure
//! all return `None` after logging. Nothing escapes this boundary as an
//! error, which lets callers treat upstream failure uniformly.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, warn};

use crate::error::ScrapeError;

/// Total-request timeout applied to every fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed identifying header sent with every request.
pub const USER_AGENT: &str = concat!("news_harvest/", env!("CARGO_PKG_VERSION"));

/// A per-adapter HTTP client with explicit open/close lifecycle.
#[derive(Debug, Default)]
pub struct Transport {
    client: Option<Client>,
}

impl Transport {
    /// Create a transport in the closed state.
    pub fn new() -> Self {
        Transport { client: None }
    }

    /// Build the underlying client with the fixed timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::ClientBuild`] if the client cannot be
    /// constructed (e.g. invalid TLS configuration).
    pub fn open(&mut self) -> Result<(), ScrapeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        self.client = Some(client);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Fetch a URL and return the response body text.
    ///
    /// Returns `None` when the transport is not open, the request fails,
    /// the status is not 2xx, or the body cannot be read. Every condition
    /// is logged.
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        let Some(client) = &self.client else {
            error!(%url, "transport is not open");
            return None;
        };

        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    debug!(%url, bytes = body.len(), "fetched");
                    Some(body)
                }
                Err(e) => {
                    error!(%url, error = %e, "failed to read response body");
                    None
                }
            },
            Ok(response) => {
                warn!(%url, status = %response.status(), "non-success status");
                None
            }
            Err(e) => {
                error!(%url, error = %e, "request failed");
                None
            }
        }
    }

    /// Release the underlying connections.
    pub fn close(&mut self) {
        self.client = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_on_closed_transport_returns_none() {
        let transport = Transport::new();
        assert!(!transport.is_open());
        assert!(transport.fetch_text("http://127.0.0.1:1/").await.is_none());
    }

    #[test]
    fn open_and_close_toggle_state() {
        let mut transport = Transport::new();
        transport.open().unwrap();
        assert!(transport.is_open());
        transport.close();
        assert!(!transport.is_open());
    }
}
