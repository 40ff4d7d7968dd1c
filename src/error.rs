//! Engine error type.
//!
//! The scraping engine converts failures into data (`ScrapingResult` /
//! `ValidationResult` fields) at the orchestrator boundary, so this enum
//! stays small: it covers the failure points that abort a whole adapter run.
//! Sub-fetch and per-record failures never become errors; they are logged
//! and skipped inside the adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// An adapter run failed as a whole.
    #[error("scrape failed for {site}: {reason}")]
    Adapter { site: String, reason: String },
}

impl ScrapeError {
    pub fn adapter(site: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::Adapter {
            site: site.into(),
            reason: reason.into(),
        }
    }
}
