//! Source adapters for the supported sites.
//!
//! Each adapter implements the [`Scraper`] contract for one external site:
//!
//! | Site | Module | Method |
//! |------|--------|--------|
//! | Hacker News | [`hackernews`] | index + detail JSON API |
//! | Reuters Japan | [`reuters_japan`] | embedded JSON blob in listing HTML |
//! | Yahoo! News Japan | [`yahoo_news_japan`] | fixed RSS feed |
//!
//! Adapters normalize upstream records into [`Article`]s, skipping and
//! logging individual bad records without failing the batch, and expose a
//! source-specific deep check used by the validation orchestrator. They do
//! not retry failed requests; a failed sub-fetch is skipped, not retried.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ScrapeError;
use crate::models::Article;
use crate::transport::Transport;

pub mod hackernews;
pub mod reuters_japan;
pub mod yahoo_news_japan;

/// Outcome of an adapter's source-specific validation check.
///
/// Critical failures invalidate the whole validation; non-critical failures
/// become warnings.
#[derive(Debug, Clone)]
pub struct SiteCheck {
    pub success: bool,
    pub critical: bool,
    pub error: Option<String>,
    /// Diagnostic payload recorded in `ValidationResult::sample_data`.
    pub data: Map<String, Value>,
}

impl SiteCheck {
    pub fn ok(data: Map<String, Value>) -> Self {
        SiteCheck {
            success: true,
            critical: false,
            error: None,
            data,
        }
    }

    pub fn warning(error: impl Into<String>) -> Self {
        SiteCheck {
            success: false,
            critical: false,
            error: Some(error.into()),
            data: Map::new(),
        }
    }

    pub fn critical(error: impl Into<String>) -> Self {
        SiteCheck {
            success: false,
            critical: true,
            error: Some(error.into()),
            data: Map::new(),
        }
    }
}

/// Contract every source adapter implements.
///
/// An adapter owns its [`Transport`]; the orchestrators drive the
/// open/close lifecycle around each run, so `scrape_articles` and
/// `validate_site_specific` can assume an open transport (and still degrade
/// to "no data" if it is closed).
#[async_trait]
pub trait Scraper: Send {
    /// Stable identifier, also written into every produced `source_site`.
    fn site_name(&self) -> &'static str;

    /// Landing page probed by the connectivity check.
    fn base_url(&self) -> &str;

    fn transport(&self) -> &Transport;

    fn transport_mut(&mut self) -> &mut Transport;

    /// Fetch and normalize up to `limit` articles.
    ///
    /// Individual bad records and failed sub-fetches are skipped with a
    /// log line. An unreachable index/listing yields `Ok(vec![])`, not an
    /// error; an `Err` means the run failed as a whole.
    async fn scrape_articles(&self, limit: usize) -> Result<Vec<Article>, ScrapeError>;

    /// Source-specific deeper checks for self-validation.
    async fn validate_site_specific(&self) -> SiteCheck;

    /// Canned response body substituted for the connectivity probe when the
    /// live fetch fails, for adapters that opt in. Default: no fallback.
    fn connectivity_fallback_sample(&self) -> Option<String> {
        None
    }
}
