//! Unified data model for scraped content.
//!
//! Every source adapter normalizes its upstream records into these types:
//! - [`Author`] / [`Comment`] / [`Article`]: the unified article shape
//! - [`ScrapingResult`]: one adapter run's outcome, failures included
//! - [`ValidationResult`]: one adapter's four-stage self-test outcome
//!
//! All types are created fresh per invocation and immutable once returned;
//! there is no persisted identity across runs. URLs are validated
//! [`url::Url`] values, so a well-formed-URL invariant holds by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// The author of an article or comment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Author {
    /// Display name or account name; never empty for a normalized article.
    pub username: String,
    /// Profile page on the source site, when the source exposes one.
    pub profile_url: Option<Url>,
    /// Site-specific reputation score, when the source exposes one.
    pub karma: Option<i64>,
}

impl Author {
    pub fn new(username: impl Into<String>) -> Self {
        Author {
            username: username.into(),
            profile_url: None,
            karma: None,
        }
    }
}

/// A comment attached to an article.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Comment {
    pub id: String,
    pub author: Author,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub score: Option<i64>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

/// One article, normalized from whatever shape the upstream source uses.
///
/// `source_site` always equals the producing adapter's `site_name`, and
/// `source_url` is the canonical reference page on the source site; `url`
/// is the linked external/original resource, which some sources omit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// Source-assigned identifier, unique within one adapter's result set.
    pub id: String,
    pub title: String,
    pub url: Option<Url>,
    pub content: Option<String>,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub score: Option<i64>,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source_site: String,
    pub source_url: Url,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Outcome of running one adapter end-to-end.
///
/// Scraping is all-or-nothing per source: either a full success with
/// articles (`error_count == 0`), or a single synthetic error entry with an
/// empty article list. Per-article failures inside an adapter are absorbed
/// silently (logged, skipped) and never surface here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapingResult {
    pub site: String,
    /// Run start time.
    pub scraped_at: DateTime<Utc>,
    pub articles: Vec<Article>,
    pub total_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ScrapingResult {
    /// A successful run; counts are derived from the article list.
    pub fn success(
        site: impl Into<String>,
        scraped_at: DateTime<Utc>,
        articles: Vec<Article>,
    ) -> Self {
        let count = articles.len();
        ScrapingResult {
            site: site.into(),
            scraped_at,
            articles,
            total_count: count,
            success_count: count,
            error_count: 0,
            errors: Vec::new(),
        }
    }

    /// A failed run: empty article list, one synthetic error entry.
    pub fn failure(
        site: impl Into<String>,
        scraped_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        ScrapingResult {
            site: site.into(),
            scraped_at,
            articles: Vec::new(),
            total_count: 0,
            success_count: 0,
            error_count: 1,
            errors: vec![error.into()],
        }
    }
}

/// Outcome of one adapter's four-stage self-validation.
///
/// Any entry in `issues` implies `is_valid == false`; `warnings` are
/// advisory and do not affect validity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationResult {
    pub site: String,
    pub is_valid: bool,
    pub validated_at: DateTime<Utc>,
    pub validation_time_ms: u64,
    pub checks_performed: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Diagnostic payload per check name.
    #[serde(default)]
    pub sample_data: Map<String, Value>,
}

impl ValidationResult {
    /// A synthesized invalid result for a site that could not be probed at
    /// all (e.g. an unknown site name).
    pub fn invalid(
        site: impl Into<String>,
        validated_at: DateTime<Utc>,
        issue: impl Into<String>,
    ) -> Self {
        ValidationResult {
            site: site.into(),
            is_valid: false,
            validated_at,
            validation_time_ms: 0,
            checks_performed: Vec::new(),
            issues: vec![issue.into()],
            warnings: Vec::new(),
            sample_data: Map::new(),
        }
    }
}
