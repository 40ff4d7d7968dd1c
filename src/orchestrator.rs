//! Per-adapter runs: one scrape, or one four-stage validation.
//!
//! Both runs own the transport lifecycle (open before, close on every exit
//! path) and never let a failure escape as an error: a failed run comes
//! back as a [`ScrapingResult`] / [`ValidationResult`] with the failure
//! captured in its fields.

use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::models::{Article, ScrapingResult, ValidationResult};
use crate::scrapers::Scraper;

pub const CONNECTIVITY_CHECK: &str = "connectivity_check";
pub const DATA_FETCH_CHECK: &str = "data_fetch_check";
pub const DATA_STRUCTURE_CHECK: &str = "data_structure_check";
pub const SITE_SPECIFIC_CHECK: &str = "site_specific_check";

/// Articles sampled by the data-fetch check.
const SAMPLE_LIMIT: usize = 3;

/// Run one adapter end-to-end and capture the outcome as data.
///
/// All-or-nothing: an `Err` from the adapter (or a transport that cannot
/// open) yields an empty article list and a single synthetic error entry,
/// never a partial list mixed with errors. One invocation is one attempt;
/// there are no retries.
pub async fn scrape_one(scraper: &mut dyn Scraper, limit: usize) -> ScrapingResult {
    let site = scraper.site_name();
    let scraped_at = Utc::now();
    info!(site, limit, "starting scrape");

    if let Err(e) = scraper.transport_mut().open() {
        error!(site, error = %e, "failed to open transport");
        return ScrapingResult::failure(site, scraped_at, e.to_string());
    }

    let outcome = scraper.scrape_articles(limit).await;
    scraper.transport_mut().close();

    match outcome {
        Ok(articles) => {
            info!(site, count = articles.len(), "scrape completed");
            ScrapingResult::success(site, scraped_at, articles)
        }
        Err(e) => {
            error!(site, error = %e, "scrape failed");
            ScrapingResult::failure(site, scraped_at, e.to_string())
        }
    }
}

/// Probe one adapter with the fixed four-check sequence.
///
/// Checks run in order: connectivity, data fetch, data structure (only when
/// the data fetch produced at least one article), source-specific. The data
/// fetch is not gated on connectivity; each check's own failure is what
/// invalidates. `validation_time_ms` measures the whole sequence.
pub async fn validate_one(scraper: &mut dyn Scraper) -> ValidationResult {
    let site = scraper.site_name();
    let validated_at = Utc::now();
    let started = Instant::now();
    info!(site, "starting validation");

    let mut checks_performed = Vec::new();
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let mut sample_data = Map::new();

    match scraper.transport_mut().open() {
        Err(e) => {
            error!(site, error = %e, "validation could not open transport");
            issues.push(format!("Validation exception: {e}"));
        }
        Ok(()) => {
            checks_performed.push(CONNECTIVITY_CHECK.to_string());
            match scraper.transport().fetch_text(scraper.base_url()).await {
                Some(body) => {
                    sample_data.insert(
                        "connectivity".to_string(),
                        json!({
                            "response_length": body.len(),
                            "has_content": !body.is_empty(),
                        }),
                    );
                }
                None => match scraper.connectivity_fallback_sample() {
                    Some(sample) => {
                        warn!(site, "base URL unreachable; using offline fallback sample");
                        sample_data.insert(
                            "connectivity".to_string(),
                            json!({
                                "offline_fallback": true,
                                "response_length": sample.len(),
                            }),
                        );
                    }
                    None => {
                        issues.push("Connectivity failed: base URL not reachable".to_string());
                    }
                },
            }

            checks_performed.push(DATA_FETCH_CHECK.to_string());
            let sampled: Vec<Article> = match scraper.scrape_articles(SAMPLE_LIMIT).await {
                Ok(articles) if articles.is_empty() => {
                    issues.push("Data fetch failed: No articles retrieved".to_string());
                    Vec::new()
                }
                Ok(articles) => {
                    sample_data.insert(
                        "data_fetch".to_string(),
                        json!({"articles_count": articles.len()}),
                    );
                    articles
                }
                Err(e) => {
                    issues.push(format!("Data fetch failed: {e}"));
                    Vec::new()
                }
            };

            if !sampled.is_empty() {
                checks_performed.push(DATA_STRUCTURE_CHECK.to_string());
                let report = check_article_structure(&sampled, site);
                if report.failures.is_empty() {
                    let sample_titles: Vec<&str> =
                        sampled.iter().take(2).map(|a| a.title.as_str()).collect();
                    sample_data.insert(
                        "data_structure".to_string(),
                        json!({
                            "validated_articles": report.sampled,
                            "sample_titles": sample_titles,
                        }),
                    );
                } else {
                    let detail = report.failures.join("; ");
                    if report.is_critical() {
                        issues.push(format!("Data structure validation failed: {detail}"));
                    } else {
                        warnings.push(format!("Data structure warning: {detail}"));
                    }
                }
            }

            checks_performed.push(SITE_SPECIFIC_CHECK.to_string());
            let check = scraper.validate_site_specific().await;
            if check.success {
                sample_data.insert("site_specific".to_string(), Value::Object(check.data));
            } else {
                let detail = check
                    .error
                    .unwrap_or_else(|| "unspecified failure".to_string());
                if check.critical {
                    issues.push(format!("Site-specific validation failed: {detail}"));
                } else {
                    warnings.push(format!("Site-specific warning: {detail}"));
                }
            }

            scraper.transport_mut().close();
        }
    }

    let is_valid = issues.is_empty();
    let validation_time_ms = started.elapsed().as_millis() as u64;
    info!(site, is_valid, validation_time_ms, "validation completed");

    ValidationResult {
        site: site.to_string(),
        is_valid,
        validated_at,
        validation_time_ms,
        checks_performed,
        issues,
        warnings,
        sample_data,
    }
}

pub(crate) struct StructureReport {
    pub sampled: usize,
    pub failing_articles: usize,
    pub failures: Vec<String>,
}

impl StructureReport {
    /// Critical when more than half the sampled articles fail a check.
    pub fn is_critical(&self) -> bool {
        self.failing_articles > self.sampled / 2
    }
}

/// Check required fields and source attribution on sampled articles.
pub(crate) fn check_article_structure(articles: &[Article], site_name: &str) -> StructureReport {
    let mut failures = Vec::new();
    let mut failing_articles = 0;

    for (i, article) in articles.iter().enumerate() {
        let mut article_failures = Vec::new();
        if article.id.is_empty() {
            article_failures.push(format!("article {i}: missing id"));
        }
        if article.title.is_empty() {
            article_failures.push(format!("article {i}: missing title"));
        }
        if article.author.username.is_empty() {
            article_failures.push(format!("article {i}: missing author"));
        }
        if article.source_site != site_name {
            article_failures.push(format!(
                "article {i}: source_site {:?} does not match {site_name:?}",
                article.source_site
            ));
        }
        if !article_failures.is_empty() {
            failing_articles += 1;
            failures.extend(article_failures);
        }
    }

    StructureReport {
        sampled: articles.len(),
        failing_articles,
        failures,
    }
}
