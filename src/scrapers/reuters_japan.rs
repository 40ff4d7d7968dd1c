//! Reuters Japan adapter.
//!
//! The listing page hydrates its client-side rendering from a JSON blob
//! assigned to a global inside a script tag (`Fusion.globalContent = {...};`).
//! The blob is extracted with a pattern match, not a DOM API, and the page
//! structure is undocumented, so record lookup walks a small ordered list of
//! candidate key paths and uses the first one that resolves to a list.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::models::{Article, Author};
use crate::scrapers::{Scraper, SiteCheck};
use crate::transport::Transport;
use crate::utils::truncate_for_log;

pub const SITE_NAME: &str = "reuters_japan";

const BASE_URL: &str = "https://jp.reuters.com";

/// Used when a record carries no author array.
const DEFAULT_AUTHOR: &str = "Reuters";

/// Candidate locations of the record list under the blob's `result` key,
/// tried in order.
const RECORD_PATHS: [&[&str]; 4] = [
    &["articles"],
    &["content", "articles"],
    &["items"],
    &["content", "items"],
];

static FUSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Fusion\.globalContent\s*=\s*(\{.*?\});").unwrap());

pub struct ReutersJapanScraper {
    transport: Transport,
    base_url: String,
}

impl ReutersJapanScraper {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the adapter at an alternate site root (mock servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ReutersJapanScraper {
            transport: Transport::new(),
            base_url: base_url.into(),
        }
    }

    fn listing_url(&self) -> String {
        format!("{}/markets/", self.base_url.trim_end_matches('/'))
    }

    /// Extract the embedded `Fusion.globalContent` JSON blob from page HTML.
    ///
    /// Sync on purpose: the parsed DOM is dropped before the caller awaits
    /// anything again.
    fn extract_fusion_content(html: &str) -> Option<Value> {
        let document = Html::parse_document(html);
        let script_selector = Selector::parse("script").unwrap();

        for script in document.select(&script_selector) {
            let text: String = script.text().collect();
            if !text.contains("Fusion.globalContent") {
                continue;
            }

            let Some(captures) = FUSION_RE.captures(&text) else {
                continue;
            };
            let json_str = &captures[1];
            match serde_json::from_str::<Value>(json_str) {
                Ok(blob) => return Some(blob),
                Err(e) => {
                    error!(
                        error = %e,
                        blob_preview = %truncate_for_log(json_str, 200),
                        "embedded content blob is not valid JSON"
                    );
                    return None;
                }
            }
        }

        warn!("Fusion.globalContent not found in page");
        None
    }

    /// Walk the candidate key paths and return the first record list found.
    fn collect_article_records(fusion: &Value) -> Vec<Value> {
        let Some(result) = fusion.get("result") else {
            return Vec::new();
        };

        if result.is_object() {
            for path in RECORD_PATHS {
                let mut current = result;
                let mut resolved = true;
                for key in path {
                    match current.get(key) {
                        Some(next) => current = next,
                        None => {
                            resolved = false;
                            break;
                        }
                    }
                }
                if resolved {
                    if let Some(list) = current.as_array() {
                        return list.clone();
                    }
                }
            }
        }

        // Some page variants put the list directly under `result`.
        result.as_array().cloned().unwrap_or_default()
    }

    /// Normalize one raw record into an [`Article`].
    ///
    /// Requires a non-empty id and headline and a resolvable canonical URL;
    /// an unparseable date never rejects the record on its own.
    fn parse_record(&self, record: &Value) -> Option<Article> {
        let id = match record.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                warn!("record has no id; skipping");
                return None;
            }
        };

        let Some(headline) = record
            .get("basic_headline")
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
        else {
            warn!(record_id = %id, "record has no headline; skipping");
            return None;
        };

        let Some(canonical) = record
            .get("canonical_url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
        else {
            warn!(record_id = %id, "record has no canonical URL; skipping");
            return None;
        };
        let absolute = if canonical.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), canonical)
        } else {
            canonical.to_string()
        };
        let url = match Url::parse(&absolute) {
            Ok(url) => url,
            Err(e) => {
                warn!(record_id = %id, url = %absolute, error = %e, "invalid canonical URL; skipping");
                return None;
            }
        };

        let username = record
            .get("authors")
            .and_then(Value::as_array)
            .and_then(|authors| authors.first())
            .and_then(author_name)
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let timestamp = ["display_date", "first_publish_date", "publish_date"]
            .iter()
            .find_map(|key| record.get(*key).and_then(Value::as_str))
            .map(parse_display_date)
            .unwrap_or_else(Utc::now);

        let mut metadata = Map::new();
        metadata.insert(
            "section".to_string(),
            record
                .get("taxonomy")
                .and_then(|t| t.get("sections"))
                .cloned()
                .unwrap_or_else(|| json!([])),
        );
        metadata.insert("reuters_id".to_string(), json!(id));
        metadata.insert(
            "type".to_string(),
            json!(
                record
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("article")
            ),
        );

        Some(Article {
            id,
            title: headline.to_string(),
            url: Some(url.clone()),
            content: record
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            author: Author::new(username),
            timestamp,
            score: None,
            comments_count: 0,
            comments: Vec::new(),
            tags: Vec::new(),
            source_site: SITE_NAME.to_string(),
            source_url: url,
            metadata,
        })
    }
}

fn author_name(author: &Value) -> Option<String> {
    let direct = ["name", "byline"].iter().find_map(|key| {
        author
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    });
    direct.or_else(|| {
        let first = author
            .get("first_name")
            .and_then(Value::as_str)
            .unwrap_or("");
        let last = author
            .get("last_name")
            .and_then(Value::as_str)
            .unwrap_or("");
        let full = format!("{first} {last}").trim().to_string();
        (!full.is_empty()).then_some(full)
    })
}

/// Parse an upstream date: RFC 3339, then bare ISO datetime, then bare ISO
/// date; current time as the last resort.
fn parse_display_date(raw: &str) -> DateTime<Utc> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    }
    warn!(raw, "unparseable record date; using current time");
    Utc::now()
}

impl Default for ReutersJapanScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for ReutersJapanScraper {
    fn site_name(&self) -> &'static str {
        SITE_NAME
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    async fn scrape_articles(&self, limit: usize) -> Result<Vec<Article>, ScrapeError> {
        let listing = self.listing_url();
        info!(limit, url = %listing, "fetching listing page");

        let Some(html) = self.transport.fetch_text(&listing).await else {
            error!("failed to fetch listing page");
            return Ok(Vec::new());
        };

        let records = Self::extract_fusion_content(&html)
            .map(|fusion| Self::collect_article_records(&fusion))
            .unwrap_or_default();
        if records.is_empty() {
            error!("no article records found in listing page");
            return Ok(Vec::new());
        }
        info!(count = records.len(), "found article records");

        let articles: Vec<Article> = records
            .iter()
            .filter(|record| record.is_object())
            .filter_map(|record| self.parse_record(record))
            .take(limit)
            .collect();

        info!(count = articles.len(), "parsed articles");
        Ok(articles)
    }

    async fn validate_site_specific(&self) -> SiteCheck {
        let listing = self.listing_url();
        let Some(page) = self.transport.fetch_text(&listing).await else {
            return SiteCheck::critical("markets listing page not accessible");
        };

        let mut issues = Vec::new();
        if !page.contains("Reuters") && !page.contains("ロイター") {
            issues.push("listing page content appears to have changed".to_string());
        }

        if !page.contains("Fusion.globalContent") {
            return SiteCheck::critical("embedded content marker not found in listing page");
        }

        let Some(fusion) = Self::extract_fusion_content(&page) else {
            return SiteCheck::critical("failed to extract embedded content data");
        };

        let records = Self::collect_article_records(&fusion);
        if records.is_empty() {
            return SiteCheck::critical("no article data found in embedded content");
        }
        if records.len() < 5 {
            issues.push(format!("unusually few articles found: {}", records.len()));
        }

        if let Some(sample) = records.first() {
            let missing: Vec<&str> = ["id", "basic_headline", "canonical_url"]
                .iter()
                .copied()
                .filter(|key| field_is_blank(sample, key))
                .collect();
            if !missing.is_empty() {
                issues.push(format!(
                    "sample article missing required fields: {}",
                    missing.join(", ")
                ));
            }
        }

        if self.transport.fetch_text(&self.base_url).await.is_none() {
            issues.push("base URL not accessible".to_string());
        }

        if !issues.is_empty() {
            return SiteCheck::warning(issues.join("; "));
        }

        let mut data = Map::new();
        data.insert("articles_count".to_string(), json!(records.len()));
        data.insert(
            "sample_article_id".to_string(),
            records
                .first()
                .and_then(|r| r.get("id"))
                .cloned()
                .unwrap_or(Value::Null),
        );
        data.insert("markets_page_accessible".to_string(), json!(true));
        SiteCheck::ok(data)
    }
}

fn field_is_blank(record: &Value, key: &str) -> bool {
    match record.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page_with_blob(blob: &str) -> String {
        format!(
            "<html><head><script>var x = 1;</script>\
             <script>Fusion.globalContent = {blob}; Fusion.other = {{}};</script>\
             </head><body>Reuters</body></html>"
        )
    }

    fn record() -> Value {
        json!({
            "id": "ABC123",
            "basic_headline": "Markets rally",
            "canonical_url": "/markets/abc123/",
            "authors": [{"name": "Jane Writer"}],
            "display_date": "2025-03-01T09:30:00Z",
            "description": "Stocks rose.",
            "taxonomy": {"sections": ["markets"]},
            "type": "article"
        })
    }

    #[test]
    fn extracts_blob_from_script_tag() {
        let html = page_with_blob(r#"{"result": {"articles": [{"id": "1"}]}}"#);
        let fusion = ReutersJapanScraper::extract_fusion_content(&html).unwrap();
        assert_eq!(fusion["result"]["articles"][0]["id"], json!("1"));
    }

    #[test]
    fn missing_blob_yields_none() {
        let html = "<html><script>var unrelated = 1;</script></html>";
        assert!(ReutersJapanScraper::extract_fusion_content(html).is_none());
    }

    #[test]
    fn record_lookup_walks_candidate_paths_in_order() {
        let nested = json!({"result": {"content": {"items": [record()]}}});
        assert_eq!(
            ReutersJapanScraper::collect_article_records(&nested).len(),
            1
        );

        let direct_list = json!({"result": [record(), record()]});
        assert_eq!(
            ReutersJapanScraper::collect_article_records(&direct_list).len(),
            2
        );

        let none = json!({"result": {"something_else": {}}});
        assert!(ReutersJapanScraper::collect_article_records(&none).is_empty());
    }

    #[test]
    fn parses_complete_record() {
        let scraper = ReutersJapanScraper::new();
        let article = scraper.parse_record(&record()).unwrap();
        assert_eq!(article.id, "ABC123");
        assert_eq!(article.title, "Markets rally");
        assert_eq!(article.author.username, "Jane Writer");
        assert_eq!(
            article.url.as_ref().unwrap().as_str(),
            "https://jp.reuters.com/markets/abc123/"
        );
        assert_eq!(article.source_url, article.url.unwrap());
        assert_eq!(
            article.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(article.source_site, SITE_NAME);
    }

    #[test]
    fn record_without_canonical_url_is_rejected() {
        let scraper = ReutersJapanScraper::new();
        let mut bad = record();
        bad.as_object_mut().unwrap().remove("canonical_url");
        assert!(scraper.parse_record(&bad).is_none());
    }

    #[test]
    fn record_without_headline_is_rejected() {
        let scraper = ReutersJapanScraper::new();
        let mut bad = record();
        bad["basic_headline"] = json!("");
        assert!(scraper.parse_record(&bad).is_none());
    }

    #[test]
    fn missing_author_array_falls_back_to_source_org() {
        let scraper = ReutersJapanScraper::new();
        let mut anon = record();
        anon.as_object_mut().unwrap().remove("authors");
        let article = scraper.parse_record(&anon).unwrap();
        assert_eq!(article.author.username, DEFAULT_AUTHOR);
    }

    #[test]
    fn author_name_built_from_name_parts() {
        let author = json!({"first_name": "Taro", "last_name": "Yamada"});
        assert_eq!(author_name(&author), Some("Taro Yamada".to_string()));
    }

    #[test]
    fn unparseable_date_does_not_reject_the_record() {
        let scraper = ReutersJapanScraper::new();
        let mut odd = record();
        odd["display_date"] = json!("next tuesday");
        let before = Utc::now();
        let article = scraper.parse_record(&odd).unwrap();
        assert!(article.timestamp >= before);
    }

    #[test]
    fn bare_iso_dates_are_accepted() {
        assert_eq!(
            parse_display_date("2025-03-01T09:30:00"),
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_display_date("2025-03-01"),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn full_page_to_articles() {
        let blob = json!({"result": {"articles": [record()]}}).to_string();
        let html = page_with_blob(&blob);
        let fusion = ReutersJapanScraper::extract_fusion_content(&html).unwrap();
        let records = ReutersJapanScraper::collect_article_records(&fusion);
        assert_eq!(records.len(), 1);
    }
}
