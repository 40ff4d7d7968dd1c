//! JSON export of scraping results.
//!
//! Writes one document per run:
//!
//! ```text
//! {
//!   "exported_at": "2025-01-06T09:00:00Z",
//!   "sites": [ { "site": ..., "articles": [...] }, ... ]
//! }
//! ```
//!
//! The nested Article/Author/Comment shape is preserved as-is.

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::ScrapingResult;

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    exported_at: DateTime<Utc>,
    sites: &'a [ScrapingResult],
}

/// Write all results to a single JSON document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_results(
    results: &[ScrapingResult],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let envelope = ExportEnvelope {
        exported_at: Utc::now(),
        sites: results,
    };
    let json = serde_json::to_string_pretty(&envelope)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, json).await?;

    info!(sites = results.len(), "wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Author};
    use serde_json::{Map, Value};
    use url::Url;

    fn one_result() -> ScrapingResult {
        let article = Article {
            id: "1".to_string(),
            title: "Exported".to_string(),
            url: None,
            content: None,
            author: Author::new("writer"),
            timestamp: Utc::now(),
            score: Some(5),
            comments_count: 0,
            comments: Vec::new(),
            tags: Vec::new(),
            source_site: "testsite".to_string(),
            source_url: Url::parse("https://example.com/1").unwrap(),
            metadata: Map::new(),
        };
        ScrapingResult::success("testsite", Utc::now(), vec![article])
    }

    #[tokio::test]
    async fn writes_envelope_with_nested_articles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        write_results(&[one_result()], &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert!(doc["exported_at"].is_string());
        assert_eq!(doc["sites"][0]["site"], "testsite");
        assert_eq!(doc["sites"][0]["articles"][0]["title"], "Exported");
        assert_eq!(doc["sites"][0]["articles"][0]["author"]["username"], "writer");
    }
}
