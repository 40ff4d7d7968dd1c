//! Flattened CSV export: one row per article.
//!
//! Author fields are flattened into columns, tags are comma-joined, and
//! the metadata map is embedded as a serialized JSON sub-document. Fields
//! are quoted RFC-4180 style when they contain a delimiter, quote, or
//! newline.

use std::error::Error;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::models::ScrapingResult;

const HEADER: &str = "site,scraped_at,article_id,title,url,content,author_username,\
author_profile_url,author_karma,timestamp,score,comments_count,tags,source_site,\
source_url,metadata";

/// Quote a field if it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    let row: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Write all articles across all results as one flat CSV table.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_results(
    results: &[ScrapingResult],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    let mut rows = 0usize;
    for result in results {
        for article in &result.articles {
            let fields = vec![
                result.site.clone(),
                result.scraped_at.to_rfc3339(),
                article.id.clone(),
                article.title.clone(),
                article
                    .url
                    .as_ref()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                article.content.clone().unwrap_or_default(),
                article.author.username.clone(),
                article
                    .author
                    .profile_url
                    .as_ref()
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                article.author.karma.unwrap_or(0).to_string(),
                article.timestamp.to_rfc3339(),
                article.score.unwrap_or(0).to_string(),
                article.comments_count.to_string(),
                article.tags.join(","),
                article.source_site.clone(),
                article.source_url.to_string(),
                serde_json::to_string(&article.metadata)?,
            ];
            push_row(&mut out, &fields);
            rows += 1;
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, out).await?;

    info!(rows, "wrote CSV export");
    Ok(())
}
