//! Plain-text run summary.

use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::ScrapingResult;

/// Render the human-readable summary text for a batch of results.
pub fn render(results: &[ScrapingResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "news_harvest - Scraping Summary");
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out);
    let _ = writeln!(out, "Export Time: {}", Utc::now().to_rfc3339());
    let _ = writeln!(out);

    let mut total_articles = 0;
    let mut total_errors = 0;

    for result in results {
        let _ = writeln!(out, "Site: {}", result.site);
        let _ = writeln!(out, "Scraped At: {}", result.scraped_at.to_rfc3339());
        let _ = writeln!(out, "Success Count: {}", result.success_count);
        let _ = writeln!(out, "Error Count: {}", result.error_count);

        if !result.errors.is_empty() {
            let _ = writeln!(out, "Errors:");
            for error in &result.errors {
                let _ = writeln!(out, "  - {error}");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "-".repeat(30));
        let _ = writeln!(out);

        total_articles += result.success_count;
        total_errors += result.error_count;
    }

    let _ = writeln!(out, "Total Articles: {total_articles}");
    let _ = writeln!(out, "Total Errors: {total_errors}");
    out
}

/// Write the summary text to a file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_summary(
    results: &[ScrapingResult],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, render(results)).await?;
    info!("wrote summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_sites_and_totals() {
        let results = vec![
            ScrapingResult::success("alpha", Utc::now(), Vec::new()),
            ScrapingResult::failure("beta", Utc::now(), "it broke"),
        ];

        let text = render(&results);
        assert!(text.contains("Site: alpha"));
        assert!(text.contains("Site: beta"));
        assert!(text.contains("  - it broke"));
        assert!(text.contains("Total Articles: 0"));
        assert!(text.contains("Total Errors: 1"));
    }
}
