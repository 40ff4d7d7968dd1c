//! JSON report of adapter self-validation outcomes.

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::ValidationResult;

#[derive(Serialize)]
struct ReportEnvelope<'a> {
    exported_at: DateTime<Utc>,
    results: &'a [ValidationResult],
}

/// Write all validation results to a single JSON document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(
    results: &[ValidationResult],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let envelope = ReportEnvelope {
        exported_at: Utc::now(),
        results,
    };
    let json = serde_json::to_string_pretty(&envelope)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, json).await?;

    info!(results = results.len(), "wrote validation report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn report_preserves_issue_lists() {
        let results = vec![ValidationResult::invalid(
            "testsite",
            Utc::now(),
            "Connectivity failed: unreachable",
        )];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.json");
        write_report(&results, &path).await.unwrap();

        let doc: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["results"][0]["site"], "testsite");
        assert_eq!(doc["results"][0]["is_valid"], false);
        assert!(
            doc["results"][0]["issues"][0]
                .as_str()
                .unwrap()
                .contains("Connectivity failed")
        );
    }
}
