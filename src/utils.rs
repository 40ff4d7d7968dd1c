//! Small helpers for logging and file system checks.

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Timestamp fragment for default output filenames, e.g. `20250106_093000`.
pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then performs a write test by creating
/// and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;

    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "ニュース記事".repeat(20);
        let result = truncate_for_log(&s, 10);
        assert!(result.contains("…(+"));
    }

    #[test]
    fn test_timestamp_slug_shape() {
        let slug = timestamp_slug();
        assert_eq!(slug.len(), 15);
        assert_eq!(slug.chars().nth(8), Some('_'));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/output");
        ensure_writable_dir(&target).await.unwrap();
        assert!(target.is_dir());
    }
}
