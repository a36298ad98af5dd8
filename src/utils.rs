//! Utility functions for text normalization, logging, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization for scraped text
//! - Logical-line splitting for multi-line cell text
//! - String truncation for logging
//! - File system validation for the dump directory

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse all whitespace runs in `s` into single spaces and trim the ends.
///
/// Scraped text is full of incidental indentation and newlines from the
/// page source; after this pass the only line separators left are the ones
/// the extractor inserted explicitly for `<br>` markup.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_ws("  CS  101 \t Intro "), "CS 101 Intro");
/// ```
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split extracted text into normalized logical lines.
///
/// Lines are separated by `\n` only (the separator
/// [`crate::extract::field::text_with_breaks`] emits for `<br>` elements).
/// Each line is whitespace-normalized and empty lines are dropped.
pub fn logical_lines(s: &str) -> Vec<String> {
    s.split('\n')
        .map(normalize_ws)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", &s[..max], s.len() - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Small sync write probe; std fs has the simpler error surface here.
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Dump directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  CS  101 \t Intro "), "CS 101 Intro");
        assert_eq!(normalize_ws("\n\n"), "");
        assert_eq!(normalize_ws("already clean"), "already clean");
    }

    #[test]
    fn test_logical_lines() {
        assert_eq!(
            logical_lines("Mon 08:00-10:00 น.\n  Fri 13:00-15:00 น. \n\n"),
            vec!["Mon 08:00-10:00 น.", "Fri 13:00-15:00 น."]
        );
        assert!(logical_lines("   \n  ").is_empty());
    }

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

    #[tokio::test]
    async fn test_ensure_writable_dir() {
        let dir = std::env::temp_dir().join(format!("course_sync_probe_{}", std::process::id()));
        let dir = dir.to_str().unwrap().to_string();
        ensure_writable_dir(&dir).await.unwrap();
        let _ = stdfs::remove_dir_all(&dir);
    }
}
