//! Utility functions for id derivation, string truncation, and file system checks.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Derive a deterministic item id from a source name and a content key.
///
/// The id is `<source>-<hex>` where `<hex>` is the first 12 bytes of
/// `SHA-256(source \0 content_key)`. Identical upstream content always
/// maps to the same id, which is what makes downstream de-duplication
/// possible.
///
/// # Examples
///
/// ```ignore
/// let id = item_id("arxiv", "https://arxiv.org/abs/2024.0001");
/// assert!(id.starts_with("arxiv-"));
/// ```
pub fn item_id(source: &str, content_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\0");
    hasher.update(content_key.as_bytes());
    let digest = hasher.finalize();

    let hex: String = digest.iter().take(12).map(|b| format!("{b:02x}")).collect();
    format!("{source}-{hex}")
}

/// Truncate a summary to a character budget, marking the cut with `…`.
///
/// Operates on characters rather than bytes so multi-byte text is never
/// split mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_summary("short", 100), "short");
/// assert_eq!(truncate_summary("abcdef", 3), "abc…");
/// ```
pub fn truncate_summary(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test
/// by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("creating output directory {path}"))?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)
        .with_context(|| format!("output directory {path} is not writable"))?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_is_stable() {
        let a = item_id("arxiv", "https://arxiv.org/abs/2024.0001");
        let b = item_id("arxiv", "https://arxiv.org/abs/2024.0001");
        assert_eq!(a, b);
    }

    #[test]
    fn test_item_id_shape() {
        let id = item_id("reddit", "https://reddit.com/r/rust/post1");
        assert!(id.starts_with("reddit-"));
        let hex = id.strip_prefix("reddit-").unwrap();
        assert_eq!(hex.len(), 24);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_item_id_sensitive_to_both_parts() {
        assert_ne!(item_id("arxiv", "k"), item_id("reddit", "k"));
        assert_ne!(item_id("arxiv", "k1"), item_id("arxiv", "k2"));
    }

    #[test]
    fn test_truncate_summary_short_string() {
        assert_eq!(truncate_summary("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_summary_long_string() {
        let s = "a".repeat(500);
        let result = truncate_summary(&s, 100);
        assert_eq!(result.chars().count(), 101);
        assert!(result.ends_with('…'));
    }

    #[test]
    fn test_truncate_summary_multibyte_safe() {
        let s = "日本語のテキストです".repeat(50);
        let result = truncate_summary(&s, 10);
        assert_eq!(result.chars().count(), 11);
        assert!(result.ends_with('…'));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!(
            "research_pulse_probe_{}",
            std::process::id()
        ));
        let path = dir.to_string_lossy().to_string();
        ensure_writable_dir(&path).await.unwrap();
        assert!(dir.is_dir());
        let _ = stdfs::remove_dir_all(&dir);
    }
}
