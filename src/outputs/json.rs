//! JSON persistence for execution results.
//!
//! # Output Structure
//!
//! One file per run, named by a second-granularity local timestamp:
//! ```text
//! output_dir/
//! └── execution_results_20250830_143000.json
//! ```
//! Collisions within the same second across concurrent runs are a known,
//! accepted limitation of the naming scheme.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{ExecutionResult, RunReport, RunSummary};

/// Rewrite every timestamp-shaped string in a JSON tree to canonical
/// RFC 3339 UTC with microsecond precision.
///
/// Payloads are free-form and may carry timestamps at any depth and in
/// several upstream formats (RFC 3339 with offset, RFC 2822 from feed
/// data, naive ISO-8601). The walk recognizes strings that fully parse as
/// one of those and leaves everything else untouched.
pub fn canonicalize_timestamps(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Some(canonical) = canonical_timestamp(s) {
                *s = canonical;
            }
        }
        Value::Array(items) => {
            for item in items {
                canonicalize_timestamps(item);
            }
        }
        Value::Object(map) => {
            for (_key, nested) in map.iter_mut() {
                canonicalize_timestamps(nested);
            }
        }
        _ => {}
    }
}

fn canonical_timestamp(s: &str) -> Option<String> {
    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.with_timezone(&Utc)
    } else if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else {
        return None;
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Serialize a result batch (plus its [`RunSummary`]) to one JSON document.
///
/// Directory creation is idempotent. Returns the path of the written
/// artifact.
///
/// # Errors
///
/// I/O failures (directory creation, writing) are propagated with context;
/// they never invalidate the in-memory results already computed.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir, results = results.len()))]
pub async fn write_results(results: &[ExecutionResult], output_dir: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("creating output directory {output_dir}"))?;

    let summary = RunSummary::summarize(results);
    let path =
        Path::new(output_dir).join(format!("execution_results_{}.json", summary.timestamp));

    let report = RunReport {
        summary,
        results: results.to_vec(),
    };
    let mut document = serde_json::to_value(&report).context("serializing run report")?;
    canonicalize_timestamps(&mut document);

    let text = serde_json::to_string_pretty(&document).context("rendering run report")?;
    fs::write(&path, text)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), "Results saved");
    Ok(path)
}
