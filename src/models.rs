//! Data models for the collection workflow.
//!
//! This module defines the core data structures used throughout the application:
//! - [`UnifiedItem`]: The normalized content record every source maps into
//! - [`ExecutionResult`]: Per-source outcome produced by the execution engine
//! - [`Pipeline`]: The ordered, filtered set of runnable sources for one run
//! - [`RunSummary`] / [`RunReport`]: Aggregate statistics and the persisted document
//! - [`Fetcher`]: The capability contract every source plug-in implements

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::utils::{item_id, truncate_summary};

/// Maximum number of characters kept in a [`UnifiedItem`] summary before
/// truncation with an ellipsis marker.
pub const SUMMARY_CHAR_BUDGET: usize = 280;

/// Broad category of a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Academic paper repositories (e.g. arXiv).
    Academic,
    /// Social media feeds.
    Social,
    /// News digests and curated link collections.
    News,
    /// LLM-generated research summaries.
    Llm,
    /// Discussion forums.
    Forum,
}

/// The normalized content record all sources are expected to produce.
///
/// The `id` is deterministically derived from the source name and a
/// content key (usually the item URL), so re-fetching identical upstream
/// content yields the same id. Downstream consumers rely on that for
/// de-duplication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnifiedItem {
    /// Globally unique per source+content, stable across re-fetches.
    pub id: String,
    pub title: String,
    /// Bounded-length summary; longer text is cut at
    /// [`SUMMARY_CHAR_BUDGET`] characters and marked with `…`.
    pub summary: String,
    pub url: String,
    /// The declared source name this item came from.
    pub source: String,
    pub source_type: SourceType,
    pub published_at: DateTime<Utc>,
    /// Stamped by the fetcher once per invocation; identical for every
    /// item of one fetch call.
    pub collected_at: DateTime<Utc>,
}

impl UnifiedItem {
    /// Build an item with a deterministic id and a bounded summary.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: &str,
        source_type: SourceType,
        title: &str,
        summary: &str,
        url: &str,
        published_at: DateTime<Utc>,
        collected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: item_id(source, url),
            title: title.to_string(),
            summary: truncate_summary(summary, SUMMARY_CHAR_BUDGET),
            url: url.to_string(),
            source: source.to_string(),
            source_type,
            published_at,
            collected_at,
        }
    }
}

/// The capability contract every source plug-in implements.
///
/// A fetcher is a pure function from a source-specific configuration
/// mapping to a structured payload (typically `UnifiedItem`-shaped records
/// plus a count). Fetchers must be safe to invoke concurrently with any
/// other fetcher and must complete in bounded time.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// The registry name of this source.
    fn name(&self) -> &'static str;

    fn source_type(&self) -> SourceType;

    /// Fetch content using the given source-specific parameters.
    async fn fetch(&self, config: &Value) -> Result<Value>;
}

/// The outcome of one fetch attempt, created by the execution engine.
///
/// Exactly one of `data` (on success) or `error` (on failure) is
/// populated; `duration` is never negative.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionResult {
    pub source_name: String,
    pub success: bool,
    pub data: Option<Value>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Wall-clock seconds between `start_time` and `end_time`.
    pub duration: f64,
    pub error: Option<String>,
    /// Carries `output_count` on success or `error_details` on failure.
    pub metadata: Map<String, Value>,
}

impl ExecutionResult {
    /// The recorded `output_count` metadata, zero when absent.
    pub fn output_count(&self) -> u64 {
        self.metadata
            .get("output_count")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

/// Number of outputs represented by a fetch payload: the size of a
/// list/mapping payload, otherwise 1 for a truthy scalar and 0 for an
/// empty or null one.
pub fn extract_output_count(data: &Value) -> u64 {
    match data {
        Value::Array(items) => items.len() as u64,
        Value::Object(map) => map.len() as u64,
        Value::Null => 0,
        Value::Bool(b) => u64::from(*b),
        Value::String(s) => u64::from(!s.is_empty()),
        Value::Number(n) => u64::from(n.as_f64() != Some(0.0)),
    }
}

/// The ordered, filtered set of runnable sources selected for one run.
///
/// Three parallel lists of equal length; index `i` of each refers to the
/// same source.
#[derive(Clone, Default)]
pub struct Pipeline {
    pub fetchers: Vec<Arc<dyn Fetcher>>,
    pub configs: Vec<Value>,
    pub names: Vec<String>,
}

impl Pipeline {
    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }
}

/// Aggregate statistics over one run's results. Computed once, never
/// mutated afterward.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSummary {
    /// Local wall-clock stamp in `YYYYMMDD_HHMMSS` form, shared with the
    /// persisted artifact filename.
    pub timestamp: String,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Sum of `output_count` metadata across successful results.
    pub total_items: u64,
}

impl RunSummary {
    /// Pure aggregation over a result batch.
    pub fn summarize(results: &[ExecutionResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        let total_items = results
            .iter()
            .filter(|r| r.success)
            .map(ExecutionResult::output_count)
            .sum();

        Self {
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            total: results.len(),
            successful,
            failed: results.len() - successful,
            total_items,
        }
    }
}

/// The persisted document: one per run, aggregate counts plus the full
/// ordered result list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub summary: RunSummary,
    pub results: Vec<ExecutionResult>,
}
