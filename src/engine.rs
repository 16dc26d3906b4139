//! The execution engine: runs a composed pipeline and isolates failures.
//!
//! Every fetch invocation is wrapped so that a failure inside one source
//! becomes a failed [`ExecutionResult`] instead of aborting the batch.
//! PARALLEL mode fans out one task per source and joins on all of them;
//! SEQUENTIAL mode runs them strictly in order with a per-source progress
//! line. In both modes the returned sequence mirrors the input order of
//! the pipeline, never completion order.
//!
//! # Retry Strategy
//!
//! Each attempt runs under the configured per-attempt timeout; a failed or
//! timed-out attempt is retried up to `ExecutionConfig.retries` times and
//! only the final attempt's outcome is recorded.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::config::ExecutionConfig;
use crate::models::{extract_output_count, ExecutionResult, Fetcher, Pipeline, RunSummary};
use crate::outputs;

/// Limits applied to every fetch invocation, taken from the global
/// [`ExecutionConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after a failed or timed-out attempt.
    pub retries: u32,
}

impl From<&ExecutionConfig> for RunOptions {
    fn from(execution: &ExecutionConfig) -> Self {
        Self {
            timeout: Duration::from_secs(execution.timeout),
            retries: execution.retries,
        }
    }
}

async fn invoke_once(fetcher: &dyn Fetcher, config: &Value, opts: &RunOptions) -> Result<Value> {
    match tokio::time::timeout(opts.timeout, fetcher.fetch(config)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(anyhow!("timed out after {}s", opts.timeout.as_secs())),
    }
}

async fn invoke_with_retries(
    fetcher: &dyn Fetcher,
    config: &Value,
    name: &str,
    opts: &RunOptions,
) -> Result<Value> {
    let mut attempt = 0u32;
    loop {
        match invoke_once(fetcher, config, opts).await {
            Ok(data) => return Ok(data),
            Err(e) if attempt < opts.retries => {
                attempt += 1;
                warn!(
                    source = %name,
                    attempt,
                    max_retries = opts.retries,
                    error = %e,
                    "Fetch attempt failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run one fetcher with uniform error isolation and timing.
///
/// Never fails and never panics on a fetcher error: any raised failure is
/// recovered into a failed result carrying the error message and the full
/// diagnostic chain in `metadata.error_details`.
pub async fn run_single(
    fetcher: Arc<dyn Fetcher>,
    config: Value,
    name: String,
    opts: RunOptions,
) -> ExecutionResult {
    let start_time = Utc::now();
    let outcome = invoke_with_retries(fetcher.as_ref(), &config, &name, &opts).await;
    let end_time = Utc::now();
    let duration = ((end_time - start_time).num_milliseconds() as f64 / 1000.0).max(0.0);

    match outcome {
        Ok(data) => {
            let mut metadata = Map::new();
            metadata.insert("output_count".into(), json!(extract_output_count(&data)));
            ExecutionResult {
                source_name: name,
                success: true,
                data: Some(data),
                start_time,
                end_time,
                duration,
                error: None,
                metadata,
            }
        }
        Err(e) => {
            error!(source = %name, error = %e, "Fetch failed");
            let mut metadata = Map::new();
            metadata.insert("error_details".into(), json!(format!("{e:?}")));
            ExecutionResult {
                source_name: name,
                success: false,
                data: None,
                start_time,
                end_time,
                duration,
                error: Some(e.to_string()),
                metadata,
            }
        }
    }
}

/// Fan out every source at once and join on all of them. The result
/// sequence mirrors the pipeline order regardless of completion order.
async fn run_parallel(pipeline: &Pipeline, opts: RunOptions) -> Vec<ExecutionResult> {
    let tasks = pipeline
        .fetchers
        .iter()
        .zip(&pipeline.configs)
        .zip(&pipeline.names)
        .map(|((fetcher, config), name)| {
            run_single(Arc::clone(fetcher), config.clone(), name.clone(), opts)
        });
    join_all(tasks).await
}

/// Run sources one at a time in pipeline order, emitting a progress line
/// after each completes.
async fn run_sequential(pipeline: &Pipeline, opts: RunOptions) -> Vec<ExecutionResult> {
    let mut results = Vec::with_capacity(pipeline.len());
    for ((fetcher, config), name) in pipeline
        .fetchers
        .iter()
        .zip(&pipeline.configs)
        .zip(&pipeline.names)
    {
        let result = run_single(Arc::clone(fetcher), config.clone(), name.clone(), opts).await;
        let glyph = if result.success { "✓" } else { "✗" };
        info!("{} {}: {:.2}s", glyph, result.source_name, result.duration);
        results.push(result);
    }
    results
}

/// Run a composed pipeline and return its ordered result sequence.
///
/// Individual fetch failures are always recovered locally into failed
/// results; the only error path here is persistence, which is surfaced to
/// the caller after the aggregate counts have been logged.
#[instrument(level = "info", skip_all, fields(sources = pipeline.len(), parallel = execution.parallel))]
pub async fn run(pipeline: &Pipeline, execution: &ExecutionConfig) -> Result<Vec<ExecutionResult>> {
    let opts = RunOptions::from(execution);
    info!(
        count = pipeline.len(),
        parallel = execution.parallel,
        "Starting fetchers"
    );

    let results = if execution.parallel {
        run_parallel(pipeline, opts).await
    } else {
        run_sequential(pipeline, opts).await
    };

    let summary = RunSummary::summarize(&results);
    info!(
        successful = summary.successful,
        total = summary.total,
        total_items = summary.total_items,
        "Completed"
    );

    if execution.save_results {
        outputs::json::write_results(&results, &execution.output_dir)
            .await
            .context("saving execution results")?;
    }

    Ok(results)
}
