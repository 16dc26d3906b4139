//! # research_pulse
//!
//! A research-content collection workflow that fetches heterogeneous
//! content (academic papers, social posts, LLM summaries, news digests)
//! from independently configured sources and normalizes the outcomes into
//! one result schema.
//!
//! ## Architecture
//!
//! 1. **Configuration**: A YAML file declares per-source settings and a
//!    global execution block
//! 2. **Composition**: Enabled sources with a registered fetcher become an
//!    ordered pipeline
//! 3. **Execution**: The engine runs the pipeline in parallel or
//!    sequentially, isolating per-source failures into result records
//! 4. **Reporting**: Aggregate counts are logged and the full result list
//!    is persisted as one JSON document per run
//!
//! ## Usage
//!
//! ```sh
//! research_pulse run -c config/default.yml
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod engine;
mod fetchers;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::{Cli, Commands};
use models::RunSummary;
use utils::ensure_writable_dir;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::List => {
            init_tracing("info");
            println!("Available sources:");
            for name in fetchers::available_sources() {
                println!("  • {name}");
            }
            Ok(())
        }
        Commands::Run {
            config,
            sources,
            sequential,
            output_dir,
        } => run_workflow(config, sources, sequential, output_dir).await,
    }
}

async fn run_workflow(
    config_path: PathBuf,
    sources: Vec<String>,
    sequential: bool,
    output_dir: Option<String>,
) -> Result<()> {
    // Config problems abort before any execution starts.
    let workflow = config::load_config(&config_path)?;
    init_tracing(&workflow.execution.log_level);

    let start_time = std::time::Instant::now();
    info!(
        config = %config_path.display(),
        sources = workflow.sources.len(),
        parallel = workflow.execution.parallel,
        "research_pulse starting up"
    );

    let mut execution = workflow.execution.clone();
    if sequential {
        execution.parallel = false;
    }
    if let Some(dir) = output_dir {
        execution.output_dir = dir;
    }

    let selected = workflow.select_sources(&sources);
    let pipeline = pipeline::compose(&selected, fetchers::registry());
    if pipeline.is_empty() {
        warn!("No sources to run");
        return Ok(());
    }
    info!(sources = %pipeline.names.join(", "), "Running sources");

    // Early check: don't start fetching if results can't be written.
    if execution.save_results {
        ensure_writable_dir(&execution.output_dir).await?;
    }

    let results = engine::run(&pipeline, &execution).await?;

    let summary = RunSummary::summarize(&results);
    println!(
        "\nCompleted: {}/{} sources, {} total items",
        summary.successful, summary.total, summary.total_items
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
