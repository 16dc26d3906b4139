//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the research_pulse workflow.
///
/// # Examples
///
/// ```sh
/// # Run everything declared in the default config
/// research_pulse run
///
/// # Run two specific sources, sequentially, into a custom directory
/// research_pulse run -e arxiv -e reddit --sequential -o ./results
///
/// # Show the registered sources
/// research_pulse list
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collection workflow
    Run {
        /// Workflow configuration file
        #[arg(short, long, default_value = "config/default.yml")]
        config: PathBuf,

        /// Restrict the run to specific sources (repeatable)
        #[arg(short = 'e', long = "source")]
        sources: Vec<String>,

        /// Force sequential execution regardless of the configured mode
        #[arg(long)]
        sequential: bool,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// List the registered sources
    List,
}
