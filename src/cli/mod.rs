//! CLI argument parsing
//!
//! Defines the command-line interface using clap.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

/// Test-suite synchronization client
#[derive(Parser, Debug)]
#[command(name = "suite-sync")]
#[command(version)]
#[command(about = "Load, execute and track test suites against a test-execution backend")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Backend base URL (overrides configuration)
    #[arg(long, global = true)]
    pub url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the cached state of a suite
    Show(ShowArgs),

    /// Show aggregated per-test results across executions
    Results(ResultsArgs),

    /// Schedule an execution and track it to completion
    Run(RunArgs),

    /// Track already-submitted jobs to completion
    Watch(WatchArgs),

    /// Push a full suite replacement from a file
    Update(UpdateArgs),

    /// Print or initialize the configuration
    Config(ConfigArgs),
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Project identifier
    #[arg(short, long)]
    pub project: i64,

    /// Suite identifier
    #[arg(short, long)]
    pub suite: i64,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for results command
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    /// Project identifier
    #[arg(short, long)]
    pub project: i64,

    /// Suite identifier
    #[arg(short, long)]
    pub suite: i64,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Write aggregated rows to a CSV file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Project identifier
    #[arg(short, long)]
    pub project: i64,

    /// Suite identifier
    #[arg(short, long)]
    pub suite: i64,

    /// Execution inputs as name=value pairs
    #[arg(short, long)]
    pub input: Vec<String>,

    /// Output format for the refreshed execution history
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Job uuids to track
    #[arg(required = true)]
    pub jobs: Vec<String>,
}

/// Arguments for update command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Project key
    #[arg(short, long)]
    pub project_key: String,

    /// Path to the suite definition (JSON)
    pub file: PathBuf,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Write an example configuration file to the current directory
    #[arg(long)]
    pub init: bool,
}

/// Parse name=value input pairs
pub fn parse_inputs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut inputs = HashMap::new();

    for pair in pairs {
        match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                inputs.insert(name.to_string(), value.to_string());
            }
            _ => bail!("Invalid input '{pair}', expected name=value"),
        }
    }

    Ok(inputs)
}
