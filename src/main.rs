//! suite-sync - test-suite synchronization client
//!
//! Console front-end for the synchronization layer: loads suites from a
//! test-execution backend, renders aggregated per-test results, schedules
//! executions and tracks asynchronous jobs to completion.
//!
//! ## Usage
//!
//! ```bash
//! # Show the state of a suite
//! suite-sync show --project 7 --suite 42
//!
//! # Aggregated per-test results, exported to CSV
//! suite-sync results --project 7 --suite 42 --save results.csv
//!
//! # Schedule an execution and track it
//! suite-sync run --project 7 --suite 42 --input dataset=1
//!
//! # Track jobs submitted elsewhere
//! suite-sync watch 3f2a61b0 9cc41ad2
//!
//! # Push a suite replacement
//! suite-sync update --project-key credit suite.json
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use suite_sync::api::ApiClient;
use suite_sync::cli::{self, Args, Command};
use suite_sync::config::env::EnvConfig;
use suite_sync::config::AppConfig;
use suite_sync::models::TestSuite;
use suite_sync::notify::LogSink;
use suite_sync::output::{self, OutputFormat, SuiteFormatter};
use suite_sync::poller::CancelToken;
use suite_sync::store::SuiteStore;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logging(args.verbose || env.verbose.unwrap_or(false));

    let config = resolve_config(&args, &env)?;

    match args.command {
        Command::Show(show_args) => show_suite(&config, show_args).await?,
        Command::Results(results_args) => show_results(&config, results_args).await?,
        Command::Run(run_args) => run_suite(&config, run_args).await?,
        Command::Watch(watch_args) => watch_jobs(&config, watch_args).await?,
        Command::Update(update_args) => update_suite(&config, update_args).await?,
        Command::Config(config_args) => manage_config(&config, config_args)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::new(format!("suite_sync={level}"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_config(args: &Args, env: &EnvConfig) -> Result<AppConfig> {
    let mut config = match args.config.as_deref().or(env.config_file.as_deref()) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };

    config.apply_env(env);

    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }

    Ok(config)
}

fn build_store(config: &AppConfig) -> Result<SuiteStore> {
    let mut client = ApiClient::with_timeout(&config.base_url, config.timeout_secs)
        .context("Failed to create API client")?;

    if let Some(token) = &config.api_token {
        client = client.bearer_token(token);
    }

    Ok(SuiteStore::new(Arc::new(client), Arc::new(LogSink))
        .with_poll_interval(config.poll_interval()))
}

fn formatter(format: &str) -> SuiteFormatter {
    SuiteFormatter::new(OutputFormat::from_str(format).unwrap_or(OutputFormat::Table))
}

/// Wire Ctrl-C to a cancellation token.
fn cancel_on_ctrl_c() -> CancelToken {
    let cancel = CancelToken::new();
    let handle = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, aborting job tracking");
            handle.cancel();
        }
    });

    cancel
}

async fn show_suite(config: &AppConfig, args: cli::ShowArgs) -> Result<()> {
    let store = build_store(config)?;
    store.load_test_suite(args.project, args.suite).await?;

    println!("{}", formatter(&args.format).format_state(&store.state()));
    Ok(())
}

async fn show_results(config: &AppConfig, args: cli::ResultsArgs) -> Result<()> {
    let store = build_store(config)?;
    store.load_test_suite(args.project, args.suite).await?;

    let state = store.state();
    println!("{}", formatter(&args.format).format_results(&state));

    if let Some(path) = &args.save {
        output::export_results_csv(path, &state)?;
    }

    Ok(())
}

async fn run_suite(config: &AppConfig, args: cli::RunArgs) -> Result<()> {
    let store = build_store(config)?;
    store.load_test_suite(args.project, args.suite).await?;

    let inputs = cli::parse_inputs(&args.input)?;
    let cancel = cancel_on_ctrl_c();

    let uuid = store.schedule_execution(&inputs).await?;
    info!("Tracking job {}", uuid);
    store.track_job_with(&uuid, &cancel).await?;

    let state = store.state();
    println!(
        "{}",
        formatter(&args.format).format_executions(&state.executions)
    );
    Ok(())
}

async fn watch_jobs(config: &AppConfig, args: cli::WatchArgs) -> Result<()> {
    let store = build_store(config)?;
    let cancel = cancel_on_ctrl_c();

    // Jobs are tracked concurrently; each one still polls sequentially.
    let tracks = args
        .jobs
        .iter()
        .map(|uuid| store.track_job_with(uuid, &cancel));

    for (uuid, outcome) in args.jobs.iter().zip(join_all(tracks).await) {
        if let Err(error) = outcome {
            warn!("Tracking job {} failed: {}", uuid, error);
        }
    }

    Ok(())
}

async fn update_suite(config: &AppConfig, args: cli::UpdateArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read suite file: {}", args.file.display()))?;
    let suite: TestSuite = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse suite file: {}", args.file.display()))?;

    let store = build_store(config)?;
    let updated = store.update_test_suite(&args.project_key, &suite).await?;

    info!("Updated suite {} ({})", updated.id, updated.name);
    Ok(())
}

fn manage_config(config: &AppConfig, args: cli::ConfigArgs) -> Result<()> {
    if args.init {
        let path = std::path::Path::new("./suite-sync.yaml");
        AppConfig::default().save(path)?;
        println!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    let rendered = serde_yaml::to_string(config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
