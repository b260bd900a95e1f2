//! CLI entry point for the ENSDF archive synchronizer.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ensdf_sync::SyncOrchestrator;
use tracing::{debug, info};

mod app;
mod app_config;
mod cli;

use app::command_dispatcher::dispatch;
use app::exit_handler::determine_exit_outcome;
use cli::Cli;

fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let result = run(&cli);
    if let Err(error) = &result {
        eprintln!("error: {error:#}");
    }
    determine_exit_outcome(&result).into()
}

fn run(cli: &Cli) -> Result<()> {
    let config = app_config::resolve_sync_config(cli)?;
    info!(
        archive = %config.archive_path.display(),
        install_dir = %config.install_dir.display(),
        state = %config.state_file.display(),
        "ENSDF sync starting"
    );

    let orchestrator = SyncOrchestrator::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(dispatch(
        cli.command(),
        &orchestrator,
        !cli.no_progress && !cli.quiet,
    ))
}
