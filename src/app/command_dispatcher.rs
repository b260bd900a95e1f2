//! Runs the selected subcommand and prints its summary.

use std::path::Path;

use anyhow::{Context, Result};
use ensdf_sync::{
    INSTALL_DIR_ENV, LocalStatus, SyncAction, SyncOrchestrator, SyncPlan, SyncReport,
};
use tracing::debug;

use super::progress_manager::progress_observer;
use crate::cli::Command;

/// Executes `command` against `orchestrator`.
pub(crate) async fn dispatch(
    command: Command,
    orchestrator: &SyncOrchestrator,
    show_progress: bool,
) -> Result<()> {
    debug!(?command, "dispatching command");
    match command {
        Command::Sync => {
            let observer = progress_observer(show_progress);
            let report = orchestrator
                .run(observer.as_ref())
                .await
                .context("Sync failed")?;
            println!("{}", describe_report(&report));
        }
        Command::Check => {
            let plan = orchestrator.check().await.context("Check failed")?;
            println!("{}", describe_plan(&plan));
        }
        Command::Status => {
            let status = orchestrator.status().context("Cannot read local state")?;
            println!("{}", describe_status(&status));
        }
        Command::Env => {
            println!("{}", export_line(&orchestrator.config().install_dir));
        }
    }
    Ok(())
}

fn describe_report(report: &SyncReport) -> String {
    match &report.installed {
        Some(installed) => format!(
            "installed ENSDF {} ({} bytes, {} files, Last-Modified {})",
            installed.version,
            installed.size_bytes,
            installed.files,
            httpdate::fmt_http_date(installed.installed_at)
        ),
        None => format!("nothing to do: {}", report.state()),
    }
}

fn describe_plan(plan: &SyncPlan) -> String {
    let remote = plan
        .remote
        .map_or_else(|| "unknown".to_string(), |version| version.to_string());
    match plan.action {
        SyncAction::Fetch {
            version,
            fallback: true,
        } => format!("{}: latest version {remote}; would install fallback {version}", plan.state),
        SyncAction::Fetch { version, .. } => {
            format!("{}: latest version {remote}; would install {version}", plan.state)
        }
        SyncAction::Nothing => format!("{}: latest version {remote}; no update needed", plan.state),
    }
}

fn describe_status(status: &LocalStatus) -> String {
    let mut lines = vec![
        format!(
            "archive: {} ({})",
            status.archive_path.display(),
            present(status.archive_present)
        ),
        format!(
            "{INSTALL_DIR_ENV}={} ({})",
            status.install_dir.display(),
            present(status.install_dir_present)
        ),
    ];
    match &status.record {
        Some(record) => lines.push(format!(
            "installed: {} ({} bytes)",
            record.installed_at_http(),
            record.installed_size_bytes
        )),
        None => lines.push("installed: none".to_string()),
    }
    lines.join("\n")
}

/// `export ENSDF_PATH='<dir>'`, single-quoted for POSIX shells.
fn export_line(install_dir: &Path) -> String {
    let quoted = install_dir.to_string_lossy().replace('\'', r"'\''");
    format!("export {INSTALL_DIR_ENV}='{quoted}'")
}

fn present(flag: bool) -> &'static str {
    if flag { "present" } else { "missing" }
}
