//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

/// Keep a local ENSDF nuclear-data archive in sync with NNDC.
///
/// Checks the NNDC archive index for the latest ENSDF distribution and
/// downloads, verifies and installs it when the local copy is older.
#[derive(Parser, Debug)]
#[command(name = "ensdf-sync")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding the archive and the install directory
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the state record and config.toml
    #[arg(long, value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Archive index page URL (overrides `base_url` in config.toml)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<Url>,

    /// Do not draw a download progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,
}

impl Cli {
    /// Subcommand to run; `sync` when none was given.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Sync)
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Download and install the latest archive if the local copy is older (default)
    Sync,
    /// Report whether an update is available without downloading
    Check,
    /// Show the installed archive without contacting the server
    Status,
    /// Print a shell line exporting ENSDF_PATH, for use with `eval`
    Env,
}
