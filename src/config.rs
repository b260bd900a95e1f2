//! Paths and tunables for one synchronized archive.
//!
//! Every component receives its paths from a [`SyncConfig`]; nothing reads
//! the environment except [`default_data_dir`] and [`default_config_dir`],
//! and only [`SyncConfig::publish_install_dir`] writes it.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;
use url::Url;

use crate::archive::MemberLayout;
use crate::download::{DEFAULT_CHUNK_SIZE, HttpTimeouts};
use crate::remote::RemoteVersion;

/// Index page of the NNDC ENSDF archive family.
pub const DEFAULT_BASE_URL: &str = "https://www.nndc.bnl.gov/ensdfarchivals/";

/// Stem of the published archive file names (`ensdf_250804.zip`).
pub const DEFAULT_ARCHIVE_STEM: &str = "ensdf";

/// Environment variable the install directory is published under.
pub const INSTALL_DIR_ENV: &str = "ENSDF_PATH";

/// Application directory name under the XDG base directories.
pub const APP_DIR_NAME: &str = "ensdf-sync";

/// Version fetched on a first run when the index page yields no date.
pub const FALLBACK_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 8, 4) {
    Some(date) => date,
    None => panic!("invalid fallback date"),
};

const ARCHIVE_FILE_NAME: &str = "ensdf.zip";
const INSTALL_DIR_NAME: &str = "ensdf";
const STATE_FILE_NAME: &str = "ensdf.json";

/// Resolved configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Index page URL; archive URLs are built beneath it.
    pub base_url: Url,
    /// Stem of the published archive file names.
    pub archive_stem: String,
    /// Members a complete archive must carry.
    pub layout: MemberLayout,
    /// Downloaded archive file.
    pub archive_path: PathBuf,
    /// Directory the archive members are extracted into.
    pub install_dir: PathBuf,
    /// Persisted state record.
    pub state_file: PathBuf,
    /// Version used on a first run when the latest one cannot be resolved.
    pub fallback_version: RemoteVersion,
    /// Write chunk size for the archive download.
    pub chunk_size: usize,
    /// Timeouts for the index page request.
    pub index_timeouts: HttpTimeouts,
    /// Timeouts for the archive download.
    pub archive_timeouts: HttpTimeouts,
}

impl SyncConfig {
    /// Builds a configuration with the standard file names under the given
    /// data and config directories.
    #[must_use]
    pub fn new(data_dir: &Path, config_dir: &Path) -> Self {
        Self {
            base_url: default_base_url(),
            archive_stem: DEFAULT_ARCHIVE_STEM.to_string(),
            layout: MemberLayout::default(),
            archive_path: data_dir.join(ARCHIVE_FILE_NAME),
            install_dir: data_dir.join(INSTALL_DIR_NAME),
            state_file: config_dir.join(STATE_FILE_NAME),
            fallback_version: RemoteVersion::new(FALLBACK_DATE),
            chunk_size: DEFAULT_CHUNK_SIZE,
            index_timeouts: HttpTimeouts::INDEX,
            archive_timeouts: HttpTimeouts::ARCHIVE,
        }
    }

    /// Replaces the index page URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets [`INSTALL_DIR_ENV`] to the install directory in this process's
    /// environment, where in-process readers and spawned children find it.
    ///
    /// The variable is written through `std::env`, so it must not race with
    /// environment reads made through libc on other threads.
    pub fn publish_install_dir(&self) {
        // SAFETY: std serializes its own environment access; the caller owns
        // any foreign readers.
        unsafe { env::set_var(INSTALL_DIR_ENV, &self.install_dir) };
        debug!(var = INSTALL_DIR_ENV, path = %self.install_dir.display(), "published install directory");
    }

    /// Sibling of the archive path the download is streamed into before it
    /// is promoted.
    #[must_use]
    pub fn partial_archive_path(&self) -> PathBuf {
        let mut name = self
            .archive_path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from(ARCHIVE_FILE_NAME));
        name.push(".part");
        self.archive_path.with_file_name(name)
    }
}

/// Parsed [`DEFAULT_BASE_URL`].
///
/// # Panics
///
/// Never in practice; the constant is a valid absolute URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// Resolves the default data directory.
///
/// Priority:
/// 1. `$XDG_DATA_HOME/ensdf-sync`
/// 2. `$HOME/.local/share/ensdf-sync`
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    if let Some(xdg_data_home) = env_var_non_empty_os("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home).join(APP_DIR_NAME));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME),
    )
}

/// Resolves the default config directory.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/ensdf-sync`
/// 2. `$HOME/.config/ensdf-sync`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR_NAME));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
