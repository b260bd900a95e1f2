//! Composition of resolver, fetcher, validator and state store.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::NaiveTime;
use tracing::{info, instrument, warn};

use super::{LocalArchive, SyncAction, SyncError, SyncPlan, SyncState, plan};
use crate::archive::ArchiveValidator;
use crate::config::SyncConfig;
use crate::download::{ArchiveFetcher, FetchObserver, HttpClient};
use crate::remote::{ArchiveLocator, RemoteVersion, VersionResolver};
use crate::state::{LocalArchiveState, StateError, StateStore};

/// Archive installed by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArchive {
    /// Version that was requested.
    pub version: RemoteVersion,
    /// Stamp persisted in the state record.
    pub installed_at: SystemTime,
    /// Archive size in bytes.
    pub size_bytes: u64,
    /// Number of member files extracted.
    pub files: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The decision the run acted on.
    pub plan: SyncPlan,
    /// The new install, when the run fetched one.
    pub installed: Option<InstalledArchive>,
}

impl SyncReport {
    /// The classified state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.plan.state
    }
}

/// Local view of the install, read without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStatus {
    /// Archive file location.
    pub archive_path: PathBuf,
    /// Whether the archive file exists.
    pub archive_present: bool,
    /// Install directory location.
    pub install_dir: PathBuf,
    /// Whether the install directory exists.
    pub install_dir_present: bool,
    /// The state record, when one exists.
    pub record: Option<LocalArchiveState>,
}

/// Runs the update decision and, when needed, the install sequence.
#[derive(Debug)]
pub struct SyncOrchestrator {
    config: SyncConfig,
    resolver: VersionResolver,
    locator: ArchiveLocator,
    fetcher: ArchiveFetcher,
    validator: ArchiveValidator,
    store: StateStore,
}

impl SyncOrchestrator {
    /// Builds every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] when the base URL cannot address archives.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let locator = ArchiveLocator::new(config.base_url.clone(), config.archive_stem.clone())?;
        let resolver = VersionResolver::with_timeouts(config.base_url.clone(), config.index_timeouts);
        let fetcher = ArchiveFetcher::new(
            HttpClient::for_archives(config.archive_timeouts),
            config.chunk_size,
        );
        let validator = ArchiveValidator::new(config.layout.clone());
        let store = StateStore::new(config.state_file.clone());
        Ok(Self {
            config,
            resolver,
            locator,
            fetcher,
            validator,
            store,
        })
    }

    /// The configuration this orchestrator was built from.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Resolves the latest version and decides, without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StateRecordMissing`] when the archive exists
    /// without a record, or [`SyncError::State`] when the record is unreadable.
    pub async fn check(&self) -> Result<SyncPlan, SyncError> {
        let remote = self.resolver.resolve_latest().await;
        self.decide(remote)
    }

    /// Brings the install up to date.
    ///
    /// The state record is written only after the download, size check,
    /// validation and extraction have all succeeded. On success the install
    /// directory is published through [`SyncConfig::publish_install_dir`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StateRecordMissing`] without downloading when the
    /// archive exists but has no record, and the component errors of any
    /// failed step otherwise.
    #[instrument(skip(self, observer), fields(base = %self.config.base_url))]
    pub async fn run(&self, observer: &dyn FetchObserver) -> Result<SyncReport, SyncError> {
        let remote = self.resolver.resolve_latest().await;
        let plan = self.decide(remote)?;
        info!(state = %plan.state, "sync state classified");

        let installed = match plan.action {
            SyncAction::Nothing => {
                info!(path = %self.config.install_dir.display(), "installed archive is current");
                None
            }
            SyncAction::Fetch { version, fallback } => {
                if fallback {
                    warn!(%version, "latest version unknown; installing fallback version");
                }
                Some(self.install(version, observer).await?)
            }
        };
        self.config.publish_install_dir();
        Ok(SyncReport { plan, installed })
    }

    /// Reports the local install without network access.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::State`] when a record exists but is unreadable.
    pub fn status(&self) -> Result<LocalStatus, SyncError> {
        let record = match self.store.load() {
            Ok(record) => Some(record),
            Err(StateError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(LocalStatus {
            archive_path: self.config.archive_path.clone(),
            archive_present: self.config.archive_path.exists(),
            install_dir: self.config.install_dir.clone(),
            install_dir_present: self.config.install_dir.is_dir(),
            record,
        })
    }

    fn decide(&self, remote: Option<RemoteVersion>) -> Result<SyncPlan, SyncError> {
        let local = self.local_archive()?;
        plan(remote, local, self.config.fallback_version).ok_or_else(|| {
            warn!(
                archive = %self.config.archive_path.display(),
                record = %self.store.path().display(),
                "archive present without a state record; not downloading"
            );
            SyncError::StateRecordMissing {
                archive: self.config.archive_path.clone(),
                record: self.store.path().to_path_buf(),
            }
        })
    }

    fn local_archive(&self) -> Result<LocalArchive, SyncError> {
        if !self.config.archive_path.exists() {
            return Ok(LocalArchive::Absent);
        }
        match self.store.load() {
            Ok(record) => Ok(LocalArchive::Installed(record.installed_date())),
            Err(StateError::NotFound { .. }) => Ok(LocalArchive::Unrecorded),
            Err(e) => Err(e.into()),
        }
    }

    async fn install(
        &self,
        version: RemoteVersion,
        observer: &dyn FetchObserver,
    ) -> Result<InstalledArchive, SyncError> {
        let url = self.locator.build_url(version);
        let partial = self.config.partial_archive_path();
        info!(%version, %url, "installing archive");

        let fetched = self.fetcher.fetch(&url, &partial, observer).await?;
        let summary = self
            .validator
            .validate_and_install(&partial, &self.config.install_dir)
            .await?;
        tokio::fs::rename(&partial, &self.config.archive_path)
            .await
            .map_err(|e| SyncError::io(&self.config.archive_path, e))?;

        let installed_at = fetched.last_modified.unwrap_or_else(|| {
            warn!(%version, "no usable Last-Modified header; recording requested date");
            midnight_utc(version)
        });
        let record = LocalArchiveState::new(installed_at, fetched.bytes_written);
        self.store.save(&record)?;

        info!(
            %version,
            date = %record.installed_at_http(),
            size = record.installed_size_bytes,
            files = summary.files,
            "archive state updated"
        );
        Ok(InstalledArchive {
            version,
            installed_at,
            size_bytes: fetched.bytes_written,
            files: summary.files,
        })
    }
}

fn midnight_utc(version: RemoteVersion) -> SystemTime {
    SystemTime::from(version.date().and_time(NaiveTime::MIN).and_utc())
}
