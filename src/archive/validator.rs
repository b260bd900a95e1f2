//! Completeness check of an archive's member index.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use zip::ZipArchive;

use super::install::{InstallSummary, install_archive};
use super::{ArchiveError, MemberLayout};

/// Checks archives against a [`MemberLayout`] and installs complete ones.
#[derive(Debug, Clone, Default)]
pub struct ArchiveValidator {
    layout: MemberLayout,
}

impl ArchiveValidator {
    /// Creates a validator for the given member layout.
    #[must_use]
    pub fn new(layout: MemberLayout) -> Self {
        Self { layout }
    }

    /// Checks that every expected member is present, without extracting.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Incomplete`] listing all missing members at
    /// once, or [`ArchiveError::Zip`]/[`ArchiveError::Io`] when the archive
    /// cannot be read.
    #[instrument(skip(self), fields(archive = %archive_path.display()))]
    pub fn validate(&self, archive_path: &Path) -> Result<(), ArchiveError> {
        let archive = open_archive(archive_path)?;
        self.check_members(&archive, archive_path)
    }

    /// Validates the archive, then extracts it over `install_dir`.
    ///
    /// Runs on the blocking pool; the caller's task waits for it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`validate`](Self::validate), plus IO errors from
    /// extraction. The install directory is untouched unless the archive is complete.
    pub async fn validate_and_install(
        &self,
        archive_path: &Path,
        install_dir: &Path,
    ) -> Result<InstallSummary, ArchiveError> {
        let validator = self.clone();
        let archive_path = archive_path.to_path_buf();
        let install_dir = install_dir.to_path_buf();
        tokio::task::spawn_blocking(move || validator.validate_and_install_blocking(&archive_path, &install_dir))
            .await?
    }

    fn validate_and_install_blocking(
        &self,
        archive_path: &Path,
        install_dir: &Path,
    ) -> Result<InstallSummary, ArchiveError> {
        let mut archive = open_archive(archive_path)?;
        self.check_members(&archive, archive_path)?;
        install_archive(&mut archive, archive_path, install_dir)
    }

    fn check_members(&self, archive: &ZipArchive<File>, archive_path: &Path) -> Result<(), ArchiveError> {
        let missing = missing_members(&self.layout, archive.file_names());
        if missing.is_empty() {
            debug!(members = self.layout.count, "archive is complete");
            return Ok(());
        }
        Err(ArchiveError::Incomplete {
            path: PathBuf::from(archive_path),
            member_stem: self.layout.stem.clone(),
            expected: self.layout.count,
            missing,
        })
    }
}

/// Returns the indices of every expected member absent from `names`, ascending.
pub fn missing_members<'a, I>(layout: &MemberLayout, names: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: HashSet<&str> = names.into_iter().collect();
    layout
        .expected_names()
        .filter(|(_, name)| !present.contains(name.as_str()))
        .map(|(index, _)| index)
        .collect()
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<File>, ArchiveError> {
    let file = File::open(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    ZipArchive::new(file).map_err(|e| ArchiveError::zip(archive_path, e))
}
