//! Error type for a sync run.

use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::download::DownloadError;
use crate::remote::InvalidBaseUrl;
use crate::state::StateError;

/// Errors that end a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The archive file exists but its state record does not; the run halts
    /// without downloading.
    #[error(
        "archive {archive} exists but its state record {record} is missing; \
         remove the archive to force a fresh install"
    )]
    StateRecordMissing {
        /// Archive file that was found.
        archive: PathBuf,
        /// State record that was expected beside it.
        record: PathBuf,
    },

    /// The configured base URL cannot address archives.
    #[error(transparent)]
    Config(#[from] InvalidBaseUrl),

    /// Transfer of the archive failed or its size did not verify.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The archive was incomplete or could not be installed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The state record could not be read or written.
    #[error(transparent)]
    State(#[from] StateError),

    /// Promoting the verified download failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the halt-without-download condition, as opposed to a failure.
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::StateRecordMissing { .. })
    }
}
