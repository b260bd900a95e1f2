//! Error types for the persisted archive state record.

use std::path::PathBuf;

use thiserror::Error;

/// Errors for loading and saving the archive state record.
#[derive(Debug, Error)]
pub enum StateError {
    /// No record exists yet; the expected signal for a first run.
    #[error("no archive state record at {path}")]
    NotFound {
        /// Where the record was looked for.
        path: PathBuf,
    },

    /// The record exists but cannot be decoded.
    #[error("archive state record {path} is corrupt: {source}")]
    Corrupt {
        /// Record path.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem I/O failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StateError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the record simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
