//! Error types for archive validation and installation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while validating or installing a downloaded archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive is missing expected members; lists every one of them.
    #[error("archive {path} is missing {} of {expected} members: {}", .missing.len(), format_missing(.member_stem, .missing))]
    Incomplete {
        /// Archive that failed validation.
        path: PathBuf,
        /// Member name stem, e.g. `ensdf`.
        member_stem: String,
        /// Number of members expected.
        expected: u32,
        /// Missing member indices, ascending.
        missing: Vec<u32>,
    },

    /// The file is not a readable zip archive.
    #[error("cannot read archive {path}: {source}")]
    Zip {
        /// Archive path.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// File system error while reading the archive or writing the install directory.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The blocking extraction task did not complete.
    #[error("archive task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ArchiveError {
    /// Creates a zip error.
    pub fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing member indices for an incomplete archive, empty otherwise.
    #[must_use]
    pub fn missing_members(&self) -> &[u32] {
        match self {
            Self::Incomplete { missing, .. } => missing,
            _ => &[],
        }
    }
}

fn format_missing(stem: &str, missing: &[u32]) -> String {
    missing
        .iter()
        .map(|index| super::member_name(stem, *index))
        .collect::<Vec<_>>()
        .join(", ")
}
