//! Error types for the download module.
//!
//! This module defines structured errors for fetching the index page and the
//! archive body, carrying the URL or path each failure relates to.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the archive server.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (anything outside 2xx).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing the download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Bytes on disk differ from the length the server declared.
    #[error("size mismatch for {path}: server declared {expected_bytes} bytes, got {actual_bytes}")]
    SizeMismatch {
        /// Download path that failed verification.
        path: PathBuf,
        /// Declared `Content-Length`.
        expected_bytes: u64,
        /// Size of the file on disk.
        actual_bytes: u64,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a size mismatch error.
    pub fn size_mismatch(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::SizeMismatch {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// True for failures of the transport rather than of the local disk or the payload.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}
