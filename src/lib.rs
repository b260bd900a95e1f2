//! ENSDF archive synchronizer library
//!
//! Keeps one local copy of the ENSDF nuclear-data distribution in step with
//! the latest bundle NNDC publishes, downloading only when the remote copy
//! is newer than the installed one.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`remote`] - Index page scan and archive URL construction
//! - [`download`] - HTTP client and streaming archive download
//! - [`archive`] - Member completeness check and staged extraction
//! - [`state`] - Persisted record of the installed archive
//! - [`sync`] - Update decision and the install sequence
//! - [`config`] - Paths and tunables passed to every component

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod download;
pub mod remote;
pub mod state;
pub mod sync;
pub(crate) mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use archive::{ArchiveError, ArchiveValidator, InstallSummary, MemberLayout};
pub use config::{FALLBACK_DATE, INSTALL_DIR_ENV, SyncConfig};
pub use download::{
    ArchiveFetcher, DEFAULT_CHUNK_SIZE, DownloadError, FetchObserver, FetchedArchive, HttpClient,
    HttpTimeouts, NoProgress,
};
pub use remote::{ArchiveLocator, RemoteVersion, ScanOutcome, VersionResolver};
pub use state::{LocalArchiveState, StateError, StateStore};
pub use sync::{
    LocalStatus, SyncAction, SyncError, SyncOrchestrator, SyncPlan, SyncReport, SyncState,
};
