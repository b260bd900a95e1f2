//! Discovery and addressing of the published archive.
//!
//! - [`listing`] - text-token scanner for the index page
//! - [`resolver`] - fetches the index page and resolves the latest version
//! - [`locator`] - builds the download URL for a version

pub mod listing;
pub mod locator;
pub mod resolver;

use std::fmt;

use chrono::NaiveDate;

pub use listing::{ScanOutcome, ScanState, scan_last_modified, text_tokens};
pub use locator::{ArchiveLocator, InvalidBaseUrl};
pub use resolver::VersionResolver;

/// Publication date of an archive in the remote family.
///
/// Versions compare by calendar date; time of day never matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteVersion(NaiveDate);

impl RemoteVersion {
    /// Wraps a publication date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The publication date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for RemoteVersion {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for RemoteVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
