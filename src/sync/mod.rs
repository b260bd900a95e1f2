//! Update decision and the end-to-end sync sequence.
//!
//! A run classifies the local install against the latest remote version
//! into one [`SyncState`], then either fetches a version or does nothing:
//!
//! | remote        | local archive | state record | state               | action            |
//! |---------------|---------------|--------------|---------------------|-------------------|
//! | any           | absent        | -            | `NoLocalArchive`    | fetch (or fallback) |
//! | any           | present       | absent       | -                   | halt              |
//! | newer         | present       | present      | `StaleLocalArchive` | fetch             |
//! | same or older | present       | present      | `UpToDate`          | none              |
//! | unknown       | present       | present      | `VersionUnknown`    | none              |

mod error;
mod orchestrator;

use std::fmt;

use chrono::NaiveDate;

pub use error::SyncError;
pub use orchestrator::{InstalledArchive, LocalStatus, SyncOrchestrator, SyncReport};

use crate::remote::RemoteVersion;

/// Classification of the local install against the remote archive family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing is installed yet.
    NoLocalArchive,
    /// The installed archive is at least as new as the remote one.
    UpToDate,
    /// The remote archive is newer than the installed one.
    StaleLocalArchive,
    /// The latest remote version could not be determined.
    VersionUnknown,
}

impl SyncState {
    /// Stable label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoLocalArchive => "no-local-archive",
            Self::UpToDate => "up-to-date",
            Self::StaleLocalArchive => "stale-local-archive",
            Self::VersionUnknown => "version-unknown",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a run does after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Download and install `version`.
    Fetch {
        /// Version to request.
        version: RemoteVersion,
        /// True when `version` is the configured fallback, not a resolved one.
        fallback: bool,
    },
    /// Leave the install as it is.
    Nothing,
}

/// Classification plus the action it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    /// Latest remote version, when it was resolved.
    pub remote: Option<RemoteVersion>,
    /// How the local install compares.
    pub state: SyncState,
    /// What the run will do.
    pub action: SyncAction,
}

/// What is known locally before deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalArchive {
    /// No archive file exists.
    Absent,
    /// The archive exists and its record names this installed date.
    Installed(NaiveDate),
    /// The archive exists but no state record describes it.
    Unrecorded,
}

/// Decides what a run should do.
///
/// Returns `None` for [`LocalArchive::Unrecorded`]; the caller halts without
/// downloading. The comparison is by calendar day and only a strictly newer
/// remote version triggers a fetch.
#[must_use]
pub fn plan(
    remote: Option<RemoteVersion>,
    local: LocalArchive,
    fallback: RemoteVersion,
) -> Option<SyncPlan> {
    let (state, action) = match (local, remote) {
        (LocalArchive::Absent, Some(version)) => (
            SyncState::NoLocalArchive,
            SyncAction::Fetch {
                version,
                fallback: false,
            },
        ),
        (LocalArchive::Absent, None) => (
            SyncState::NoLocalArchive,
            SyncAction::Fetch {
                version: fallback,
                fallback: true,
            },
        ),
        (LocalArchive::Unrecorded, _) => return None,
        (LocalArchive::Installed(_), None) => (SyncState::VersionUnknown, SyncAction::Nothing),
        (LocalArchive::Installed(installed), Some(version)) if version.date() > installed => (
            SyncState::StaleLocalArchive,
            SyncAction::Fetch {
                version,
                fallback: false,
            },
        ),
        (LocalArchive::Installed(_), Some(_)) => (SyncState::UpToDate, SyncAction::Nothing),
    };
    Some(SyncPlan {
        remote,
        state,
        action,
    })
}
