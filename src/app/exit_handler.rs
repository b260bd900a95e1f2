//! Exit code logic for the sync process.
//!
//! Single responsibility: map a command result to the process exit outcome.

use std::process::ExitCode;

use ensdf_sync::SyncError;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Installed, already current, or nothing to do.
    Success,
    /// A step failed.
    Failure,
    /// Stopped without downloading because the state record is missing.
    Halted,
}

impl ProcessExit {
    /// Numeric exit code.
    #[must_use]
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Halted => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(value: ProcessExit) -> Self {
        ExitCode::from(value.code())
    }
}

/// Determines the exit outcome for a command result.
pub(crate) fn determine_exit_outcome(result: &anyhow::Result<()>) -> ProcessExit {
    match result {
        Ok(()) => ProcessExit::Success,
        Err(error)
            if error
                .downcast_ref::<SyncError>()
                .is_some_and(SyncError::is_halt) =>
        {
            ProcessExit::Halted
        }
        Err(_) => ProcessExit::Failure,
    }
}
