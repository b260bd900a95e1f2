//! Binary-side orchestration: command dispatch, progress UI and exit codes.

pub(crate) mod command_dispatcher;
pub(crate) mod exit_handler;
pub(crate) mod progress_manager;
