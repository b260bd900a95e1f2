//! Shared helpers for unit tests.

pub(crate) mod archives;
pub(crate) mod socket_guard;
