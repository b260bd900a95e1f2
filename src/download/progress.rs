//! Progress observation for archive downloads.
//!
//! Progress is a side channel: observers see cumulative byte counts but can
//! never influence the outcome of a download.

/// Receives progress notifications from [`ArchiveFetcher`](super::ArchiveFetcher).
///
/// All methods have no-op defaults so observers implement only what they draw.
pub trait FetchObserver: Send + Sync {
    /// Called once the response headers arrive, with the declared body size.
    fn on_start(&self, _declared_bytes: Option<u64>) {}

    /// Called after every chunk is written, with the cumulative bytes on disk.
    fn on_progress(&self, _bytes_written: u64) {}

    /// Called once the body has been fully written (before size verification).
    fn on_finish(&self, _bytes_written: u64) {}
}

/// Observer that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl FetchObserver for NoProgress {}
