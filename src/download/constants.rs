//! Constants for the download module (timeouts, chunking).

/// Default HTTP connect timeout for the archive download (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout for the archive download (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default HTTP connect timeout for the index page (10 seconds).
pub const INDEX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout for the index page (30 seconds).
pub const INDEX_READ_TIMEOUT_SECS: u64 = 30;

/// Default size of each chunk written to disk (512 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;
