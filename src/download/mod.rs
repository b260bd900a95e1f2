//! HTTP access to the archive server.
//!
//! This module covers both network operations of a sync run: fetching the
//! index page text and streaming the archive body to disk.
//!
//! # Features
//!
//! - Streaming downloads written in fixed-size chunks (512 KiB by default)
//! - Size verification against the declared `Content-Length`
//! - Capture of the `Last-Modified` header as the installed version stamp
//! - Optional progress observation
//! - Separate timeouts for the index page and the archive body
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ensdf_sync::download::{ArchiveFetcher, HttpTimeouts, NoProgress};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = ArchiveFetcher::with_timeouts(HttpTimeouts::ARCHIVE);
//! let url = Url::parse("https://www.nndc.bnl.gov/ensdfarchivals/distributions/dist25/ensdf_250804.zip")?;
//! let fetched = fetcher.fetch(&url, Path::new("ensdf.zip.part"), &NoProgress).await?;
//! println!("{} bytes", fetched.bytes_written);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod fetcher;
mod progress;

pub use client::{HttpClient, HttpTimeouts};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CHUNK_SIZE, INDEX_CONNECT_TIMEOUT_SECS, INDEX_READ_TIMEOUT_SECS,
    READ_TIMEOUT_SECS,
};
pub use error::DownloadError;
pub use fetcher::{ArchiveFetcher, FetchedArchive};
pub use progress::{FetchObserver, NoProgress};
