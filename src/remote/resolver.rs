//! Resolution of the latest published archive version.

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::RemoteVersion;
use super::listing::{ScanOutcome, scan_last_modified, text_tokens};
use crate::download::{DownloadError, HttpClient, HttpTimeouts};

/// Reads the index page and extracts the `Last modified:` publication date.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    client: HttpClient,
    index_url: Url,
}

impl VersionResolver {
    /// Creates a resolver for the index page at `index_url`.
    #[must_use]
    pub fn new(client: HttpClient, index_url: Url) -> Self {
        Self { client, index_url }
    }

    /// Creates a resolver with its own page client.
    #[must_use]
    pub fn with_timeouts(index_url: Url, timeouts: HttpTimeouts) -> Self {
        Self::new(HttpClient::for_pages(timeouts), index_url)
    }

    /// Fetches the index page and scans it, keeping every outcome distinct.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the page cannot be fetched.
    #[instrument(skip(self), fields(url = %self.index_url))]
    pub async fn scan(&self) -> Result<ScanOutcome, DownloadError> {
        let page = self.client.get_text(self.index_url.as_str()).await?;
        let tokens = text_tokens(&page);
        debug!(tokens = tokens.len(), "tokenized index page");
        Ok(scan_last_modified(&tokens))
    }

    /// Returns the latest published version, or `None` when it cannot be determined.
    ///
    /// Never fails: an unreachable page, a missing label, or a malformed date
    /// all resolve to `None` with a warning.
    pub async fn resolve_latest(&self) -> Option<RemoteVersion> {
        match self.scan().await {
            Ok(ScanOutcome::Found(date)) => {
                let version = RemoteVersion::new(date);
                info!(%version, "latest archive version");
                Some(version)
            }
            Ok(ScanOutcome::LabelMissing) => {
                warn!("could not determine latest archive date: index page has no `Last modified:` label");
                None
            }
            Ok(ScanOutcome::ValueMissing) => {
                warn!("could not determine latest archive date: `Last modified:` label has no value");
                None
            }
            Ok(ScanOutcome::MalformedValue(raw)) => {
                warn!(value = %raw, "could not determine latest archive date: value is not a YYYY/MM/DD date");
                None
            }
            Err(e) => {
                warn!(error = %e, "could not determine latest archive date: index page unavailable");
                None
            }
        }
    }
}
