//! HTTP client wrapper for the index page and archive requests.
//!
//! This module provides the `HttpClient` struct which applies timeout
//! configuration, the tool's User-Agent, and uniform status/error mapping.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};

use super::constants::{
    CONNECT_TIMEOUT_SECS, INDEX_CONNECT_TIMEOUT_SECS, INDEX_READ_TIMEOUT_SECS, READ_TIMEOUT_SECS,
};
use super::error::DownloadError;
use crate::user_agent;

/// Connect and read timeouts for one HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_secs: u64,
}

impl HttpTimeouts {
    /// Defaults for the (large) archive download.
    pub const ARCHIVE: Self = Self {
        connect_secs: CONNECT_TIMEOUT_SECS,
        read_secs: READ_TIMEOUT_SECS,
    };

    /// Defaults for the (small) index page.
    pub const INDEX: Self = Self {
        connect_secs: INDEX_CONNECT_TIMEOUT_SECS,
        read_secs: INDEX_READ_TIMEOUT_SECS,
    };
}

/// HTTP client for the archive server.
///
/// Created once per component and reused, taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client for archive bodies.
    ///
    /// Transparent decompression is off so that the bytes written to disk are
    /// the bytes the server declared in `Content-Length`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeout
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn for_archives(timeouts: HttpTimeouts) -> Self {
        let client = base_client_builder(timeouts)
            .gzip(false)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Creates a client for HTML pages, with gzip decompression enabled.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeout
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn for_pages(timeouts: HttpTimeouts) -> Self {
        let client = base_client_builder(timeouts)
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Sends a GET request and requires a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`]/[`DownloadError::Timeout`] when the
    /// request fails, or [`DownloadError::HttpStatus`] for non-success statuses.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "request rejected");
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }

    /// Fetches a page body as text.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get), plus a network error if
    /// the body cannot be read.
    pub async fn get_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }
}

fn base_client_builder(timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.read_secs))
        .user_agent(user_agent::default_user_agent())
}
