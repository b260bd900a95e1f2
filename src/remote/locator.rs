//! Download URL construction for a given archive version.
//!
//! The remote layout is fixed and outside our control:
//! `{base}/distributions/dist{yy}/{stem}_{yy}{mm}{dd}.zip`.

use url::Url;

use super::RemoteVersion;

/// Builds archive URLs below a fixed base index URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocator {
    base: Url,
    stem: String,
}

/// The base URL cannot carry path segments (e.g. `mailto:` or `data:` URLs).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("archive base URL cannot carry a path: {0}")]
pub struct InvalidBaseUrl(pub String);

impl ArchiveLocator {
    /// Creates a locator for archives named `{stem}_{yymmdd}.zip` below `base`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBaseUrl`] when `base` cannot be extended with path segments.
    pub fn new(base: Url, stem: impl Into<String>) -> Result<Self, InvalidBaseUrl> {
        if base.cannot_be_a_base() {
            return Err(InvalidBaseUrl(base.to_string()));
        }
        Ok(Self {
            base,
            stem: stem.into(),
        })
    }

    /// Distribution folder for the version's year, e.g. `dist25`.
    #[must_use]
    pub fn folder_name(version: RemoteVersion) -> String {
        format!("dist{}", version.date().format("%y"))
    }

    /// Archive file name for the version, e.g. `ensdf_250804.zip`.
    #[must_use]
    pub fn file_name(&self, version: RemoteVersion) -> String {
        format!("{}_{}.zip", self.stem, version.date().format("%y%m%d"))
    }

    /// Builds the archive URL for `version`. Pure: equal versions give equal URLs.
    #[must_use]
    pub fn build_url(&self, version: RemoteVersion) -> Url {
        let folder = Self::folder_name(version);
        let file = self.file_name(version);
        let mut url = self.base.clone();
        // Checked in `new`: the base can always be extended.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["distributions", folder.as_str(), file.as_str()]);
        }
        url
    }
}
