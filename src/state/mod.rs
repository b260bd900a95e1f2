//! Persisted record of the installed archive.
//!
//! The record lives at a fixed config path as a small JSON document:
//!
//! ```json
//! {"date": "Sun, 10 Aug 2025 14:02:11 GMT", "size": 52428800}
//! ```
//!
//! `date` uses the RFC 1123 HTTP-date form of the server's `Last-Modified`
//! header, so a stamp read from a response is stored and compared without
//! reformatting.

mod error;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use error::StateError;

/// Description of the currently installed archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalArchiveState {
    /// Server-reported modification time of the installed archive.
    #[serde(rename = "date", with = "http_date")]
    pub installed_at: SystemTime,
    /// Size of the installed archive in bytes.
    #[serde(rename = "size")]
    pub installed_size_bytes: u64,
}

impl LocalArchiveState {
    /// Creates a record.
    #[must_use]
    pub fn new(installed_at: SystemTime, installed_size_bytes: u64) -> Self {
        Self {
            installed_at,
            installed_size_bytes,
        }
    }

    /// Calendar date (UTC) of the installed archive.
    #[must_use]
    pub fn installed_date(&self) -> NaiveDate {
        DateTime::<Utc>::from(self.installed_at).date_naive()
    }

    /// The stamp as an HTTP-date string.
    #[must_use]
    pub fn installed_at_http(&self) -> String {
        httpdate::fmt_http_date(self.installed_at)
    }
}

/// Reads and writes the [`LocalArchiveState`] record at one path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the record at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotFound`] when no record exists,
    /// [`StateError::Corrupt`] when it cannot be decoded, and
    /// [`StateError::Io`] for other read failures.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<LocalArchiveState, StateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(StateError::io(&self.path, e)),
        };
        let state: LocalArchiveState =
            serde_json::from_str(&raw).map_err(|source| StateError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(date = %state.installed_at_http(), size = state.installed_size_bytes, "loaded archive state");
        Ok(state)
    }

    /// Writes the record, replacing any previous one.
    ///
    /// The record is written to a sibling temporary file and renamed over the
    /// target, so readers see either the old or the new record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] when the record cannot be written.
    #[instrument(level = "debug", skip(self, state), fields(path = %self.path.display()))]
    pub fn save(&self, state: &LocalArchiveState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let body = serde_json::to_string_pretty(state).map_err(|source| StateError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp_path = self.tmp_path();
        let mut tmp = fs::File::create(&tmp_path).map_err(|e| StateError::io(&tmp_path, e))?;
        tmp.write_all(body.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.sync_all())
            .map_err(|e| StateError::io(&tmp_path, e))?;
        drop(tmp);
        fs::rename(&tmp_path, &self.path).map_err(|e| StateError::io(&self.path, e))?;

        debug!(date = %state.installed_at_http(), size = state.installed_size_bytes, "saved archive state");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serde adapter storing a [`SystemTime`] as an RFC 1123 HTTP-date.
mod http_date {
    use std::time::SystemTime;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(value: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&httpdate::fmt_http_date(*value))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        httpdate::parse_http_date(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STAMP: &str = "Sun, 10 Aug 2025 14:02:11 GMT";

    fn state() -> LocalArchiveState {
        LocalArchiveState::new(httpdate::parse_http_date(STAMP).unwrap(), 52_428_800)
    }

    #[test]
    fn test_load_missing_record_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("ensdf.json"));

        let err = store.load().unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("config").join("ensdf.json"));

        store.save(&state()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, state());
        assert_eq!(loaded.installed_date(), NaiveDate::from_ymd_opt(2025, 8, 10).unwrap());
        assert!(!temp.path().join("config").join("ensdf.json.tmp").exists());
    }

    #[test]
    fn test_record_uses_http_date_and_size_fields() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("ensdf.json"));
        store.save(&state()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["date"], STAMP);
        assert_eq!(raw["size"], 52_428_800);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("ensdf.json"));
        store.save(&state()).unwrap();

        let newer = LocalArchiveState::new(
            httpdate::parse_http_date("Mon, 01 Sep 2025 08:00:00 GMT").unwrap(),
            1,
        );
        store.save(&newer).unwrap();

        assert_eq!(store.load().unwrap(), newer);
    }

    #[test]
    fn test_load_reads_hand_written_record() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("ensdf.json"));
        fs::write(
            store.path(),
            r#"{"date": "Mon, 04 Aug 2025 00:00:00 GMT", "size": 1234}"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.installed_date(), NaiveDate::from_ymd_opt(2025, 8, 4).unwrap());
        assert_eq!(loaded.installed_size_bytes, 1234);
    }

    #[test]
    fn test_load_corrupt_record() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("ensdf.json"));
        fs::write(store.path(), r#"{"date": "last tuesday", "size": 1}"#).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StateError::Corrupt { .. }), "{err:?}");
    }
}
