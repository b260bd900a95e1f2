//! Validation and installation of downloaded archives.
//!
//! An archive is usable only if it carries every member of a fixed numbered
//! set (`ensdf.001` through `ensdf.300` in the NNDC distribution). Validation
//! reads the zip central directory without extracting anything; installation
//! extracts into a staging directory next to the install directory and swaps
//! it into place with renames.

mod error;
mod install;
mod validator;

pub use error::ArchiveError;
pub use install::{InstallSummary, install_archive};
pub use validator::{ArchiveValidator, missing_members};

/// Default member name stem.
pub const DEFAULT_MEMBER_STEM: &str = "ensdf";

/// Default number of members in a complete archive.
pub const DEFAULT_MEMBER_COUNT: u32 = 300;

/// Naming scheme of the members a complete archive must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLayout {
    /// Name stem before the index, e.g. `ensdf`.
    pub stem: String,
    /// Members are numbered `1..=count`.
    pub count: u32,
}

impl Default for MemberLayout {
    fn default() -> Self {
        Self {
            stem: DEFAULT_MEMBER_STEM.to_string(),
            count: DEFAULT_MEMBER_COUNT,
        }
    }
}

impl MemberLayout {
    /// Name of the member with the given index.
    #[must_use]
    pub fn name(&self, index: u32) -> String {
        member_name(&self.stem, index)
    }

    /// Every expected member name, in index order.
    pub fn expected_names(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (1..=self.count).map(|index| (index, self.name(index)))
    }
}

/// Zero-padded member name, e.g. `ensdf.007`.
#[must_use]
pub fn member_name(stem: &str, index: u32) -> String {
    format!("{stem}.{index:03}")
}
