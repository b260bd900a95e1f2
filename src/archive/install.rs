//! Staged extraction and install-directory swap.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::ArchiveError;

/// Outcome of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// Directory now holding the archive contents.
    pub install_dir: PathBuf,
    /// Number of files extracted.
    pub files: usize,
}

/// Extracts `archive` into a staging directory beside `install_dir`, then
/// replaces `install_dir` with it.
///
/// The previous install directory is moved aside before the staged one is
/// renamed into place and is removed afterwards, so `install_dir` always
/// holds either the complete old or the complete new contents.
///
/// # Errors
///
/// Returns [`ArchiveError`] when extraction or either rename fails. On a
/// failed swap the previous directory is moved back.
pub fn install_archive(
    archive: &mut ZipArchive<File>,
    archive_path: &Path,
    install_dir: &Path,
) -> Result<InstallSummary, ArchiveError> {
    let parent = install_parent(install_dir);
    fs::create_dir_all(&parent).map_err(|e| ArchiveError::io(&parent, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".ensdf-staging-")
        .tempdir_in(&parent)
        .map_err(|e| ArchiveError::io(&parent, e))?;
    debug!(staging = %staging.path().display(), "extracting archive");

    let files = extract_all(archive, archive_path, staging.path())?;
    swap_into_place(staging.keep(), install_dir)?;

    info!(files, install_dir = %install_dir.display(), "archive installed");
    Ok(InstallSummary {
        install_dir: install_dir.to_path_buf(),
        files,
    })
}

fn install_parent(install_dir: &Path) -> PathBuf {
    match install_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn extract_all(
    archive: &mut ZipArchive<File>,
    archive_path: &Path,
    target: &Path,
) -> Result<usize, ArchiveError> {
    let mut files = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ArchiveError::zip(archive_path, e))?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = %entry.name(), "skipping archive entry outside the install directory");
            continue;
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            continue;
        }
        if let Some(dir) = out_path.parent() {
            fs::create_dir_all(dir).map_err(|e| ArchiveError::io(dir, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| ArchiveError::io(&out_path, e))?;
        files += 1;
    }
    Ok(files)
}

fn swap_into_place(staged: PathBuf, install_dir: &Path) -> Result<(), ArchiveError> {
    let previous = if install_dir.exists() {
        let aside = aside_path(install_dir);
        if aside.exists() {
            fs::remove_dir_all(&aside).map_err(|e| ArchiveError::io(&aside, e))?;
        }
        fs::rename(install_dir, &aside).map_err(|e| ArchiveError::io(install_dir, e))?;
        Some(aside)
    } else {
        None
    };

    if let Err(e) = fs::rename(&staged, install_dir) {
        if let Some(aside) = &previous
            && let Err(restore) = fs::rename(aside, install_dir)
        {
            warn!(error = %restore, aside = %aside.display(), "could not restore previous install directory");
        }
        if staged.exists()
            && let Err(cleanup) = fs::remove_dir_all(&staged)
        {
            warn!(error = %cleanup, path = %staged.display(), "could not remove staging directory");
        }
        return Err(ArchiveError::io(install_dir, e));
    }

    if let Some(aside) = previous
        && let Err(e) = fs::remove_dir_all(&aside)
    {
        warn!(error = %e, path = %aside.display(), "could not remove previous install directory");
    }
    Ok(())
}

/// Sibling path the previous install directory is moved to during a swap.
fn aside_path(install_dir: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(install_dir.file_name().unwrap_or_else(|| install_dir.as_os_str()));
    name.push(".previous");
    install_parent(install_dir).join(name)
}
