use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Writes a zip archive whose members carry their own name as content.
pub(crate) fn write_archive(path: &Path, names: &[String]) {
    let entries: Vec<(&str, &[u8])> = names
        .iter()
        .map(|name| (name.as_str(), name.as_bytes()))
        .collect();
    write_archive_with(path, &entries);
}

/// Writes a zip archive with the given member names and contents.
#[allow(clippy::unwrap_used)]
pub(crate) fn write_archive_with(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}
