//! Index pages, archives and state records for sync tests.

use std::io::{Cursor, Write};
use std::path::Path;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Path of the index page on the mock server.
pub const INDEX_PATH: &str = "/ensdfarchivals/";

/// `Last-Modified` stamp served with archives.
pub const SERVER_STAMP: &str = "Sun, 10 Aug 2025 14:02:11 GMT";

/// Index page markup announcing `date` (`YYYY/MM/DD`).
pub fn index_page(date: &str) -> String {
    format!(
        "<html><head><title>ENSDF Archivals</title></head><body>\n\
         <h1>ENSDF Archives</h1>\n\
         <table><tr><td><b>Last modified:</b></td><td> {date} </td></tr></table>\n\
         <a href=\"distributions/\">distributions</a>\n\
         </body></html>"
    )
}

/// Archive bytes holding `ensdf.001..=ensdf.{count}` minus `skip`.
pub fn archive_bytes(count: u32, skip: &[u32]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for index in (1..=count).filter(|i| !skip.contains(i)) {
        writer
            .start_file(format!("ensdf.{index:03}"), SimpleFileOptions::default())
            .unwrap();
        writeln!(writer, "ENSDF member {index}").unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Complete 300-member archive.
pub fn complete_archive() -> Vec<u8> {
    archive_bytes(300, &[])
}

/// Path of the archive for `yymmdd` beneath the index page.
pub fn archive_path(yymmdd: &str) -> String {
    format!(
        "{INDEX_PATH}distributions/dist{}/ensdf_{yymmdd}.zip",
        &yymmdd[..2]
    )
}

/// Serves the index page announcing `date`.
pub async fn mount_index(server: &MockServer, date: &str) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(date)))
        .mount(server)
        .await;
}

/// Serves `body` for the archive `yymmdd`, expecting `expected_hits` requests.
pub async fn mount_archive(
    server: &MockServer,
    yymmdd: &str,
    body: Vec<u8>,
    last_modified: Option<&str>,
    expected_hits: u64,
) {
    let mut response = ResponseTemplate::new(200).set_body_bytes(body);
    if let Some(stamp) = last_modified {
        response = response.insert_header("Last-Modified", stamp);
    }
    Mock::given(method("GET"))
        .and(path(archive_path(yymmdd)))
        .respond_with(response)
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Writes a state record and a placeholder archive file, as a previous run would.
pub fn seed_install(data_dir: &Path, config_dir: &Path, stamp: &str, size: u64) {
    std::fs::create_dir_all(data_dir.join("ensdf")).unwrap();
    std::fs::write(data_dir.join("ensdf").join("ensdf.001"), b"previous").unwrap();
    std::fs::write(data_dir.join("ensdf.zip"), b"previous archive").unwrap();
    std::fs::create_dir_all(config_dir).unwrap();
    std::fs::write(
        config_dir.join("ensdf.json"),
        format!("{{\"date\": \"{stamp}\", \"size\": {size}}}"),
    )
    .unwrap();
}
