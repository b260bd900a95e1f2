//! Streaming archive download with size verification.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use futures_util::{Stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, LAST_MODIFIED};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{HttpClient, HttpTimeouts};
use super::constants::DEFAULT_CHUNK_SIZE;
use super::error::DownloadError;
use super::progress::FetchObserver;

/// Result of a verified archive download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArchive {
    /// Where the archive was written.
    pub path: PathBuf,
    /// Bytes written to disk.
    pub bytes_written: u64,
    /// Length the server declared, when it declared one.
    pub declared_bytes: Option<u64>,
    /// The server's `Last-Modified` stamp, when present and well-formed.
    pub last_modified: Option<SystemTime>,
}

/// Streams archives from the server to local files.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: HttpClient,
    chunk_size: usize,
}

impl ArchiveFetcher {
    /// Creates a fetcher writing in `chunk_size` byte chunks (minimum 1).
    #[must_use]
    pub fn new(client: HttpClient, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Creates a fetcher with the given timeouts and the default 512 KiB chunk size.
    #[must_use]
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Self {
        Self::new(HttpClient::for_archives(timeouts), DEFAULT_CHUNK_SIZE)
    }

    /// Chunk size used for disk writes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Downloads `url` to `destination`, replacing any existing file.
    ///
    /// The body is written in fixed-size chunks and the final on-disk size is
    /// checked against the declared `Content-Length`.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::HttpStatus`], [`DownloadError::Network`] or
    ///   [`DownloadError::Timeout`] when the transfer fails
    /// - [`DownloadError::Io`] when the file cannot be written
    /// - [`DownloadError::SizeMismatch`] when the file size differs from the
    ///   declared length, including a body that ends early; the file is left
    ///   in place and must not be installed
    #[instrument(skip(self, observer), fields(url = %url, dest = %destination.display()))]
    pub async fn fetch(
        &self,
        url: &Url,
        destination: &Path,
        observer: &dyn FetchObserver,
    ) -> Result<FetchedArchive, DownloadError> {
        let response = self.client.get(url.as_str()).await?;

        let declared_bytes = declared_length(&response);
        let last_modified = last_modified(&response);
        debug!(headers = ?response.headers(), "archive response headers");
        match declared_bytes {
            Some(bytes) => info!(
                bytes,
                megabytes = %format!("{:.2}", bytes as f64 / (1024.0 * 1024.0)),
                "retrieving archive"
            ),
            None => warn!("server did not declare a Content-Length; size cannot be verified"),
        }

        observer.on_start(declared_bytes);
        let url_str = url.as_str();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| DownloadError::network(url_str, e)));
        let bytes_written =
            store_stream(body, declared_bytes, destination, self.chunk_size, observer).await?;

        info!(bytes = bytes_written, path = %destination.display(), "archive downloaded");

        Ok(FetchedArchive {
            path: destination.to_path_buf(),
            bytes_written,
            declared_bytes,
            last_modified,
        })
    }
}

/// Writes a body stream to `destination` in `chunk_size` chunks, then verifies
/// the on-disk size against `declared_bytes`.
///
/// Bytes received before a body error are still flushed. When a length was
/// declared and the file falls short of it, the error is reported as
/// [`DownloadError::SizeMismatch`]; otherwise the body error is returned.
pub(crate) async fn store_stream<S, B>(
    body: S,
    declared_bytes: Option<u64>,
    destination: &Path,
    chunk_size: usize,
    observer: &dyn FetchObserver,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>>,
    B: AsRef<[u8]>,
{
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }

    let mut file = File::create(destination)
        .await
        .map_err(|e| DownloadError::io(destination, e))?;
    let (bytes_written, interrupted) =
        write_chunked(body, &mut file, destination, chunk_size, observer).await?;
    drop(file);

    let on_disk = tokio::fs::metadata(destination)
        .await
        .map_err(|e| DownloadError::io(destination, e))?
        .len();

    if let Some(error) = interrupted {
        // A body cut short of its declared length is a truncated archive.
        return match declared_bytes {
            Some(expected) if expected != on_disk => {
                warn!(
                    path = %destination.display(),
                    expected,
                    actual = on_disk,
                    error = %error,
                    "archive body ended before the declared length"
                );
                Err(DownloadError::size_mismatch(destination, expected, on_disk))
            }
            _ => Err(error),
        };
    }
    observer.on_finish(bytes_written);

    if let Some(expected) = declared_bytes
        && expected != on_disk
    {
        warn!(
            path = %destination.display(),
            expected,
            actual = on_disk,
            "downloaded archive size differs from declared length"
        );
        return Err(DownloadError::size_mismatch(destination, expected, on_disk));
    }

    Ok(bytes_written)
}

async fn write_chunked<S, B>(
    body: S,
    file: &mut File,
    path: &Path,
    chunk_size: usize,
    observer: &dyn FetchObserver,
) -> Result<(u64, Option<DownloadError>), DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>>,
    B: AsRef<[u8]>,
{
    let chunk_size = chunk_size.max(1);
    let mut body = std::pin::pin!(body);
    let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
    let mut bytes_written: u64 = 0;
    let mut interrupted = None;

    while let Some(piece) = body.next().await {
        let piece = match piece {
            Ok(piece) => piece,
            Err(e) => {
                interrupted = Some(e);
                break;
            }
        };
        let mut remaining = piece.as_ref();
        while !remaining.is_empty() {
            let take = (chunk_size - buffer.len()).min(remaining.len());
            buffer.extend_from_slice(&remaining[..take]);
            remaining = &remaining[take..];
            if buffer.len() == chunk_size {
                bytes_written += flush_chunk(file, &mut buffer, path).await?;
                observer.on_progress(bytes_written);
            }
        }
    }

    if !buffer.is_empty() {
        bytes_written += flush_chunk(file, &mut buffer, path).await?;
        observer.on_progress(bytes_written);
    }

    file.sync_all()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok((bytes_written, interrupted))
}

async fn flush_chunk(file: &mut File, buffer: &mut Vec<u8>, path: &Path) -> Result<u64, DownloadError> {
    file.write_all(buffer)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    let len = buffer.len() as u64;
    buffer.clear();
    Ok(len)
}

fn declared_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| response.content_length())
}

fn last_modified(response: &reqwest::Response) -> Option<SystemTime> {
    let raw = response.headers().get(LAST_MODIFIED)?.to_str().ok()?;
    match httpdate::parse_http_date(raw) {
        Ok(stamp) => Some(stamp),
        Err(e) => {
            warn!(value = %raw, error = %e, "ignoring malformed Last-Modified header");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::download::progress::NoProgress;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use futures_util::stream;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[derive(Default)]
    struct Recorder {
        started: Mutex<Option<Option<u64>>>,
        progress: Mutex<Vec<u64>>,
        finished: Mutex<Option<u64>>,
    }

    impl FetchObserver for Recorder {
        fn on_start(&self, declared_bytes: Option<u64>) {
            *self.started.lock().unwrap() = Some(declared_bytes);
        }
        fn on_progress(&self, bytes_written: u64) {
            self.progress.lock().unwrap().push(bytes_written);
        }
        fn on_finish(&self, bytes_written: u64) {
            *self.finished.lock().unwrap() = Some(bytes_written);
        }
    }

    fn body(pieces: Vec<&'static [u8]>) -> impl Stream<Item = Result<&'static [u8], DownloadError>> {
        stream::iter(pieces.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn test_store_stream_writes_fixed_size_chunks() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("ensdf.zip.part");
        let recorder = Recorder::default();

        let written = store_stream(
            body(vec![&b"abcde"[..], &b"fgh"[..], &b"ij"[..]]),
            Some(10),
            &dest,
            4,
            &recorder,
        )
        .await
        .unwrap();

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"abcdefghij");
        assert_eq!(*recorder.progress.lock().unwrap(), vec![4, 8, 10]);
        assert_eq!(*recorder.finished.lock().unwrap(), Some(10));
    }

    #[tokio::test]
    async fn test_store_stream_short_body_is_size_mismatch() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("ensdf.zip.part");

        let result = store_stream(body(vec![&b"abcdef"[..]]), Some(10), &dest, 4, &NoProgress).await;

        match result {
            Err(DownloadError::SizeMismatch {
                expected_bytes,
                actual_bytes,
                path,
            }) => {
                assert_eq!(expected_bytes, 10);
                assert_eq!(actual_bytes, 6);
                assert_eq!(path, dest);
            }
            other => panic!("Expected SizeMismatch, got: {other:?}"),
        }
        // The partial file stays in place for the caller to discard.
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_store_stream_without_declared_length_skips_check() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nested").join("ensdf.zip.part");

        let written = store_stream(body(vec![&b"xyz"[..]]), None, &dest, 1024, &NoProgress)
            .await
            .unwrap();
        assert_eq!(written, 3);
    }

    #[tokio::test]
    async fn test_store_stream_propagates_body_error() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("ensdf.zip.part");
        let pieces: Vec<Result<&'static [u8], DownloadError>> = vec![
            Ok(&b"abc"[..]),
            Err(DownloadError::timeout("https://example.org/ensdf_250804.zip")),
        ];

        let result = store_stream(stream::iter(pieces), None, &dest, 2, &NoProgress).await;
        assert!(matches!(result, Err(DownloadError::Timeout { .. })));
        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_store_stream_interrupted_body_is_size_mismatch() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("ensdf.zip.part");
        let recorder = Recorder::default();
        let pieces: Vec<Result<&'static [u8], DownloadError>> = vec![
            Ok(&b"abcde"[..]),
            Err(DownloadError::timeout("https://example.org/ensdf_250804.zip")),
        ];

        let result = store_stream(stream::iter(pieces), Some(10), &dest, 1024, &recorder).await;

        match result {
            Err(DownloadError::SizeMismatch {
                expected_bytes,
                actual_bytes,
                ..
            }) => {
                assert_eq!(expected_bytes, 10);
                assert_eq!(actual_bytes, 5);
            }
            other => panic!("Expected SizeMismatch, got: {other:?}"),
        }
        // Buffered bytes reach the disk even though the chunk never filled.
        assert_eq!(std::fs::read(&dest).unwrap(), b"abcde");
        assert_eq!(*recorder.finished.lock().unwrap(), None);
    }

    /// Serves one response that declares `declared` bytes but sends only `body`.
    async fn serve_truncated_once(declared: u64, body: &'static [u8]) -> Option<String> {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        if crate::test_support::socket_guard::should_skip_socket_bound_test() {
            return None;
        }
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Some(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_fetch_truncated_body_is_size_mismatch() {
        let Some(base) = serve_truncated_once(100, b"0123456789").await else {
            return;
        };
        let temp = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(HttpClient::for_archives(HttpTimeouts::ARCHIVE), 4);
        let url = Url::parse(&format!("{base}/ensdf_250810.zip")).unwrap();
        let dest = temp.path().join("ensdf.zip.part");

        let result = fetcher.fetch(&url, &dest, &NoProgress).await;

        match result {
            Err(DownloadError::SizeMismatch {
                expected_bytes,
                actual_bytes,
                path,
            }) => {
                assert_eq!(expected_bytes, 100);
                assert_eq!(actual_bytes, 10);
                assert_eq!(path, dest);
            }
            other => panic!("Expected SizeMismatch, got: {other:?}"),
        }
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_fetch_captures_last_modified_and_length() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp = TempDir::new().unwrap();
        let content = vec![7_u8; 3000];

        Mock::given(method("GET"))
            .and(path("/distributions/dist25/ensdf_250810.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified", "Sun, 10 Aug 2025 14:02:11 GMT")
                    .set_body_bytes(content.clone()),
            )
            .mount(&mock_server)
            .await;

        let fetcher = ArchiveFetcher::new(HttpClient::for_archives(HttpTimeouts::ARCHIVE), 1024);
        let url = Url::parse(&format!(
            "{}/distributions/dist25/ensdf_250810.zip",
            mock_server.uri()
        ))
        .unwrap();
        let dest = temp.path().join("ensdf.zip.part");
        let recorder = Recorder::default();

        let fetched = fetcher.fetch(&url, &dest, &recorder).await.unwrap();

        assert_eq!(fetched.bytes_written, 3000);
        assert_eq!(fetched.declared_bytes, Some(3000));
        assert_eq!(
            fetched.last_modified,
            Some(httpdate::parse_http_date("Sun, 10 Aug 2025 14:02:11 GMT").unwrap())
        );
        assert_eq!(*recorder.started.lock().unwrap(), Some(Some(3000)));
        assert_eq!(*recorder.progress.lock().unwrap(), vec![1024, 2048, 3000]);
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[tokio::test]
    async fn test_fetch_missing_last_modified_is_none() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/a.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
            .mount(&mock_server)
            .await;

        let fetcher = ArchiveFetcher::with_timeouts(HttpTimeouts::ARCHIVE);
        let url = Url::parse(&format!("{}/a.zip", mock_server.uri())).unwrap();
        let fetched = fetcher
            .fetch(&url, &temp.path().join("a.zip"), &NoProgress)
            .await
            .unwrap();
        assert_eq!(fetched.last_modified, None);
        assert_eq!(fetched.bytes_written, 3);
    }

    #[tokio::test]
    async fn test_fetch_error_status_writes_nothing() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = ArchiveFetcher::with_timeouts(HttpTimeouts::ARCHIVE);
        let url = Url::parse(&format!("{}/missing.zip", mock_server.uri())).unwrap();
        let dest = temp.path().join("missing.zip");
        let result = fetcher.fetch(&url, &dest, &NoProgress).await;

        assert!(matches!(result, Err(DownloadError::HttpStatus { status: 404, .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_chunk_size_minimum_is_one() {
        let fetcher = ArchiveFetcher::new(HttpClient::for_archives(HttpTimeouts::ARCHIVE), 0);
        assert_eq!(fetcher.chunk_size(), 1);
    }
}
