//! Bare TCP server whose archive responses stop short of their declared length.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::fixtures::{INDEX_PATH, archive_path, index_page};
use super::socket_guard::should_skip_socket_bound_test;

/// Serves the index page announcing `date` and, for the archive `yymmdd`,
/// headers declaring `declared` bytes followed by only `sent`.
///
/// Returns the server's base URL, or `None` when sockets are unavailable.
pub async fn serve_truncated_archive(
    date: &str,
    yymmdd: &str,
    declared: usize,
    sent: Vec<u8>,
) -> Option<String> {
    if should_skip_socket_bound_test() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let index = index_page(date);
    let archive = archive_path(yymmdd);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = vec![0_u8; 8192];
            let read = socket.read(&mut request).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&request[..read]);
            let target = request.split_whitespace().nth(1).unwrap_or_default();

            let (status, length, body): (&str, usize, &[u8]) = if target == INDEX_PATH {
                ("200 OK", index.len(), index.as_bytes())
            } else if target == archive {
                ("200 OK", declared, &sent)
            } else {
                ("404 Not Found", 0, b"")
            };
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {length}\r\nConnection: close\r\n\r\n"
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;
        }
    });
    Some(format!("http://{addr}"))
}
