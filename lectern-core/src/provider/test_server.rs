//! Loopback HTTP responder for adapter tests.
//!
//! Serves exactly one canned response on `127.0.0.1` and hands back the
//! request it received, so adapters can be exercised end to end without
//! leaving the machine.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// The request the responder received.
#[derive(Debug)]
pub(crate) struct CapturedRequest {
    /// Request line and headers, without the terminating blank line.
    pub(crate) head: String,
    /// Raw request body.
    pub(crate) body: String,
}

impl CapturedRequest {
    /// Value of the named header (case-insensitive).
    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    /// Body parsed as JSON.
    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Handle to a running one-shot responder.
pub(crate) struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:41234/v1/chat`.
    pub(crate) url: String,
    request: oneshot::Receiver<CapturedRequest>,
}

impl TestServer {
    /// Wait for the request the responder captured.
    pub(crate) async fn request(self) -> CapturedRequest {
        self.request.await.unwrap()
    }
}

/// Client that never routes loopback traffic through a proxy.
pub(crate) fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Start a responder that answers one request with `status` and `body`.
///
/// `status` is the status-line tail, e.g. `"429 Too Many Requests"`.
pub(crate) async fn serve_once(status: &str, body: &str) -> TestServer {
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    serve_raw(response).await
}

/// Start a responder that writes `response` verbatim and closes.
///
/// Lets a test send a malformed response, such as a body shorter than its
/// `content-length`.
pub(crate) async fn serve_raw(response: String) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;

        socket.write_all(response.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        let _ = socket.shutdown().await;

        let _ = tx.send(captured);
    });

    TestServer {
        url: format!("http://{addr}/v1/chat"),
        request: rx,
    }
}

/// Start a responder that reads one request and never answers.
///
/// The connection stays open until the client gives up.
pub(crate) async fn serve_silent() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;
        let _ = tx.send(captured);

        let mut chunk = [0u8; 1024];
        while let Ok(n) = socket.read(&mut chunk).await {
            if n == 0 {
                break;
            }
        }
    });

    TestServer {
        url: format!("http://{addr}/v1/chat"),
        request: rx,
    }
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[body_start..]).to_string();

    CapturedRequest { head, body }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
