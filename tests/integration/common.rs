//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use esql_reports::error::Result;
use esql_reports::render::ChartRenderer;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// An HTTP request as seen by [`serve_once`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// e.g. `POST /_query HTTP/1.1`
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Accepts a single connection, captures the request and answers with `body`.
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and a handle yielding the
/// captured request.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n").filter(|line| !line.is_empty());
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body =
            String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

        let response = format!(
            "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        CapturedRequest {
            request_line,
            headers,
            body: request_body,
        }
    });

    (format!("http://{addr}"), handle)
}

/// Renderer that returns a fixed SVG and keeps the specs it was given.
#[derive(Default, Clone)]
pub struct RecordingRenderer {
    pub specs: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl ChartRenderer for RecordingRenderer {
    async fn render(&self, spec: &Value) -> Result<String> {
        self.specs.lock().unwrap().push(spec.clone());
        Ok("<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string())
    }
}
