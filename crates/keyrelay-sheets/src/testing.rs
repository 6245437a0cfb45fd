//! Loopback HTTP server for request-level tests. Each connection carries one
//! request, answered from a fixed route table and recorded for assertions.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Throwaway 2048-bit PKCS#8 key, only ever used against [`TestServer`].
pub(crate) const TEST_KEY_PEM: &str = include_str!("../testdata/service_account_key.pem");

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: String,
    /// Path and query, exactly as sent on the request line.
    pub target: String,
    /// Header block, lowercased.
    pub headers: String,
    pub body: String,
}

/// A route answers every request whose `"METHOD /target"` starts with its prefix.
pub(crate) struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: &'static str,
}

pub(crate) struct TestServer {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let recorded = Arc::clone(&recorded);
                let routes = Arc::clone(&routes);
                tokio::spawn(async move { answer(stream, &routes, &recorded).await });
            }
        });
        Self {
            base,
            requests,
            task,
        }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer(mut stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<Recorded>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let line = format!("{} {}", request.method, request.target);
    let (status, body) = routes
        .iter()
        .find(|r| line.starts_with(r.prefix))
        .map_or((404, r#"{"error":"no route"}"#), |r| (r.status, r.body));
    recorded.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers = head.to_ascii_lowercase();
    let body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).into_owned();
    Some(Recorded {
        method,
        target,
        headers,
        body,
    })
}
