//! Minimal HTTP/1.1 server for integration tests.
//!
//! Each connection handles one request and is closed after the reply. The
//! reply is produced by a caller-supplied closure, so one server type covers
//! the file host (HEAD/GET, missing length, broken bodies) and the fake
//! upstream API (header checks, error statuses).

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Send `Content-Length`. When false the body is delimited by closing the connection.
    pub send_length: bool,
    /// Close the connection after this many body bytes, even though more were announced.
    pub truncate_at: Option<usize>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            send_length: true,
            truncate_at: None,
        }
    }

    pub fn json(body: &str) -> Self {
        Self::ok(body.as_bytes().to_vec()).with_header("Content-Type", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn without_length(mut self) -> Self {
        self.send_length = false;
        self
    }

    pub fn truncated_at(mut self, n: usize) -> Self {
        self.truncate_at = Some(n);
        self
    }
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Starts a server in a background thread. The handler gets the request and
/// the 0-based index of this request. Runs until the process exits.
pub fn start<F>(handler: F) -> TestServer
where
    F: Fn(&Request, usize) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let handler = Arc::new(handler);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let handler = Arc::clone(&handler);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                if let Some(req) = read_request(&stream) {
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    let reply = handler(&req, index);
                    write_reply(stream, &req, &reply);
                }
            });
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

/// A server that always answers with a clone of `reply`.
pub fn start_static(reply: Reply) -> TestServer {
    start(move |_, _| reply.clone())
}

fn read_request(mut stream: &TcpStream) -> Option<Request> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    let text = String::from_utf8_lossy(&data);
    let mut lines = text.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    Some(Request {
        method,
        path,
        headers,
    })
}

fn write_reply(mut stream: TcpStream, req: &Request, reply: &Reply) {
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut head = format!("HTTP/1.1 {} {}\r\n", reply.status, reason(reply.status));
    for (k, v) in &reply.headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    if reply.send_length {
        head.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    if req.method.eq_ignore_ascii_case("HEAD") {
        return;
    }
    let end = reply
        .truncate_at
        .unwrap_or(reply.body.len())
        .min(reply.body.len());
    // Two writes so clients see more than one chunk.
    let mid = end / 2;
    let _ = stream.write_all(&reply.body[..mid]);
    let _ = stream.flush();
    let _ = stream.write_all(&reply.body[mid..end]);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
