//! Minimal HTTP/1.1 server for tests, one thread per connection.
//!
//! Routes:
//! - `/pages/<name>`: 200 with `page_body(name)`
//! - `/status/<code>`: that status with an empty body
//! - `/slow/<name>`: 200 after `SLOW_RESPONSE_DELAY`, longer than the test timeout

use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};

use crate::fetcher::HttpFetcherOptions;

const SLOW_RESPONSE_DELAY: Duration = Duration::from_secs(3);

pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start serving in a background thread; runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let addr = listener.local_addr().expect("test server address");
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                thread::spawn(move || handle(stream));
            }
        });
        Self { addr }
    }

    /// Client options matching the server: short timeout, no proxy
    pub fn fetcher_options() -> HttpFetcherOptions {
        HttpFetcherOptions {
            timeout_secs: 1,
            no_proxy: true,
        }
    }

    /// Body served for `/pages/<name>`, including bytes that are not valid UTF-8
    pub fn page_body(name: &str) -> Vec<u8> {
        let mut body = format!("<html><body>{name}</body></html>\n").into_bytes();
        body.extend_from_slice(&[0x00, 0xff, 0xfe, 0x80]);
        body
    }

    pub fn page_url(&self, name: &str) -> String {
        format!("http://{}/pages/{name}", self.addr)
    }

    pub fn status_url(&self, status: u16) -> String {
        format!("http://{}/status/{status}", self.addr)
    }

    pub fn slow_url(&self, name: &str) -> String {
        format!("http://{}/slow/{name}", self.addr)
    }
}

/// URL on a port nothing listens on
pub fn closed_port_url(name: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}/pages/{name}")
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };

    let (status, body) = if let Some(name) = path.strip_prefix("/pages/") {
        (200, TestServer::page_body(name))
    } else if let Some(code) = path.strip_prefix("/status/") {
        (code.parse().unwrap_or(500), Vec::new())
    } else if let Some(name) = path.strip_prefix("/slow/") {
        thread::sleep(SLOW_RESPONSE_DELAY);
        (200, TestServer::page_body(name))
    } else {
        (404, Vec::new())
    };

    let head = format!(
        "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

/// Read the request head and return the target path
fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    parts.next().map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
