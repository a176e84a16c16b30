//! Shared helpers for the end-to-end tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use warden::config::ServerConfig;
use warden::server::Server;

/// A throwaway resources directory, removed on drop.
pub struct TempSite {
    pub root: PathBuf,
}

impl TempSite {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("warden-site-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("docs")).unwrap();

        std::fs::write(root.join("index.html"), "<h1>Warden</h1>").unwrap();
        std::fs::write(root.join("about.html"), "<p>about</p>").unwrap();
        std::fs::write(root.join("notes.txt"), "plain notes\n").unwrap();
        std::fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
        std::fs::write(root.join("photo.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();
        std::fs::write(root.join("photo.jpeg"), [0xff, 0xd8]).unwrap();
        std::fs::write(root.join("style.css"), "body {}").unwrap();
        std::fs::write(root.join("docs").join("guide.html"), "<p>guide</p>").unwrap();

        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for TempSite {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Starts a server on an ephemeral port. Returns its address and the
/// effective configuration (with the bound port filled in).
pub async fn start_server(mut cfg: ServerConfig) -> (SocketAddr, ServerConfig) {
    cfg.bind_host = "127.0.0.1".to_string();
    cfg.bind_port = 0;

    let server = Server::bind(cfg).await.unwrap();
    let addr = server.local_addr().unwrap();
    let effective = (**server.config()).clone();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, effective)
}

pub fn site_config(site: &TempSite) -> ServerConfig {
    ServerConfig {
        worker_count: 2,
        resources_dir: site.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub header_order: Vec<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }
}

pub fn get(path: &str, host: &str) -> String {
    format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, host)
}

pub fn post_json(host: &str, body: &str) -> String {
    format!(
        "POST /upload HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        host,
        body.len(),
        body
    )
}

pub async fn send(stream: &mut TcpStream, raw: &str) {
    stream.write_all(raw.as_bytes()).await.unwrap();
}

/// Reads exactly one response: the head, then `Content-Length` body bytes.
pub async fn read_response(stream: &mut TcpStream) -> RawResponse {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before a full response head");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let mut parts = status_line.splitn(3, ' ');
    assert_eq!(parts.next(), Some("HTTP/1.1"));
    let status = parts.next().unwrap().parse().unwrap();
    let reason = parts.next().unwrap_or("").to_string();

    let mut headers = HashMap::new();
    let mut header_order = Vec::new();
    for line in lines {
        let (k, v) = line.split_once(": ").unwrap();
        header_order.push(k.to_string());
        headers.insert(k.to_string(), v.to_string());
    }

    let length: usize = headers["Content-Length"].parse().unwrap();
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(body.len(), length, "server sent more than Content-Length");

    RawResponse {
        status,
        reason,
        headers,
        header_order,
        body,
    }
}

/// True when the peer has closed: the next read yields EOF (or a reset).
pub async fn is_closed(stream: &mut TcpStream) -> bool {
    let mut byte = [0u8; 1];
    match tokio::time::timeout(std::time::Duration::from_secs(5), stream.read(&mut byte)).await {
        Ok(Ok(0)) | Ok(Err(_)) => true,
        _ => false,
    }
}
