//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 server side: one read per request, no
//! chunked encoding, no pipelining.
//!
//! # Architecture
//!
//! - **`connection`**: The per-socket request-response state machine
//! - **`parser`**: Parses one read's worth of bytes into a request
//! - **`request`**: HTTP request representation and keep-alive negotiation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: Content type lookup based on file extensions
//! - **`error`**: Request failures and their status codes
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────┐
//!   ┌──► │ AwaitRequest │ ── idle timeout / EOF ──► Closed
//!   │    └──────┬───────┘
//!   │           ▼
//!   │    ┌──────────────┐
//!   │    │    Parse     │ ── malformed ──► 400 ─┐
//!   │    └──────┬───────┘                       │
//!   │           ▼                               │
//!   │    ┌──────────────┐                       │
//!   │    │   Validate   │ ── bad Host ──► 400/403
//!   │    └──────┬───────┘                       │
//!   │           ▼                               │
//!   │    ┌──────────────┐                       │
//!   │    │    Route     │                       │
//!   │    └──────┬───────┘                       │
//!   │           ▼                               ▼
//!   │    ┌──────────────┐
//!   └─── │   Respond    │ ── close / cap reached ──► Closed
//!        └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden::config::ServerConfig;
//! use warden::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Arc::new(ServerConfig::default());
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let cfg = Arc::clone(&cfg);
//!         tokio::spawn(async move {
//!             Connection::new(socket, cfg).run().await;
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
