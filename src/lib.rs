//! Warden - concurrent HTTP/1.1 server
//!
//! Serves static files and accepts JSON uploads over persistent
//! connections, with a bounded worker pool in front.

pub mod config;
pub mod handlers;
pub mod http;
pub mod security;
pub mod server;
