use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::handlers;
use crate::http::error::HttpError;
use crate::http::parser::parse_http_request;
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::security;

/// One client connection, driven through repeated request cycles until it
/// closes.
pub struct Connection<S = TcpStream> {
    stream: S,
    config: Arc<ServerConfig>,
    expected_host: String,
    requests_handled: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitRequest,
    Parse(Bytes),
    Validate(Request),
    Route(Request),
    Respond(ResponseWriter, bool), // bool = read another request afterwards?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<ServerConfig>) -> Self {
        let expected_host = config.expected_host();
        Self {
            stream,
            config,
            expected_host,
            requests_handled: 0,
            state: ConnectionState::AwaitRequest,
        }
    }

    pub fn requests_handled(&self) -> usize {
        self.requests_handled
    }

    /// Runs the connection to completion. The stream is shut down on every
    /// exit path.
    pub async fn run(&mut self) {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitRequest => self.await_request().await,
                ConnectionState::Parse(raw) => self.parse(&raw),
                ConnectionState::Validate(req) => self.validate(req),
                ConnectionState::Route(req) => self.route(req).await,
                ConnectionState::Respond(writer, keep_alive) => {
                    self.respond(writer, keep_alive).await
                }
                ConnectionState::Closed => break,
            };
        }

        let _ = self.stream.shutdown().await;
        tracing::debug!(requests = self.requests_handled, "Connection closed");
    }

    async fn await_request(&mut self) -> ConnectionState {
        let limits = &self.config.limits;
        let mut buf = BytesMut::zeroed(limits.read_buffer_size);

        match timeout(limits.idle_timeout(), self.stream.read(&mut buf[..])).await {
            Err(_) => {
                tracing::debug!("Connection timed out");
                ConnectionState::Closed
            }
            Ok(Ok(0)) => {
                tracing::debug!("Peer closed connection");
                ConnectionState::Closed
            }
            Ok(Ok(n)) => {
                buf.truncate(n);
                ConnectionState::Parse(buf.freeze())
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Read failed");
                ConnectionState::Closed
            }
        }
    }

    fn parse(&mut self, raw: &[u8]) -> ConnectionState {
        match parse_http_request(raw) {
            Ok(req) => {
                tracing::info!(
                    request = self.requests_handled + 1,
                    method = %req.method,
                    path = %req.path,
                    version = %req.version,
                    "Request"
                );
                ConnectionState::Validate(req)
            }
            Err(e) => self.reject(e.into()),
        }
    }

    fn validate(&mut self, req: Request) -> ConnectionState {
        match security::validate_host(&req, &self.expected_host) {
            Ok(()) => ConnectionState::Route(req),
            Err(e) => self.reject(e),
        }
    }

    async fn route(&mut self, req: Request) -> ConnectionState {
        let (response, keep_alive) = match handlers::route(&req, &self.config).await {
            Ok(response) => (response, req.keep_alive()),
            Err(e) => {
                log_failure(&e);
                (e.to_response(), false)
            }
        };

        self.requests_handled += 1;
        let read_next = keep_alive && self.requests_handled < self.config.limits.max_requests;

        tracing::info!(
            status = response.status.as_u16(),
            requests_handled = self.requests_handled,
            connection = if keep_alive { "keep-alive" } else { "close" },
            "Response"
        );

        let writer = ResponseWriter::new(&response, keep_alive, &self.config.limits);
        ConnectionState::Respond(writer, read_next)
    }

    async fn respond(&mut self, mut writer: ResponseWriter, read_next: bool) -> ConnectionState {
        if let Err(e) = writer.write_to_stream(&mut self.stream).await {
            tracing::debug!(error = %e, "Write failed");
            return ConnectionState::Closed;
        }

        if read_next {
            ConnectionState::AwaitRequest
        } else {
            ConnectionState::Closed
        }
    }

    /// Answers a failed request and closes afterwards.
    fn reject(&mut self, err: HttpError) -> ConnectionState {
        log_failure(&err);
        let writer = ResponseWriter::new(&err.to_response(), false, &self.config.limits);
        ConnectionState::Respond(writer, false)
    }
}

fn log_failure(err: &HttpError) {
    let status = err.status().as_u16();

    if let HttpError::Internal(e) = err {
        tracing::error!(status, error = ?e, "Error during request cycle");
    } else if err.is_security_violation() {
        tracing::warn!(status, error = %err, "Security violation");
    } else {
        tracing::info!(status, error = %err, "Request rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            bind_port: 9000,
            resources_dir: std::env::temp_dir().join("warden-missing-root"),
            ..ServerConfig::default()
        })
    }

    async fn exchange(request: &[u8]) -> (String, usize) {
        let (client, server) = duplex(64 * 1024);
        let mut conn = Connection::new(server, config());
        let (mut rd, mut wr) = tokio::io::split(client);

        wr.write_all(request).await.unwrap();
        conn.run().await;

        let mut out = Vec::new();
        rd.read_to_end(&mut out).await.unwrap();
        (String::from_utf8_lossy(&out).into_owned(), conn.requests_handled())
    }

    #[tokio::test]
    async fn malformed_request_gets_400_and_close() {
        let (out, handled) = exchange(b"GET /\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(out.contains("Connection: close\r\n"));
        assert_eq!(handled, 0);
    }

    #[tokio::test]
    async fn unknown_method_gets_405_even_when_keep_alive_negotiated() {
        let (out, handled) =
            exchange(b"DELETE / HTTP/1.1\r\nHost: 127.0.0.1:9000\r\nConnection: keep-alive\r\n\r\n")
                .await;
        assert!(out.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(out.contains("Connection: close\r\n"));
        assert_eq!(handled, 1);
    }

    #[tokio::test]
    async fn wrong_host_gets_403() {
        let (out, _) = exchange(b"GET / HTTP/1.1\r\nHost: 127.0.0.1:9001\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    }
}
