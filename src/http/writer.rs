use std::time::SystemTime;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::Limits;
use crate::http::response::{Response, set_header};

const HTTP_VERSION: &str = "HTTP/1.1";

pub const SERVER_NAME: &str = concat!("Warden/", env!("CARGO_PKG_VERSION"));

/// Serializes a response to wire format.
///
/// Handler headers go first, then `Date`, `Server`, `Content-Length` and
/// `Connection`, plus `Keep-Alive` when the connection stays open.
/// `Content-Length` always reflects the real body length, overriding any
/// value a handler may have set.
pub fn serialize_response(resp: &Response, keep_alive: bool, limits: &Limits) -> Vec<u8> {
    let mut headers = resp.headers.clone();

    set_header(
        &mut headers,
        "Date".to_string(),
        httpdate::fmt_http_date(SystemTime::now()),
    );
    set_header(&mut headers, "Server".to_string(), SERVER_NAME.to_string());
    set_header(
        &mut headers,
        "Content-Length".to_string(),
        resp.body.len().to_string(),
    );

    if keep_alive {
        set_header(&mut headers, "Connection".to_string(), "keep-alive".to_string());
        set_header(
            &mut headers,
            "Keep-Alive".to_string(),
            format!(
                "timeout={}, max={}",
                limits.idle_timeout_secs, limits.max_requests
            ),
        );
    } else {
        set_header(&mut headers, "Connection".to_string(), "close".to_string());
    }

    let mut buf = Vec::with_capacity(256 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(&resp.body);

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, keep_alive: bool, limits: &Limits) -> Self {
        Self {
            buffer: serialize_response(response, keep_alive, limits),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
