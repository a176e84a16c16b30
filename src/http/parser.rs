use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("request line must have exactly three parts")]
    InvalidRequestLine,
    #[error("header line without \": \" separator")]
    InvalidHeader,
}

/// Parses one read's worth of bytes into a request.
///
/// The head ends at the first `\r\n\r\n`; whatever follows in the same
/// buffer is the body. Without a separator the whole buffer is the head.
/// Requests are never reassembled across reads.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let (header_bytes, body_bytes) = match find_headers_end(buf) {
        Some(end) => (&buf[..end], &buf[end + 4..]),
        None => (buf, &[][..]),
    };

    let head = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = head.split("\r\n");

    // Request line: exactly METHOD SP PATH SP VERSION
    let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
    let parts: Vec<&str> = request_line.split(' ').collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(ParseError::InvalidRequestLine);
    };

    let mut headers = HashMap::new();

    for line in lines {
        let (key, value) = line.split_once(": ").ok_or(ParseError::InvalidHeader)?;
        headers.insert(key.to_string(), value.to_string());
    }

    Ok(Request {
        method: Method::from_token(method),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: body_bytes.to_vec(),
    })
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
