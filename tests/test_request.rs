use std::collections::HashMap;
use warden::http::request::{Method, Request, RequestBuilder};

fn request(version: &str, connection: Option<&str>) -> Request {
    let mut headers = HashMap::new();
    if let Some(value) = connection {
        headers.insert("Connection".to_string(), value.to_string());
    }

    Request {
        method: Method::GET,
        path: "/".to_string(),
        version: version.to_string(),
        headers,
        body: vec![],
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("host"), None);
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_keep_alive_http11_default() {
    assert!(request("HTTP/1.1", None).keep_alive());
}

#[test]
fn test_request_keep_alive_http11_close() {
    assert!(!request("HTTP/1.1", Some("close")).keep_alive());
    assert!(!request("HTTP/1.1", Some("Close")).keep_alive());
}

#[test]
fn test_request_keep_alive_http10_default_closes() {
    assert!(!request("HTTP/1.0", None).keep_alive());
}

#[test]
fn test_request_keep_alive_http10_explicit() {
    assert!(request("HTTP/1.0", Some("keep-alive")).keep_alive());
    assert!(request("HTTP/1.0", Some("Keep-Alive")).keep_alive());
}

#[test]
fn test_request_keep_alive_unknown_version_closes() {
    assert!(!request("HTTP/0.9", Some("keep-alive")).keep_alive());
}

#[test]
fn test_request_method_from_token() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(Method::from_token("get"), Method::Other("get".to_string())); // Case-sensitive
    assert_eq!(Method::from_token("TRACE").to_string(), "TRACE");
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());

    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/")
        .body(b"{}".to_vec())
        .build()
        .unwrap();
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.body, b"{}".to_vec());
}
