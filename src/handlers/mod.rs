//! Request routing
//!
//! GET serves files from the resources root, POST stores JSON uploads under
//! `<root>/uploads`. Every other method is refused.

pub mod static_files;
pub mod upload;

use crate::config::ServerConfig;
use crate::http::error::HttpError;
use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Dispatches a validated request to its handler.
pub async fn route(req: &Request, cfg: &ServerConfig) -> Result<Response, HttpError> {
    match req.method {
        Method::GET => static_files::serve(req, &cfg.resources_dir).await,
        Method::POST => upload::store(req, &cfg.resources_dir).await,
        ref other => Err(HttpError::MethodNotAllowed(other.to_string())),
    }
}
