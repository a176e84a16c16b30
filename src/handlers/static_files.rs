//! GET: static files from the resources root.

use std::path::Path;

use anyhow::Context;

use crate::http::error::HttpError;
use crate::http::mime::{self, Disposition};
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::security;

pub async fn serve(req: &Request, root: &Path) -> Result<Response, HttpError> {
    let path = if req.path == "/" {
        "/index.html"
    } else {
        req.path.as_str()
    };

    let file_path = security::resolve_within(root, path)?;

    let is_file = tokio::fs::metadata(&file_path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(HttpError::NotFound(path.to_string()));
    }

    let media = mime::lookup(&file_path).ok_or(HttpError::UnsupportedMediaType)?;

    let contents = tokio::fs::read(&file_path)
        .await
        .with_context(|| format!("reading {}", file_path.display()))?;

    let mut builder = ResponseBuilder::new(StatusCode::Ok).header("Content-Type", media.content_type);

    if media.disposition == Disposition::Attachment {
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        builder = builder.header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        );
    }

    tracing::debug!(file = %file_path.display(), bytes = contents.len(), "Serving file");

    Ok(builder.body(contents).build())
}
