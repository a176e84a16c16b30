//! POST: JSON uploads persisted under `<root>/uploads`.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::http::error::HttpError;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

pub const UPLOAD_DIR: &str = "uploads";

/// Body of a successful upload response.
#[derive(Debug, Serialize)]
struct UploadReceipt {
    status: &'static str,
    message: &'static str,
    filepath: String,
}

pub async fn store(req: &Request, root: &Path) -> Result<Response, HttpError> {
    if req.header("Content-Type") != Some("application/json") {
        return Err(HttpError::UnsupportedMediaType);
    }

    let document: serde_json::Value = serde_json::from_slice(&req.body)?;

    let dir = root.join(UPLOAD_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let name = upload_file_name();
    let target = dir.join(&name);

    // create_new: a name clash fails instead of clobbering another upload
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .await
        .with_context(|| format!("creating {}", target.display()))?;
    file.write_all(&to_pretty_json(&document)?).await?;
    file.flush().await?;

    tracing::info!(file = %name, "Stored upload");

    let receipt = UploadReceipt {
        status: "success",
        message: "File created successfully",
        filepath: format!("/{}/{}", UPLOAD_DIR, name),
    };
    let body = serde_json::to_vec(&receipt).context("encoding upload receipt")?;

    Ok(ResponseBuilder::new(StatusCode::Created)
        .header("Content-Type", "application/json")
        .body(body)
        .build())
}

/// `upload_<unix seconds>_<uuid>.json`
fn upload_file_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("upload_{}_{}.json", secs, Uuid::new_v4().simple())
}

/// Pretty-prints with a four-space indent.
fn to_pretty_json(value: &serde_json::Value) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .context("encoding upload")?;
    Ok(out)
}
