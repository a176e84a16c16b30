//! Per-request security gates: virtual-host matching and path containment.
//!
//! Both checks are pure. The path check never touches the filesystem, so a
//! traversal attempt is rejected before anything is opened or stat'ed.

use std::path::{Component, Path, PathBuf};

use crate::http::error::HttpError;
use crate::http::request::Request;

/// Requires a `Host` header equal to `expected` byte for byte.
///
/// An empty value counts as missing. No default-port omission, no case
/// folding.
pub fn validate_host(req: &Request, expected: &str) -> Result<(), HttpError> {
    match req.header("Host") {
        None => Err(HttpError::MissingHost),
        Some(host) if host.is_empty() => Err(HttpError::MissingHost),
        Some(host) if host == expected => Ok(()),
        Some(host) => Err(HttpError::HostMismatch(host.to_string())),
    }
}

/// Resolves a request path under `root`, rejecting anything that lands
/// outside it.
///
/// The result is absolute and lexically normalized. Containment is checked
/// component-wise, so `/srv/res-old` is not inside `/srv/res`.
pub fn resolve_within(root: &Path, request_path: &str) -> Result<PathBuf, HttpError> {
    let root = normalize(&std::path::absolute(root)?);
    let resolved = normalize(&root.join(request_path.trim_start_matches('/')));

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(HttpError::PathTraversal(request_path.to_string()))
    }
}

/// Folds `.` and `..` components without consulting the filesystem.
/// `..` at the filesystem root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
        }
    }

    out
}
