//! Request-level failures and the status each one is answered with.

use crate::http::parser::ParseError;
use crate::http::response::{Response, StatusCode};

/// A failure detected while handling one request.
///
/// Every variant is answered with an error response and ends the
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),

    #[error("missing Host header")]
    MissingHost,

    #[error("Host header mismatch: got {0:?}")]
    HostMismatch(String),

    #[error("path escapes resources root: {0}")]
    PathTraversal(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Malformed(_) | HttpError::MissingHost | HttpError::InvalidJson(_) => {
                StatusCode::BadRequest
            }
            HttpError::HostMismatch(_) | HttpError::PathTraversal(_) => StatusCode::Forbidden,
            HttpError::NotFound(_) => StatusCode::NotFound,
            HttpError::UnsupportedMediaType => StatusCode::UnsupportedMediaType,
            HttpError::MethodNotAllowed(_) => StatusCode::MethodNotAllowed,
            HttpError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    /// Security violations are logged louder than ordinary client errors.
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            HttpError::MissingHost | HttpError::HostMismatch(_) | HttpError::PathTraversal(_)
        )
    }

    pub fn to_response(&self) -> Response {
        Response::error(self.status())
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal(err.into())
    }
}
