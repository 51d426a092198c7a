use http::StatusCode;
use std::io;
use thiserror::Error;

/// Per-request failures, each answered with its own status line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("malformed request line")]
    Malformed,
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("unsupported protocol version: {0}")]
    VersionNotSupported(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Malformed => StatusCode::BAD_REQUEST,
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::VersionNotSupported(_) => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::HeadTooLarge { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
        }
    }

    /// Map a failed open/stat of `target` onto a response status
    pub fn from_io(err: &io::Error, target: &str) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => RequestError::Forbidden(target.to_string()),
            _ => RequestError::NotFound(target.to_string()),
        }
    }
}
