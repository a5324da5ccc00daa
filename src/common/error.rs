//! Error types for minigfs

use crate::common::chunk::ChunkHandle;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Chunk not found: {0}")]
    ChunkNotFound(ChunkHandle),

    // === Namespace Errors ===
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    // === Placement Errors ===
    #[error("No available servers")]
    NoServersAvailable,

    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParam(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // === Network Errors ===
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Transport failures and unexpected statuses are worth another attempt;
    /// errors the peer raised on purpose are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Http(_))
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::FileNotFound(_) | Error::ChunkNotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::NoServersAvailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::MissingParam(_) | Error::BadRequest(_) | Error::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Transport(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.to_http_status(), self.to_string()).into_response()
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            Error::FileNotFound("a".into()).to_http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::ChunkNotFound(ChunkHandle::from_seq(1)).to_http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::AlreadyExists("a".into()).to_http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::NoServersAvailable.to_http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::MissingParam("file").to_http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_retryable() {
        assert!(Error::Http("status 500".into()).is_retryable());
        assert!(!Error::NoServersAvailable.is_retryable());
        assert!(!Error::AlreadyExists("a".into()).is_retryable());
        assert!(!Error::BadRequest("missing server".into()).is_retryable());
    }
}
