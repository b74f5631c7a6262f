//! Error types for Runpad server.

use std::path::PathBuf;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Runpad core error.
    #[error("Core error: {0}")]
    Core(#[from] runpad_core::Error),

    /// HTTP client error.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Export file name rejected.
    #[error("Invalid file name: {0}")]
    InvalidFilename(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl ServerError {
    pub(crate) fn io(path: impl Into<PathBuf>, e: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
