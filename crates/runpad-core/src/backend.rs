//! Execution service contract.
//!
//! The backend runs code in a sandbox somewhere else. This module only
//! describes what is sent and received, and how delivery can fail.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;

/// Request sent to the execution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: Language,
    /// Standard input for the program.
    pub input: String,
}

/// Result of a program run, as reported by the execution service.
///
/// Both fields may be non-empty when the program printed something and
/// then failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
}

/// The request never reached the service or its answer never came back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Service could not be reached.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Service answered with a non-success status.
    #[error("Request failed with status code {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Something that can run code on behalf of a session.
pub trait ExecutionBackend: Send + Sync {
    /// Send one request and wait for its response.
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> BoxFuture<'_, Result<ExecutionResponse, TransportError>>;
}
