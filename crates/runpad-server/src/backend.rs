//! HTTP client for the remote execution service.

use std::time::Duration;

use futures::future::BoxFuture;
use runpad_core::{ExecutionBackend, ExecutionRequest, ExecutionResponse, TransportError};

use crate::error::ServerResult;

/// Default execution service endpoint.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/editor/execute/";

/// Default request timeout.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Execution service configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Endpoint receiving `POST {code, language, input}`.
    pub url: String,
    /// Upper bound for one request, including the program's run time.
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }
}

/// Execution backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> ServerResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ExecutionBackend for HttpBackend {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> BoxFuture<'_, Result<ExecutionResponse, TransportError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            response
                .json::<ExecutionResponse>()
                .await
                .map_err(transport_error)
        })
    }
}

/// Classify a reqwest failure.
fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Unreachable(e.to_string())
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else if let Some(status) = e.status() {
        TransportError::Status(status.as_u16())
    } else {
        TransportError::Other(e.to_string())
    }
}
