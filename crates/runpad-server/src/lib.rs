//! Runpad snippet runner server.
//!
//! Exposes the session controller to a browser front end over WebSocket
//! and forwards runs to the remote execution service.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Backend**: HTTP client for the execution service
//! - **Protocol**: Defines client/server message types
//! - **Routes**: HTTP and WebSocket handlers
//! - **Snippets**: Saved code and file export

pub mod backend;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod snippets;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use runpad_core::ExecutionController;

pub use backend::{BackendConfig, HttpBackend};
pub use error::{ServerError, ServerResult};
pub use protocol::{ClientMessage, ServerMessage};
pub use routes::{AppState, create_router};
pub use snippets::SnippetStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Execution service settings.
    pub backend: BackendConfig,
    /// Directory for saved and exported code. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend: BackendConfig::default(),
            data_dir: None,
        }
    }
}

/// Start the Runpad server.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let backend = HttpBackend::new(&config.backend)?;
    tracing::info!("Execution service: {}", backend.url());

    let data_dir = config
        .data_dir
        .clone()
        .unwrap_or_else(snippets::default_data_dir);
    let snippets = SnippetStore::open(&data_dir)?;

    let state = Arc::new(AppState {
        controller: ExecutionController::new(Arc::new(backend)),
        snippets,
    });

    let app = create_router(state);

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::Io {
            path: PathBuf::new(),
            message: format!("Invalid address: {}:{}", config.host, config.port),
        })?;

    tracing::info!("Starting Runpad server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Handle Ctrl+C for graceful shutdown
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
