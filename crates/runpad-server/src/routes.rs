//! HTTP and WebSocket routes for Runpad server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Json},
    routing::get,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use runpad_core::{ExecutionController, SessionEvent, SessionPatch};
use tokio::sync::Mutex as TokioMutex;
use tower_http::cors::CorsLayer;

use crate::error::{ServerError, ServerResult};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::snippets::SnippetStore;

type WsSender = Arc<TokioMutex<SplitSink<WebSocket, Message>>>;

/// Application state shared across handlers.
pub struct AppState {
    /// Session controller (owns the session store).
    pub controller: ExecutionController,
    /// Saved code and exports.
    pub snippets: SnippetStore,
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/state", get(state_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Get current workspace state.
async fn state_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.workspace_view().await)
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(TokioMutex::new(sender));

    // Subscribe before sending the snapshot so no change slips between them
    let mut rx = state.controller.subscribe();

    if let Err(e) = send_message(&sender, &workspace_state(&state.controller).await).await {
        tracing::warn!("Failed to send initial state: {}", e);
        return;
    }

    // Forward session events to the client
    let sender_clone = sender.clone();
    let controller = state.controller.clone();
    let forward_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Client lagged by {} events, resending state", skipped);
                    SessionEvent::TabsChanged
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            };
            let Some(msg) = event_message(&controller, event).await else {
                continue;
            };
            if let Err(e) = send_message(&sender_clone, &msg).await {
                tracing::debug!("Stopping event forwarding: {}", e);
                break;
            }
        }
    });

    // Handle incoming client messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(reply) = handle_client_message(msg, &state).await {
                        if let Err(e) = send_message(&sender, &reply).await {
                            tracing::warn!("Failed to send reply: {}", e);
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse client message: {} (input: {})", e, text);
                    let reply = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    if let Err(e) = send_message(&sender, &reply).await {
                        tracing::warn!("Failed to send error reply: {}", e);
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    forward_task.abort();
}

/// Encode a server message as a WebSocket text frame.
fn encode(msg: &ServerMessage) -> ServerResult<Message> {
    Ok(Message::Text(serde_json::to_string(msg)?.into()))
}

/// Send a server message through the WebSocket.
async fn send_message(sender: &WsSender, msg: &ServerMessage) -> ServerResult<()> {
    let frame = encode(msg)?;
    let mut sender = sender.lock().await;
    sender
        .send(frame)
        .await
        .map_err(|e| ServerError::WebSocket(e.to_string()))
}

async fn workspace_state(controller: &ExecutionController) -> ServerMessage {
    ServerMessage::WorkspaceState {
        workspace: controller.workspace_view().await,
    }
}

/// Translate a session event into the message a client needs.
async fn event_message(controller: &ExecutionController, event: SessionEvent) -> Option<ServerMessage> {
    match event {
        SessionEvent::TabsChanged => Some(workspace_state(controller).await),
        SessionEvent::Changed(id) => {
            let active = controller.store().read().await.active_id();
            if id == active {
                Some(workspace_state(controller).await)
            } else {
                controller
                    .terminal_view(id)
                    .await
                    .map(|terminal| ServerMessage::SessionUpdated { terminal })
            }
        }
        SessionEvent::UsageError {
            session_id,
            message,
        } => Some(ServerMessage::UsageError {
            session_id,
            message,
        }),
    }
}

/// Handle a client message.
///
/// State changes reach the client through the event stream; only direct
/// replies and errors are returned here.
async fn handle_client_message(msg: ClientMessage, state: &AppState) -> Option<ServerMessage> {
    let controller = &state.controller;
    match msg {
        ClientMessage::GetState => Some(workspace_state(controller).await),

        ClientMessage::NewSession => {
            controller.create_session().await;
            None
        }

        ClientMessage::CloseSession { session_id } => {
            controller.close_session(session_id).await;
            None
        }

        ClientMessage::SelectSession { session_id } => {
            controller.set_active(session_id).await;
            None
        }

        ClientMessage::RenameSession { name } => {
            controller.update_active(SessionPatch::name(name)).await;
            None
        }

        ClientMessage::EditCode { code } => {
            controller.update_active(SessionPatch::code(code)).await;
            None
        }

        ClientMessage::SetLanguage { language } => {
            controller.update_active(SessionPatch::language(language)).await;
            None
        }

        ClientMessage::ToggleTheme => {
            let theme = controller.store().read().await.active().theme.toggle();
            controller.update_active(SessionPatch::theme(theme)).await;
            None
        }

        ClientMessage::SetInput { input } => {
            controller.update_active(SessionPatch::input(input)).await;
            None
        }

        ClientMessage::SetMinimized { minimized } => {
            controller.update_active(SessionPatch::minimized(minimized)).await;
            None
        }

        ClientMessage::Run => match controller.run().await {
            Ok(_) => None,
            // Usage errors are already broadcast as `usage_error`
            Err(e) if e.is_usage() => None,
            Err(e) => Some(error_message(ServerError::from(e))),
        },

        ClientMessage::SubmitInput => match controller.submit_input().await {
            Ok(_) => None,
            Err(e) if e.is_usage() => None,
            Err(e) => Some(error_message(ServerError::from(e))),
        },

        ClientMessage::Clear => {
            controller.clear().await;
            None
        }

        ClientMessage::SaveSnippet => {
            let code = controller.store().read().await.active().code.clone();
            match state.snippets.save(&code) {
                Ok(()) => Some(ServerMessage::SnippetSaved),
                Err(e) => Some(error_message(e)),
            }
        }

        ClientMessage::LoadSnippet => match state.snippets.load() {
            Ok(Some(code)) => {
                controller.update_active(SessionPatch::code(code)).await;
                None
            }
            Ok(None) => None,
            Err(e) => Some(error_message(e)),
        },

        ClientMessage::ExportSnippet { filename } => match export_active(state, filename).await {
            Ok(path) => Some(ServerMessage::SnippetExported { path }),
            Err(e) => Some(error_message(e)),
        },
    }
}

async fn export_active(state: &AppState, filename: Option<String>) -> ServerResult<String> {
    let (language, code) = {
        let store = state.controller.store();
        let store = store.read().await;
        let active = store.active();
        (active.language, active.code.clone())
    };
    let path = state.snippets.export(filename.as_deref(), language, &code)?;
    Ok(path.display().to_string())
}

fn error_message(e: impl std::fmt::Display) -> ServerMessage {
    ServerMessage::Error {
        message: e.to_string(),
    }
}
