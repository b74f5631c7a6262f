//! Integration tests for the HTTP routes.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use futures::future::BoxFuture;
use runpad_core::{
    ExecutionBackend, ExecutionController, ExecutionRequest, ExecutionResponse, TransportError,
    WorkspaceView,
};
use runpad_server::{AppState, SnippetStore, create_router};
use tower::ServiceExt;

struct NoopBackend;

impl ExecutionBackend for NoopBackend {
    fn execute(
        &self,
        _request: ExecutionRequest,
    ) -> BoxFuture<'_, Result<ExecutionResponse, TransportError>> {
        Box::pin(async { Ok(ExecutionResponse::default()) })
    }
}

fn router(dir: &std::path::Path) -> axum::Router {
    create_router(Arc::new(AppState {
        controller: ExecutionController::new(Arc::new(NoopBackend)),
        snippets: SnippetStore::open(dir).unwrap(),
    }))
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_state_returns_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let view: WorkspaceView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.tabs.len(), 1);
    assert_eq!(view.tabs[0].label, "Untitled");
    assert_eq!(view.editor.code, "print(input())");
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
