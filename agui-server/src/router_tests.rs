//! Tests for the router builder.

use std::sync::Arc;

use agui_core::test_utils::MockRunner;
use agui_core::{AdapterConfig, AguiAdapter, Orchestrator, SessionManager, ThreadStateStore};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::error::BuildError;
use crate::router::AguiRouter;

fn orchestrator() -> Orchestrator {
    let adapter = AguiAdapter::new(
        Arc::new(MockRunner::new().with_text("hi").with_final()),
        SessionManager::in_memory(),
        AdapterConfig::default(),
    );
    Orchestrator::new(Arc::new(adapter), Arc::new(ThreadStateStore::new()))
}

#[test]
fn test_build_without_endpoints_fails() {
    let result = AguiRouter::new(orchestrator()).build();
    assert_eq!(result.err(), Some(BuildError::NoEndpoints));
}

#[test]
fn test_health_alone_is_not_an_endpoint() {
    let result = AguiRouter::new(orchestrator()).with_health("/health").build();
    assert_eq!(result.err(), Some(BuildError::NoEndpoints));
}

#[test]
fn test_path_without_slash_rejected() {
    let result = AguiRouter::new(orchestrator()).with_sse("sse").build();
    assert_eq!(result.err(), Some(BuildError::InvalidPath("sse".to_string())));
}

#[test]
fn test_duplicate_path_rejected() {
    let result = AguiRouter::new(orchestrator())
        .with_sse("/stream")
        .with_health("/stream")
        .build();
    assert_eq!(
        result.err(),
        Some(BuildError::DuplicatePath("/stream".to_string()))
    );
}

#[test]
fn test_default_routes_build() {
    assert!(AguiRouter::new(orchestrator())
        .with_default_routes()
        .build()
        .is_ok());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = AguiRouter::new(orchestrator())
        .with_default_routes()
        .build()
        .unwrap();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_get_on_stream_endpoint_is_405() {
    let app = AguiRouter::new(orchestrator()).with_sse("/sse").build().unwrap();

    let response = app
        .oneshot(Request::get("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_plain_options_is_200() {
    let app = AguiRouter::new(orchestrator()).with_sse("/sse").build().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/sse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = AguiRouter::new(orchestrator()).with_sse("/sse").build().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/sse")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "POST")
                .header("Access-Control-Request-Headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_cors_can_be_disabled() {
    let app = AguiRouter::new(orchestrator())
        .with_sse("/sse")
        .with_cors(false)
        .build()
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/sse")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
