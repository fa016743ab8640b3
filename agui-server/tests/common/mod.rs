//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agui_core::test_utils::MockRunner;
use agui_core::{AdapterConfig, AguiAdapter, Orchestrator, SessionManager, ThreadStateStore};
use agui_server::AguiRouter;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use futures::StreamExt;
use serde_json::Value;

/// A router with every default route over `runner`, plus its state store.
pub fn build_app(runner: MockRunner) -> (Router, Arc<ThreadStateStore>) {
    build_app_with(runner, AdapterConfig::default())
}

pub fn build_app_with(runner: MockRunner, config: AdapterConfig) -> (Router, Arc<ThreadStateStore>) {
    let states = Arc::new(ThreadStateStore::new());
    let adapter = AguiAdapter::new(Arc::new(runner), SessionManager::in_memory(), config);
    let orchestrator = Orchestrator::new(Arc::new(adapter), states.clone());

    let app = AguiRouter::new(orchestrator)
        .with_default_routes()
        .build()
        .expect("default routes are valid");
    (app, states)
}

pub fn sse_request(path: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Body of a one-message user turn.
pub fn user_turn(thread_id: &str, text: &str) -> Value {
    serde_json::json!({
        "threadId": thread_id,
        "runId": "run-fixed",
        "messages": [{"id": "m1", "role": "user", "content": text}]
    })
}

/// Collect SSE event payloads from a response body.
pub async fn collect_sse_events(body: Body) -> Vec<Value> {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&bytes);
    text.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|json| serde_json::from_str(json).expect("every frame is valid JSON"))
        .collect()
}

/// Extract event type names from parsed events.
pub fn extract_event_types(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| e.get("type").and_then(Value::as_str).map(String::from))
        .collect()
}

/// Split a Connect response body into `(flags, message)` envelopes.
pub fn split_envelopes(bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        assert!(rest.len() >= 5, "truncated envelope header");
        let flags = rest[0];
        let len = u32::from_be_bytes([rest[1], rest[2], rest[3], rest[4]]) as usize;
        assert!(rest.len() >= 5 + len, "truncated envelope body");
        frames.push((flags, rest[5..5 + len].to_vec()));
        rest = &rest[5 + len..];
    }
    frames
}

/// Frame one request message.
pub fn envelope(message: &[u8]) -> Vec<u8> {
    let mut framed = vec![0u8];
    framed.extend_from_slice(&(message.len() as u32).to_be_bytes());
    framed.extend_from_slice(message);
    framed
}

/// Events whose non-generated fields matter for comparing transports.
pub fn normalize(events: &[Value]) -> Vec<Value> {
    events
        .iter()
        .map(|event| {
            let mut event = event.clone();
            if let Some(obj) = event.as_object_mut() {
                obj.remove("messageId");
                obj.remove("parentMessageId");
            }
            event
        })
        .collect()
}

/// Read a streaming body until `marker` has appeared, then hand the rest back.
pub async fn read_until(body: Body, marker: &str) -> axum::body::BodyDataStream {
    let mut stream = body.into_data_stream();
    let mut seen = Vec::new();
    while !String::from_utf8_lossy(&seen).contains(marker) {
        let chunk = stream
            .next()
            .await
            .expect("stream ended before marker")
            .unwrap();
        seen.extend_from_slice(&chunk);
    }
    stream
}

/// Poll `condition` every 10ms for up to two seconds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
