//! Server-Sent Events transport.
//!
//! Every event is written as one `data: <json>\n\n` frame.

use agui_core::{AguiEvent, EventSender, RunAgentInput, SendError};
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{chunk_channel, stream_body, until_disconnect};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Encode one event as an SSE frame.
pub fn frame(event: &AguiEvent) -> Result<Bytes, SendError> {
    let json = serde_json::to_string(event).map_err(|e| {
        tracing::warn!(error = %e, event_type = event.event_type(), "failed to serialize SSE event");
        SendError::Encode(e.to_string())
    })?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

/// Writes SSE frames into a response body channel.
pub struct SseSender {
    tx: mpsc::Sender<Bytes>,
}

impl SseSender {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSender for SseSender {
    async fn send_event(&mut self, event: &AguiEvent) -> Result<(), SendError> {
        let chunk = frame(event)?;
        self.tx.send(chunk).await.map_err(|_| SendError::Closed)
    }
}

/// Wrap a body in the event-stream response headers.
pub fn sse_response(body: axum::body::Body) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (headers, body).into_response()
}

/// Handle `POST` on an SSE endpoint.
///
/// The body is parsed up front so a request that is not JSON gets a 400
/// instead of an empty stream. Malformed messages are reported in-band.
pub async fn sse_handler(State(state): State<AppState>, body: Bytes) -> ServerResult<Response> {
    let input: RunAgentInput = serde_json::from_slice(&body)
        .map_err(|e| ServerError::InvalidRequest(format!("malformed request body: {}", e)))?;

    let (tx, rx) = chunk_channel();
    let orchestrator = state.orchestrator.clone();
    let cancel = state.request_token();

    tokio::spawn(async move {
        let body = tx.clone();
        let mut sender = SseSender::new(tx);
        let run = orchestrator.handle(input, &mut sender, cancel.clone());
        let _ = until_disconnect(&body, &cancel, run).await;
    });

    Ok(sse_response(stream_body(rx)))
}

/// Answer a bare `OPTIONS` request.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Fallback for methods an endpoint does not serve.
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
