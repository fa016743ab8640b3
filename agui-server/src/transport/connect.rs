//! Connect RPC transport for `agui.v1.AGUIService/RunAgent`.
//!
//! Server-streaming only. The request body is one envelope holding a
//! `RunAgentInput`; the response is one envelope per event followed by an
//! end-stream envelope. Both the binary and JSON codecs are served, chosen
//! by the request content type.

use agui_core::{AguiEvent, EventSender, RunAgentInput, SendError};
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use prost::Message as _;
use serde::Serialize;
use tokio::sync::mpsc;

use super::envelope::{self, FLAG_END_STREAM};
use super::proto;
use super::{chunk_channel, stream_body, until_disconnect};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

pub const CONTENT_TYPE_PROTO: &str = "application/connect+proto";
pub const CONTENT_TYPE_JSON: &str = "application/connect+json";

/// Message codec negotiated from the request content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Proto,
    Json,
}

impl Codec {
    /// Pick a codec for a `Content-Type` header value, ignoring parameters.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(CONTENT_TYPE_PROTO) {
            Some(Self::Proto)
        } else if essence.eq_ignore_ascii_case(CONTENT_TYPE_JSON) {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Proto => CONTENT_TYPE_PROTO,
            Self::Json => CONTENT_TYPE_JSON,
        }
    }

    /// Decode the request message.
    pub fn decode_input(self, message: &[u8]) -> Result<RunAgentInput, ConnectError> {
        match self {
            Self::Proto => proto::RunAgentInput::decode(message)
                .map(proto::RunAgentInput::into_input)
                .map_err(|e| ConnectError::invalid_argument(format!("failed to decode request: {}", e))),
            Self::Json => serde_json::from_slice(message)
                .map_err(|e| ConnectError::invalid_argument(format!("failed to decode request: {}", e))),
        }
    }

    /// Encode one event message.
    pub fn encode_event(self, event: &AguiEvent) -> Result<Vec<u8>, SendError> {
        match self {
            Self::Proto => Ok(proto::AguiEvent::from(event).encode_to_vec()),
            Self::Json => {
                serde_json::to_vec(&event.to_wire()).map_err(|e| SendError::Encode(e.to_string()))
            }
        }
    }
}

/// Connect error codes this service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Internal,
}

/// An RPC-level error, carried in the end-stream message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ConnectError {
    pub code: ErrorCode,
    pub message: String,
}

impl ConnectError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct EndStream<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ConnectError>,
}

/// The end-stream envelope: `{}` on success, `{"error": {...}}` otherwise.
pub fn end_stream_frame(error: Option<&ConnectError>) -> Bytes {
    let payload = serde_json::to_vec(&EndStream { error }).unwrap_or_else(|_| b"{}".to_vec());
    envelope::encode(FLAG_END_STREAM, &payload)
}

/// Writes enveloped event messages into a response body channel.
pub struct ConnectSender {
    tx: mpsc::Sender<Bytes>,
    codec: Codec,
}

impl ConnectSender {
    pub fn new(tx: mpsc::Sender<Bytes>, codec: Codec) -> Self {
        Self { tx, codec }
    }

    /// Close the stream with its end-stream envelope.
    pub async fn finish(self, error: Option<&ConnectError>) -> Result<(), SendError> {
        self.tx
            .send(end_stream_frame(error))
            .await
            .map_err(|_| SendError::Closed)
    }
}

#[async_trait]
impl EventSender for ConnectSender {
    async fn send_event(&mut self, event: &AguiEvent) -> Result<(), SendError> {
        let message = self.codec.encode_event(event)?;
        self.tx
            .send(envelope::encode(0, &message))
            .await
            .map_err(|_| SendError::Closed)
    }
}

/// Handle `POST` on a Connect endpoint.
///
/// Only an unknown content type fails at the HTTP level. Every other
/// problem is reported in the end-stream message.
pub async fn connect_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let codec = Codec::from_content_type(content_type)
        .ok_or_else(|| ServerError::UnsupportedMediaType(content_type.to_string()))?;

    let decoded = envelope::decode_single(&body)
        .map_err(|e| ConnectError::invalid_argument(e.to_string()))
        .and_then(|(_, message)| codec.decode_input(message));

    let (tx, rx) = chunk_channel();
    let orchestrator = state.orchestrator.clone();
    let cancel = state.request_token();

    tokio::spawn(async move {
        let body = tx.clone();
        let mut sender = ConnectSender::new(tx, codec);

        let end = match decoded {
            Ok(input) => {
                let run = orchestrator.handle(input, &mut sender, cancel.clone());
                match until_disconnect(&body, &cancel, run).await {
                    Some(Ok(_)) => None,
                    Some(Err(SendError::Encode(message))) => Some(ConnectError::internal(message)),
                    Some(Err(SendError::Closed)) | None => return,
                }
            }
            Err(err) => {
                tracing::info!(error = %err, "rejecting connect request");
                Some(err)
            }
        };

        let _ = sender.finish(end.as_ref()).await;
    });

    let mut response = stream_body(rx).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(codec.content_type()),
    );
    Ok(response)
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
