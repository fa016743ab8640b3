//! AG-UI protocol event types.
//!
//! The set of events is closed: these eleven variants are the only events a
//! run can produce.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::AdapterError;

/// AG-UI protocol events.
///
/// Events are serialized with a `type` field in SCREAMING_SNAKE_CASE and
/// camelCase payload fields, as the AG-UI protocol defines them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum AguiEvent {
    // ===== Lifecycle Events =====
    /// Agent run started.
    RunStarted {
        /// Thread ID for conversation continuity.
        thread_id: String,
        /// Unique run ID for this execution.
        run_id: String,
    },

    /// Agent run finished successfully.
    RunFinished {
        /// Thread ID for conversation continuity.
        thread_id: String,
        /// Unique run ID for this execution.
        run_id: String,
    },

    /// Agent run failed with an error.
    RunError {
        /// Error message describing the failure.
        message: String,
        /// Optional error code.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Run the error belongs to, when one was assigned.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<String>,
    },

    // ===== Text Message Events =====
    /// Start of a new text message.
    TextMessageStart {
        /// Unique message ID.
        message_id: String,
        /// Role of the message author.
        role: MessageRole,
    },

    /// Incremental content for a text message.
    TextMessageContent {
        /// Message ID this content belongs to.
        message_id: String,
        /// Text delta to append.
        delta: String,
    },

    /// End of a text message.
    TextMessageEnd {
        /// Message ID that is complete.
        message_id: String,
    },

    // ===== Tool Call Events =====
    /// Start of a tool call.
    ToolCallStart {
        /// Unique tool call ID.
        tool_call_id: String,
        /// Name of the tool being called.
        tool_call_name: String,
        /// Optional parent message ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<String>,
    },

    /// Tool call arguments as JSON text.
    ToolCallArgs {
        /// Tool call ID this belongs to.
        tool_call_id: String,
        /// JSON argument text.
        delta: String,
    },

    /// Result from a tool call.
    ToolCallResult {
        /// Message the result is attached to.
        message_id: String,
        /// Tool call ID this result is for.
        tool_call_id: String,
        /// Result content (JSON text).
        content: String,
        /// Role (typically Tool).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<MessageRole>,
    },

    /// End of a tool call.
    ToolCallEnd {
        /// Tool call ID that is complete.
        tool_call_id: String,
    },

    // ===== State Management Events =====
    /// Complete state snapshot for the thread.
    StateSnapshot {
        /// The complete state object.
        snapshot: Value,
    },
}

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message.
    User,
    /// Assistant message.
    Assistant,
    /// System message.
    System,
    /// Developer instructions.
    Developer,
    /// Tool result message.
    Tool,
}

impl MessageRole {
    /// Parse a wire role name. Returns `None` for anything outside the closed set.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            "developer" => Some(Self::Developer),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Developer => "developer",
            Self::Tool => "tool",
        }
    }
}

/// Transport envelope for an event: a type discriminator plus an open
/// key/value payload mirroring the JSON event shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Event type tag, e.g. `TEXT_MESSAGE_CONTENT`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload, including the `type` field.
    pub data: Map<String, Value>,
}

impl AguiEvent {
    /// Build a `RUN_ERROR` event from an adapter failure.
    pub fn run_error(err: &AdapterError, run_id: Option<&str>) -> Self {
        Self::RunError {
            message: err.to_string(),
            code: Some(err.code().to_string()),
            run_id: run_id.map(str::to_string),
        }
    }

    /// The wire type tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "RUN_STARTED",
            Self::RunFinished { .. } => "RUN_FINISHED",
            Self::RunError { .. } => "RUN_ERROR",
            Self::TextMessageStart { .. } => "TEXT_MESSAGE_START",
            Self::TextMessageContent { .. } => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd { .. } => "TEXT_MESSAGE_END",
            Self::ToolCallStart { .. } => "TOOL_CALL_START",
            Self::ToolCallArgs { .. } => "TOOL_CALL_ARGS",
            Self::ToolCallResult { .. } => "TOOL_CALL_RESULT",
            Self::ToolCallEnd { .. } => "TOOL_CALL_END",
            Self::StateSnapshot { .. } => "STATE_SNAPSHOT",
        }
    }

    /// True for the events that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunFinished { .. } | Self::RunError { .. })
    }

    /// Build the transport envelope directly from the variant's fields.
    pub fn to_wire(&self) -> WireEvent {
        let payload = match self {
            Self::RunStarted { thread_id, run_id } | Self::RunFinished { thread_id, run_id } => {
                json!({ "threadId": thread_id, "runId": run_id })
            }
            Self::RunError {
                message,
                code,
                run_id,
            } => {
                let mut v = json!({ "message": message });
                if let Some(code) = code {
                    v["code"] = json!(code);
                }
                if let Some(run_id) = run_id {
                    v["runId"] = json!(run_id);
                }
                v
            }
            Self::TextMessageStart { message_id, role } => {
                json!({ "messageId": message_id, "role": role.as_str() })
            }
            Self::TextMessageContent { message_id, delta } => {
                json!({ "messageId": message_id, "delta": delta })
            }
            Self::TextMessageEnd { message_id } => json!({ "messageId": message_id }),
            Self::ToolCallStart {
                tool_call_id,
                tool_call_name,
                parent_message_id,
            } => {
                let mut v = json!({ "toolCallId": tool_call_id, "toolCallName": tool_call_name });
                if let Some(parent) = parent_message_id {
                    v["parentMessageId"] = json!(parent);
                }
                v
            }
            Self::ToolCallArgs {
                tool_call_id,
                delta,
            } => json!({ "toolCallId": tool_call_id, "delta": delta }),
            Self::ToolCallResult {
                message_id,
                tool_call_id,
                content,
                role,
            } => {
                let mut v = json!({
                    "messageId": message_id,
                    "toolCallId": tool_call_id,
                    "content": content,
                });
                if let Some(role) = role {
                    v["role"] = json!(role.as_str());
                }
                v
            }
            Self::ToolCallEnd { tool_call_id } => json!({ "toolCallId": tool_call_id }),
            Self::StateSnapshot { snapshot } => json!({ "snapshot": snapshot }),
        };

        let mut data = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        data.insert("type".to_string(), json!(self.event_type()));

        WireEvent {
            event_type: self.event_type().to_string(),
            data,
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
