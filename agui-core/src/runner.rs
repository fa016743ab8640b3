//! The agent runner collaborator.
//!
//! The runner is the engine that turns a user message and session history
//! into model output. It is external to this crate: implement
//! [`AgentRunner`] to plug one in.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RunnerError;

/// Stream of raw runner output for one turn.
pub type RunnerStream = BoxStream<'static, Result<RunnerOutput, RunnerError>>;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Runner-internal call ID. May be empty.
    #[serde(default)]
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Call arguments, if any.
    #[serde(default)]
    pub args: Option<Value>,
}

/// The result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Runner-internal ID of the call this answers.
    #[serde(default)]
    pub id: String,
    /// Tool name.
    #[serde(default)]
    pub name: String,
    /// Response payload, if any.
    #[serde(default)]
    pub response: Option<Value>,
}

/// One part of a runner output item.
///
/// A part may carry any combination of text, a call and a response; they
/// are translated in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
    #[serde(default)]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    /// A text-only part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A function-call part.
    pub fn function_call(id: impl Into<String>, name: impl Into<String>, args: Option<Value>) -> Self {
        Self {
            function_call: Some(FunctionCall {
                id: id.into(),
                name: name.into(),
                args,
            }),
            ..Default::default()
        }
    }

    /// A function-response part.
    pub fn function_response(
        id: impl Into<String>,
        name: impl Into<String>,
        response: Option<Value>,
    ) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                id: id.into(),
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }
}

/// One raw output item from the runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerOutput {
    /// Content parts, in order.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Set on the item that completes the turn.
    #[serde(default)]
    pub is_final: bool,
}

impl RunnerOutput {
    /// An item with the given parts.
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            is_final: false,
        }
    }

    /// A single text chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Part::text(text)])
    }

    /// An empty item that only marks the end of the turn.
    pub fn final_marker() -> Self {
        Self {
            parts: Vec::new(),
            is_final: true,
        }
    }

    /// Mark this item as the final response of the turn.
    pub fn into_final(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// An agent execution engine.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Start a turn for `content` in the given session.
    ///
    /// Returns `Err` if the runner cannot start at all; failures after that
    /// are delivered as `Err` items on the stream.
    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        content: &str,
    ) -> Result<RunnerStream, RunnerError>;
}
