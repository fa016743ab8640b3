//! Conversion from raw runner output to AG-UI events.

use std::collections::HashMap;

use serde_json::Value;

use super::events::{AguiEvent, MessageRole};
use super::ids;
use super::runner::{FunctionCall, FunctionResponse, RunnerOutput};

/// Content sent when a run produced no text at all.
pub const NO_RESPONSE_FALLBACK: &str =
    "I received your message, but couldn't generate a response.";

/// Context for converting runner output to AG-UI events.
///
/// Owned by exactly one run. Tracks the accumulated response text, the
/// mapping from runner call IDs to protocol tool call IDs, and which tool
/// calls are still open.
pub struct TranslationContext {
    /// Message the run's text and tool results belong to.
    pub message_id: String,
    response: String,
    content_events: usize,
    /// Runner call ID -> protocol tool call ID.
    tool_calls: HashMap<String, String>,
    /// Started but not yet ended, in start order.
    open_tool_calls: Vec<String>,
}

impl TranslationContext {
    /// Create a new translation context.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            response: String::new(),
            content_events: 0,
            tool_calls: HashMap::new(),
            open_tool_calls: Vec::new(),
        }
    }

    /// Text accumulated so far.
    pub fn response_text(&self) -> &str {
        &self.response
    }

    /// True once at least one `TEXT_MESSAGE_CONTENT` has been produced.
    pub fn has_content(&self) -> bool {
        self.content_events > 0
    }

    /// Protocol IDs of tool calls that were started but not ended.
    pub fn open_tool_calls(&self) -> &[String] {
        &self.open_tool_calls
    }

    /// The fallback content event, if the run produced no text.
    pub fn fallback_content(&mut self) -> Option<AguiEvent> {
        if self.has_content() {
            return None;
        }
        Some(self.content_event(NO_RESPONSE_FALLBACK))
    }

    /// End every open tool call, oldest first.
    pub fn close_open_tool_calls(&mut self) -> Vec<AguiEvent> {
        self.open_tool_calls
            .drain(..)
            .map(|tool_call_id| AguiEvent::ToolCallEnd { tool_call_id })
            .collect()
    }

    fn content_event(&mut self, delta: &str) -> AguiEvent {
        self.response.push_str(delta);
        self.content_events += 1;
        AguiEvent::TextMessageContent {
            message_id: self.message_id.clone(),
            delta: delta.to_string(),
        }
    }

    fn start_tool_call(&mut self, call: &FunctionCall) -> Vec<AguiEvent> {
        let tool_call_id = if call.id.is_empty() {
            ids::tool_call_id()
        } else {
            call.id.clone()
        };
        self.tool_calls
            .insert(call.id.clone(), tool_call_id.clone());
        self.open_tool_calls.push(tool_call_id.clone());

        let mut events = vec![AguiEvent::ToolCallStart {
            tool_call_id: tool_call_id.clone(),
            tool_call_name: call.name.clone(),
            parent_message_id: Some(self.message_id.clone()),
        }];

        if let Some(args) = &call.args {
            events.push(AguiEvent::ToolCallArgs {
                tool_call_id,
                delta: to_json_text(args),
            });
        }

        events
    }

    fn finish_tool_call(&mut self, response: &FunctionResponse) -> Vec<AguiEvent> {
        // An orphan response gets a fresh ID; the runner's IDs are not
        // guaranteed to match between call and response.
        let tool_call_id = self
            .tool_calls
            .get(&response.id)
            .cloned()
            .unwrap_or_else(ids::tool_call_id);
        self.open_tool_calls.retain(|id| id != &tool_call_id);

        let content = response
            .response
            .as_ref()
            .map(to_json_text)
            .unwrap_or_default();

        vec![
            AguiEvent::ToolCallResult {
                message_id: self.message_id.clone(),
                tool_call_id: tool_call_id.clone(),
                content,
                role: Some(MessageRole::Tool),
            },
            AguiEvent::ToolCallEnd { tool_call_id },
        ]
    }
}

/// Convert one runner output item to AG-UI events.
///
/// Each part yields its text, then its call, then its response. The
/// context is mutated to track state across items.
pub fn translate(output: &RunnerOutput, ctx: &mut TranslationContext) -> Vec<AguiEvent> {
    let mut events = Vec::new();

    for part in &output.parts {
        if let Some(text) = part.text.as_deref().filter(|t| !t.is_empty()) {
            events.push(ctx.content_event(text));
        }

        if let Some(call) = &part.function_call {
            events.extend(ctx.start_tool_call(call));
        }

        if let Some(response) = &part.function_response {
            events.extend(ctx.finish_tool_call(response));
        }
    }

    events
}

fn to_json_text(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
#[path = "translate_tests.rs"]
mod tests;
