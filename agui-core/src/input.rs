//! Inbound request model and message validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AdapterError;
use crate::events::MessageRole;

/// One inbound AG-UI request.
///
/// An empty `messages` list makes this a state-sync probe rather than a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentInput {
    /// Thread ID, generated when absent.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Run ID, generated when absent.
    #[serde(default)]
    pub run_id: Option<String>,
    /// Partial state update merged into the thread state before anything else.
    #[serde(default)]
    pub state: Option<Map<String, Value>>,
    /// Conversation messages, oldest first. A `null` entry is kept so
    /// validation can report it.
    #[serde(default)]
    pub messages: Vec<Option<Message>>,
    /// Frontend tools (passed through).
    #[serde(default)]
    pub tools: Vec<Value>,
    /// Context entries (passed through).
    #[serde(default)]
    pub context: Vec<Value>,
    /// Opaque properties forwarded to the agent.
    #[serde(default)]
    pub forwarded_props: Option<Value>,
}

/// A conversation message as sent by the client.
///
/// Fields are kept loose so that malformed messages reach
/// [`validate_messages`] and are reported in-band instead of failing
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Usually a string; any other non-null value is accepted as-is.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
    /// String or array of content parts.
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Value>,
}

impl Message {
    /// Convenience constructor for a text message.
    pub fn text(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Some(Value::String(id.into())),
            role: Some(Value::String(role.as_str().to_string())),
            content: Some(Value::String(content.into())),
            name: None,
            tool_calls: None,
        }
    }

    /// The parsed role, if present and valid.
    pub fn role(&self) -> Option<MessageRole> {
        self.role.as_ref()?.as_str().and_then(MessageRole::parse)
    }

    /// The content when it is a plain string.
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_ref()?.as_str()
    }
}

impl RunAgentInput {
    /// True when the request only synchronises state.
    pub fn is_state_sync(&self) -> bool {
        self.messages.is_empty()
    }

    /// The text of the most recent user message with non-empty string content.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .flatten()
            .filter(|m| m.role() == Some(MessageRole::User))
            .find_map(|m| m.text_content().filter(|text| !text.is_empty()))
    }
}

/// Check every message against the protocol's structural rules.
///
/// Fails on the first offending message with a description naming its index.
pub fn validate_messages(messages: &[Option<Message>]) -> Result<(), AdapterError> {
    for (i, msg) in messages.iter().enumerate() {
        let msg = msg
            .as_ref()
            .ok_or_else(|| AdapterError::Validation(format!("message at index {} is nil", i)))?;
        validate_message(i, msg).map_err(AdapterError::Validation)?;
    }
    Ok(())
}

fn validate_message(i: usize, msg: &Message) -> Result<(), String> {
    let missing_id = match &msg.id {
        None | Some(Value::Null) => true,
        Some(Value::String(id)) => id.is_empty(),
        Some(_) => false,
    };
    if missing_id {
        return Err(format!("message at index {} missing required field 'id'", i));
    }

    let role = match &msg.role {
        None | Some(Value::Null) => {
            return Err(format!(
                "message at index {} missing required field 'role'",
                i
            ))
        }
        Some(Value::String(role)) => role,
        Some(_) => {
            return Err(format!(
                "message at index {} has invalid 'role' type (expected string)",
                i
            ))
        }
    };

    let role = MessageRole::parse(role)
        .ok_or_else(|| format!("message at index {} has invalid 'role' value: {}", i, role))?;

    if matches!(role, MessageRole::User | MessageRole::Assistant) {
        match &msg.content {
            None | Some(Value::Null) => {
                return Err(format!(
                    "message at index {} missing required field 'content' for role '{}'",
                    i,
                    role.as_str()
                ))
            }
            Some(Value::String(_)) | Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(format!(
                    "message at index {} has invalid 'content' type (expected string or array)",
                    i
                ))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
