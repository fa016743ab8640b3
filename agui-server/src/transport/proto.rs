//! Protobuf messages of the `agui.v1` package.
//!
//! ```proto
//! service AGUIService {
//!   rpc RunAgent(RunAgentInput) returns (stream AGUIEvent);
//! }
//! ```
//!
//! Dynamic payloads travel as `google.protobuf.Struct` / `Value` and are
//! converted to and from `serde_json` here.

use prost_types::value::Kind;
use serde_json::{Map, Number, Value};

/// Fully qualified service name.
pub const SERVICE_NAME: &str = "agui.v1.AGUIService";

/// Request path of the streaming `RunAgent` method.
pub const RUN_AGENT_PATH: &str = "/agui.v1.AGUIService/RunAgent";

#[derive(Clone, PartialEq, prost::Message)]
pub struct RunAgentInput {
    #[prost(string, tag = "1")]
    pub thread_id: String,
    #[prost(string, tag = "2")]
    pub run_id: String,
    #[prost(message, optional, tag = "3")]
    pub state: Option<prost_types::Struct>,
    #[prost(message, repeated, tag = "4")]
    pub messages: Vec<Message>,
    #[prost(message, repeated, tag = "5")]
    pub tools: Vec<Tool>,
    #[prost(message, repeated, tag = "6")]
    pub context: Vec<Context>,
    #[prost(message, optional, tag = "7")]
    pub forwarded_props: Option<prost_types::Struct>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub role: String,
    #[prost(message, optional, tag = "3")]
    pub content: Option<prost_types::Value>,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(message, optional, tag = "5")]
    pub tool_calls: Option<prost_types::Value>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Tool {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(message, optional, tag = "3")]
    pub parameters: Option<prost_types::Struct>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Context {
    #[prost(string, tag = "1")]
    pub description: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// One streamed event: its type tag plus the full event object.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AguiEvent {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(message, optional, tag = "2")]
    pub data: Option<prost_types::Struct>,
}

impl From<&agui_core::AguiEvent> for AguiEvent {
    fn from(event: &agui_core::AguiEvent) -> Self {
        let wire = event.to_wire();
        Self {
            r#type: wire.event_type,
            data: Some(map_to_struct(&wire.data)),
        }
    }
}

impl RunAgentInput {
    /// Convert into the protocol request model.
    ///
    /// Empty strings are kept so that message validation reports them the
    /// same way it does for the JSON transports.
    pub fn into_input(self) -> agui_core::RunAgentInput {
        agui_core::RunAgentInput {
            thread_id: Some(self.thread_id),
            run_id: Some(self.run_id),
            state: self.state.as_ref().map(struct_to_map),
            messages: self
                .messages
                .into_iter()
                .map(|m| Some(m.into_message()))
                .collect(),
            tools: self.tools.into_iter().map(Tool::into_value).collect(),
            context: self.context.into_iter().map(Context::into_value).collect(),
            forwarded_props: self
                .forwarded_props
                .as_ref()
                .map(|props| Value::Object(struct_to_map(props))),
        }
    }
}

impl Message {
    fn into_message(self) -> agui_core::Message {
        agui_core::Message {
            id: Some(Value::String(self.id)),
            role: Some(Value::String(self.role)),
            content: self.content.as_ref().map(value_to_json),
            name: Some(self.name).filter(|name| !name.is_empty()),
            tool_calls: self.tool_calls.as_ref().map(value_to_json),
        }
    }
}

impl Tool {
    fn into_value(self) -> Value {
        let mut tool = Map::new();
        tool.insert("name".to_string(), Value::String(self.name));
        tool.insert("description".to_string(), Value::String(self.description));
        if let Some(parameters) = &self.parameters {
            tool.insert(
                "parameters".to_string(),
                Value::Object(struct_to_map(parameters)),
            );
        }
        Value::Object(tool)
    }
}

impl Context {
    fn into_value(self) -> Value {
        let mut context = Map::new();
        context.insert("description".to_string(), Value::String(self.description));
        context.insert("value".to_string(), Value::String(self.value));
        Value::Object(context)
    }
}

/// Convert a JSON object into a protobuf `Struct`.
pub fn map_to_struct(map: &Map<String, Value>) -> prost_types::Struct {
    prost_types::Struct {
        fields: map
            .iter()
            .map(|(key, value)| (key.clone(), json_to_value(value)))
            .collect(),
    }
}

/// Convert a protobuf `Struct` into a JSON object.
pub fn struct_to_map(s: &prost_types::Struct) -> Map<String, Value> {
    s.fields
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect()
}

/// Convert a JSON value into a protobuf `Value`.
pub fn json_to_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(*b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(map_to_struct(map)),
    };
    prost_types::Value { kind: Some(kind) }
}

/// Convert a protobuf `Value` into JSON.
///
/// Whole numbers that fit an `i64` come back as integers.
pub fn value_to_json(value: &prost_types::Value) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::NumberValue(n)) => number_to_json(*n),
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(struct_to_map(s)),
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
#[path = "proto_tests.rs"]
mod tests;
