use super::*;
use agui_core::MessageRole;
use prost::Message as _;
use serde_json::json;

#[test]
fn test_json_struct_conversion_preserves_shape() {
    let original = json!({
        "count": 3,
        "ratio": 0.5,
        "enabled": true,
        "missing": null,
        "tags": ["a", "b"],
        "nested": {"depth": 2}
    });
    let Value::Object(map) = original.clone() else {
        unreachable!()
    };

    let back = struct_to_map(&map_to_struct(&map));
    assert_eq!(Value::Object(back), original);
}

#[test]
fn test_whole_numbers_come_back_as_integers() {
    let value = value_to_json(&prost_types::Value {
        kind: Some(Kind::NumberValue(42.0)),
    });
    assert_eq!(value, json!(42));
    assert!(value.is_i64());
}

#[test]
fn test_non_finite_numbers_become_null() {
    let value = value_to_json(&prost_types::Value {
        kind: Some(Kind::NumberValue(f64::NAN)),
    });
    assert_eq!(value, Value::Null);
}

#[test]
fn test_event_carries_type_and_full_payload() {
    let event = agui_core::AguiEvent::TextMessageContent {
        message_id: "msg-1".to_string(),
        delta: "hi".to_string(),
    };

    let proto = AguiEvent::from(&event);
    assert_eq!(proto.r#type, "TEXT_MESSAGE_CONTENT");

    let data = struct_to_map(proto.data.as_ref().unwrap());
    assert_eq!(
        Value::Object(data),
        serde_json::to_value(&event).unwrap()
    );
}

#[test]
fn test_event_survives_binary_encoding() {
    let event = agui_core::AguiEvent::StateSnapshot {
        snapshot: json!({"x": 1, "y": [true, "z"]}),
    };

    let bytes = AguiEvent::from(&event).encode_to_vec();
    let decoded = AguiEvent::decode(bytes.as_slice()).unwrap();

    assert_eq!(decoded.r#type, "STATE_SNAPSHOT");
    let data = struct_to_map(decoded.data.as_ref().unwrap());
    assert_eq!(data["snapshot"], json!({"x": 1, "y": [true, "z"]}));
}

#[test]
fn test_into_input_maps_every_field() {
    let request = RunAgentInput {
        thread_id: "t1".to_string(),
        run_id: "r1".to_string(),
        state: Some(map_to_struct(
            json!({"theme": "dark"}).as_object().unwrap(),
        )),
        messages: vec![Message {
            id: "m1".to_string(),
            role: "user".to_string(),
            content: Some(json_to_value(&json!("hello"))),
            name: String::new(),
            tool_calls: None,
        }],
        tools: vec![Tool {
            name: "search".to_string(),
            description: "Search the web".to_string(),
            parameters: None,
        }],
        context: vec![Context {
            description: "locale".to_string(),
            value: "en".to_string(),
        }],
        forwarded_props: None,
    };

    let input = request.into_input();

    assert_eq!(input.thread_id.as_deref(), Some("t1"));
    assert_eq!(input.run_id.as_deref(), Some("r1"));
    assert_eq!(input.state.unwrap()["theme"], "dark");
    assert_eq!(input.messages.len(), 1);
    let message = input.messages[0].as_ref().unwrap();
    assert_eq!(message.role(), Some(MessageRole::User));
    assert_eq!(message.text_content(), Some("hello"));
    assert_eq!(message.name, None);
    assert_eq!(
        input.tools,
        vec![json!({"name": "search", "description": "Search the web"})]
    );
    assert_eq!(
        input.context,
        vec![json!({"description": "locale", "value": "en"})]
    );
    assert_eq!(input.forwarded_props, None);
}

#[test]
fn test_missing_content_stays_missing() {
    let message = Message {
        id: "m1".to_string(),
        role: "user".to_string(),
        ..Default::default()
    };

    let converted = message.into_message();
    assert_eq!(converted.content, None);
    assert!(agui_core::input::validate_messages(&[Some(converted)]).is_err());
}
