//! Tests for the run producer: event order, terminal markers, failure paths.

use std::time::Duration;

use serde_json::json;

use super::*;
use crate::events::MessageRole;
use crate::input::Message;
use crate::runner::RunnerOutput;
use crate::test_utils::{FailingSessionService, MockRunner};
use crate::translate::NO_RESPONSE_FALLBACK;

fn user_input(text: &str) -> RunAgentInput {
    RunAgentInput {
        thread_id: Some("t1".to_string()),
        messages: vec![Some(Message::text("m1", MessageRole::User, text))],
        ..Default::default()
    }
}

fn adapter(runner: MockRunner) -> AguiAdapter {
    AguiAdapter::new(
        Arc::new(runner),
        SessionManager::in_memory(),
        AdapterConfig::default(),
    )
}

async fn collect(mut rx: mpsc::Receiver<RunUpdate>) -> (Vec<AguiEvent>, Option<RunUpdate>) {
    let mut events = Vec::new();
    let mut terminal = None;
    while let Some(update) = rx.recv().await {
        match update {
            RunUpdate::Event(event) => {
                assert!(terminal.is_none(), "event after terminal marker");
                events.push(event);
            }
            other => {
                assert!(terminal.is_none(), "second terminal marker");
                terminal = Some(other);
            }
        }
    }
    (events, terminal)
}

fn start(adapter: &AguiAdapter, input: &RunAgentInput) -> mpsc::Receiver<RunUpdate> {
    adapter.run_agent(
        CancellationToken::new(),
        input,
        "t1",
        "r1",
        "msg-1",
        "demo_user",
    )
}

#[tokio::test]
async fn test_text_run_finishes() {
    let adapter = adapter(MockRunner::new().with_text("hello").with_final());
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    assert_eq!(
        events,
        vec![AguiEvent::TextMessageContent {
            message_id: "msg-1".to_string(),
            delta: "hello".to_string(),
        }]
    );
    assert!(matches!(terminal, Some(RunUpdate::Finished)));
}

#[tokio::test]
async fn test_runner_receives_last_user_message_and_thread_session() {
    let runner = MockRunner::new().with_final();
    let adapter = adapter(runner.clone());
    let input = RunAgentInput {
        messages: vec![
            Some(Message::text("m1", MessageRole::User, "first")),
            Some(Message::text("m2", MessageRole::Assistant, "reply")),
            Some(Message::text("m3", MessageRole::User, "second")),
        ],
        ..Default::default()
    };

    collect(start(&adapter, &input)).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].content, "second");
    assert_eq!(calls[0].session_id, "t1");
    assert_eq!(calls[0].user_id, "demo_user");
}

#[tokio::test]
async fn test_no_text_emits_fallback() {
    let adapter = adapter(MockRunner::new().with_final());
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    assert_eq!(
        events,
        vec![AguiEvent::TextMessageContent {
            message_id: "msg-1".to_string(),
            delta: NO_RESPONSE_FALLBACK.to_string(),
        }]
    );
    assert!(matches!(terminal, Some(RunUpdate::Finished)));
}

#[tokio::test]
async fn test_stops_at_final_marker() {
    let adapter = adapter(
        MockRunner::new()
            .with_output(RunnerOutput::text("done").into_final())
            .with_text("never sent"),
    );
    let (events, _) = collect(start(&adapter, &user_input("hi"))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AguiEvent::TextMessageContent { delta, .. } if delta == "done"
    ));
}

#[tokio::test]
async fn test_stream_end_without_final_still_finishes() {
    let adapter = adapter(MockRunner::new().with_text("partial"));
    let (_, terminal) = collect(start(&adapter, &user_input("hi"))).await;
    assert!(matches!(terminal, Some(RunUpdate::Finished)));
}

#[tokio::test]
async fn test_tool_round_trip() {
    let adapter = adapter(
        MockRunner::new()
            .with_tool_call("fc1", "search", json!({"q": "x"}))
            .with_tool_response("fc1", "search", json!({"ok": true}))
            .with_text("found it")
            .with_final(),
    );
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec![
            "TOOL_CALL_START",
            "TOOL_CALL_ARGS",
            "TOOL_CALL_RESULT",
            "TOOL_CALL_END",
            "TEXT_MESSAGE_CONTENT",
        ]
    );
    assert!(matches!(terminal, Some(RunUpdate::Finished)));
}

#[tokio::test]
async fn test_unanswered_tool_call_closed_on_finish() {
    let adapter = adapter(
        MockRunner::new()
            .with_tool_call("fc1", "search", json!({}))
            .with_final(),
    );
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec![
            "TOOL_CALL_START",
            "TOOL_CALL_ARGS",
            "TOOL_CALL_END",
            "TEXT_MESSAGE_CONTENT",
        ]
    );
    assert!(matches!(terminal, Some(RunUpdate::Finished)));
}

#[tokio::test]
async fn test_runner_error_closes_tool_calls_then_fails() {
    let adapter = adapter(
        MockRunner::new()
            .with_tool_call("fc1", "search", json!({}))
            .with_error("model exploded"),
    );
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    assert_eq!(
        events.last(),
        Some(&AguiEvent::ToolCallEnd {
            tool_call_id: "fc1".to_string()
        })
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, AguiEvent::TextMessageContent { .. })),
        "no fallback content on failure"
    );
    match terminal {
        Some(RunUpdate::Failed(AdapterError::Runner(msg))) => {
            assert!(msg.contains("model exploded"))
        }
        other => panic!("unexpected terminal {:?}", other),
    }
}

#[tokio::test]
async fn test_no_user_message_fails() {
    let adapter = adapter(MockRunner::new().with_text("unused"));
    let input = RunAgentInput {
        messages: vec![Some(Message::text("m1", MessageRole::Assistant, "hello"))],
        ..Default::default()
    };
    let (events, terminal) = collect(start(&adapter, &input)).await;

    assert!(events.is_empty());
    assert!(matches!(
        terminal,
        Some(RunUpdate::Failed(AdapterError::NoUserMessage))
    ));
}

#[tokio::test]
async fn test_session_failure_fails_before_runner() {
    let runner = MockRunner::new().with_text("unused");
    let adapter = AguiAdapter::new(
        Arc::new(runner.clone()),
        SessionManager::new(Arc::new(FailingSessionService)),
        AdapterConfig::default(),
    );
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    assert!(events.is_empty());
    assert!(matches!(
        terminal,
        Some(RunUpdate::Failed(AdapterError::Session(_)))
    ));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_runner_start_failure_is_reported() {
    let adapter = adapter(MockRunner::new().failing_to_start("no model configured"));
    let (_, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    match terminal {
        Some(RunUpdate::Failed(err @ AdapterError::RunnerStart(_))) => {
            assert_eq!(err.to_string(), "failed to create runner: no model configured");
            assert_eq!(err.code(), "SESSION_ERROR");
        }
        other => panic!("unexpected terminal {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_fails_run() {
    let adapter = AguiAdapter::new(
        Arc::new(MockRunner::new().with_text("partial").hanging()),
        SessionManager::in_memory(),
        AdapterConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        },
    );
    let (events, terminal) = collect(start(&adapter, &user_input("hi"))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        terminal,
        Some(RunUpdate::Failed(AdapterError::Timeout(_)))
    ));
}

#[tokio::test]
async fn test_cancellation_fails_run_promptly() {
    let adapter = adapter(MockRunner::new().hanging());
    let cancel = CancellationToken::new();
    let rx = adapter.run_agent(
        cancel.clone(),
        &user_input("hi"),
        "t1",
        "r1",
        "msg-1",
        "demo_user",
    );
    cancel.cancel();

    let (_, terminal) = tokio::time::timeout(Duration::from_secs(5), collect(rx))
        .await
        .expect("producer must close the channel after cancellation");
    assert!(matches!(
        terminal,
        Some(RunUpdate::Failed(AdapterError::Cancelled))
    ));
}

#[tokio::test]
async fn test_cancellation_drops_runner_stream() {
    let runner = MockRunner::new().with_text("thinking").hanging();
    let adapter = adapter(runner.clone());
    let cancel = CancellationToken::new();
    let mut rx = adapter.run_agent(
        cancel.clone(),
        &user_input("hi"),
        "t1",
        "r1",
        "msg-1",
        "demo_user",
    );

    // The first event means the runner stream is open
    assert!(matches!(rx.recv().await, Some(RunUpdate::Event(_))));
    assert_eq!(runner.live_streams(), 1);

    cancel.cancel();
    collect(rx).await;
    assert_eq!(runner.live_streams(), 0);
}
