//! Test utilities for agui-core.
//!
//! Scripted collaborators for exercising runs without a real agent engine.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! agui-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use agui_core::test_utils::MockRunner;
//! use serde_json::json;
//!
//! // Text, then a tool round-trip, then the final marker
//! let runner = MockRunner::new()
//!     .with_text("Looking that up")
//!     .with_tool_call("fc1", "search", json!({"q": "rust"}))
//!     .with_tool_response("fc1", "search", json!({"ok": true}))
//!     .with_final();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{RunnerError, SendError, SessionError};
use crate::events::AguiEvent;
use crate::runner::{AgentRunner, Part, RunnerOutput, RunnerStream};
use crate::sender::EventSender;
use crate::session::{Session, SessionService};

/// One recorded invocation of [`MockRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub user_id: String,
    pub session_id: String,
    pub content: String,
}

/// A runner that replays pre-programmed output items in order.
#[derive(Clone, Default)]
pub struct MockRunner {
    script: Arc<Mutex<Vec<Result<RunnerOutput, RunnerError>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    start_error: Option<String>,
    hang: bool,
    live_streams: Arc<AtomicUsize>,
}

impl MockRunner {
    /// Create a runner with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw output item.
    pub fn with_output(self, output: RunnerOutput) -> Self {
        self.script.lock().push(Ok(output));
        self
    }

    /// Append a text chunk.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_output(RunnerOutput::text(text))
    }

    /// Append a function call.
    pub fn with_tool_call(self, id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        self.with_output(RunnerOutput::new(vec![Part::function_call(
            id,
            name,
            Some(args),
        )]))
    }

    /// Append a function response.
    pub fn with_tool_response(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        response: Value,
    ) -> Self {
        self.with_output(RunnerOutput::new(vec![Part::function_response(
            id,
            name,
            Some(response),
        )]))
    }

    /// Append the final-response marker.
    pub fn with_final(self) -> Self {
        self.with_output(RunnerOutput::final_marker())
    }

    /// Append a mid-stream execution failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .push(Err(RunnerError::Execution(message.into())));
        self
    }

    /// Fail before producing any output.
    pub fn failing_to_start(mut self, message: impl Into<String>) -> Self {
        self.start_error = Some(message.into());
        self
    }

    /// Never end the stream after the script runs out.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Invocations seen so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Output streams handed out and not yet dropped.
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }
}

/// Counts a stream as live until the stream is dropped.
struct LiveStream(Arc<AtomicUsize>);

impl LiveStream {
    fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgentRunner for MockRunner {
    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        content: &str,
    ) -> Result<RunnerStream, RunnerError> {
        self.calls.lock().push(MockCall {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            content: content.to_string(),
        });

        if let Some(message) = &self.start_error {
            return Err(RunnerError::Create(message.clone()));
        }

        let items = stream::iter(self.script.lock().clone());
        let items = if self.hang {
            items.chain(stream::pending()).boxed()
        } else {
            items.boxed()
        };

        let live = LiveStream::new(self.live_streams.clone());
        Ok(items
            .map(move |item| {
                let _live = &live;
                item
            })
            .boxed())
    }
}

/// A session service whose every operation fails.
#[derive(Debug, Clone, Default)]
pub struct FailingSessionService;

#[async_trait]
impl SessionService for FailingSessionService {
    async fn get(&self, _session_id: &str) -> Result<Option<Session>, SessionError> {
        Err(SessionError::Storage("session store unavailable".to_string()))
    }

    async fn create(
        &self,
        _app_name: &str,
        _user_id: &str,
        _session_id: Option<&str>,
    ) -> Result<Session, SessionError> {
        Err(SessionError::Storage("session store unavailable".to_string()))
    }
}

/// A sender that records every event it is given.
///
/// Optionally fails after a fixed number of sends, to simulate a client
/// that disconnects mid-stream.
#[derive(Debug, Default)]
pub struct RecordingSender {
    pub events: Vec<AguiEvent>,
    fail_after: Option<usize>,
}

impl RecordingSender {
    /// Create a sender that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that accepts `n` events and then reports a closed transport.
    pub fn failing_after(n: usize) -> Self {
        Self {
            events: Vec::new(),
            fail_after: Some(n),
        }
    }

    /// Type tags of the recorded events.
    pub fn types(&self) -> Vec<&'static str> {
        self.events.iter().map(AguiEvent::event_type).collect()
    }
}

#[async_trait]
impl EventSender for RecordingSender {
    async fn send_event(&mut self, event: &AguiEvent) -> Result<(), SendError> {
        if self.fail_after.is_some_and(|n| self.events.len() >= n) {
            return Err(SendError::Closed);
        }
        self.events.push(event.clone());
        Ok(())
    }
}
