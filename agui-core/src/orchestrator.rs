//! The AG-UI request lifecycle.
//!
//! ```text
//! Idle -> Validating -> StateSyncOnly ------------------> Terminal
//!                    \-> Running -> Draining -----------> Terminal
//!                    \-> (invalid messages) ------------> Terminal
//! ```
//!
//! Guarantees per request:
//! - a run's events end with exactly one `RUN_FINISHED` or `RUN_ERROR`
//! - `TEXT_MESSAGE_END` is sent exactly once, and only after `TEXT_MESSAGE_START`
//! - state is merged before anything else happens, on every path but rejection
//! - a state-sync probe sends one `STATE_SNAPSHOT` and nothing else

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::adapter::{AguiAdapter, RunUpdate};
use crate::error::{AdapterError, SendError};
use crate::events::{AguiEvent, MessageRole};
use crate::ids;
use crate::input::{validate_messages, RunAgentInput};
use crate::sender::EventSender;
use crate::state::{StateMap, ThreadStateStore};

/// User the runner sessions are attributed to when no auth exists.
pub const DEFAULT_USER_ID: &str = "demo_user";

/// Phases of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Validating,
    StateSyncOnly,
    Running,
    Draining,
    Terminal,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::StateSyncOnly => "state_sync_only",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// How a request ended, when the transport stayed up.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Messages failed validation; one `RUN_ERROR` was sent.
    Rejected(AdapterError),
    /// No messages; one `STATE_SNAPSHOT` was sent.
    StateSynced,
    /// The run completed with `RUN_FINISHED`.
    Finished,
    /// The run failed with `RUN_ERROR`.
    Failed(AdapterError),
}

/// Ties the adapter, the state store and a transport into one request.
#[derive(Clone)]
pub struct Orchestrator {
    adapter: Arc<AguiAdapter>,
    states: Arc<ThreadStateStore>,
    user_id: String,
}

impl Orchestrator {
    /// Create an orchestrator over a shared adapter and state store.
    pub fn new(adapter: Arc<AguiAdapter>, states: Arc<ThreadStateStore>) -> Self {
        Self {
            adapter,
            states,
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    /// Attribute runner sessions to a different user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// The shared thread state store.
    pub fn states(&self) -> &Arc<ThreadStateStore> {
        &self.states
    }

    /// Serve one request, writing its events to `sender`.
    ///
    /// Returns `Err` only when the transport fails; the run is then
    /// cancelled and nothing more is written.
    pub async fn handle<S>(
        &self,
        input: RunAgentInput,
        sender: &mut S,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, SendError>
    where
        S: EventSender + ?Sized,
    {
        let mut request = Request::new(&input);
        let result = request.serve(self, input, sender, cancel).await;
        request.transition(RequestPhase::Terminal);

        if let Err(e) = &result {
            tracing::warn!(
                thread_id = %request.thread_id,
                run_id = %request.run_id,
                error = %e,
                "failed to send event, request aborted"
            );
        }
        result
    }
}

struct Request {
    thread_id: String,
    run_id: String,
    phase: RequestPhase,
}

impl Request {
    fn new(input: &RunAgentInput) -> Self {
        let thread_id = input
            .thread_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(ids::thread_id);
        let run_id = input
            .run_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(ids::run_id);

        Self {
            thread_id,
            run_id,
            phase: RequestPhase::Idle,
        }
    }

    fn transition(&mut self, next: RequestPhase) {
        tracing::debug!(
            thread_id = %self.thread_id,
            run_id = %self.run_id,
            from = %self.phase,
            to = %next,
            "request phase"
        );
        self.phase = next;
    }

    async fn serve<S>(
        &mut self,
        orchestrator: &Orchestrator,
        input: RunAgentInput,
        sender: &mut S,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, SendError>
    where
        S: EventSender + ?Sized,
    {
        self.transition(RequestPhase::Validating);

        if let Err(err) = validate_messages(&input.messages) {
            tracing::info!(thread_id = %self.thread_id, error = %err, "rejecting request");
            sender.send_run_error(&self.run_id, &err).await?;
            return Ok(RunOutcome::Rejected(err));
        }

        let incoming = input.state.clone().unwrap_or_default();
        let merged = orchestrator.states.merge(&self.thread_id, &incoming);

        if input.is_state_sync() {
            self.transition(RequestPhase::StateSyncOnly);
            self.sync_state(merged, sender).await?;
            return Ok(RunOutcome::StateSynced);
        }

        self.transition(RequestPhase::Running);
        self.run(orchestrator, &input, sender, cancel).await
    }

    async fn sync_state<S>(&self, merged: StateMap, sender: &mut S) -> Result<(), SendError>
    where
        S: EventSender + ?Sized,
    {
        sender
            .send_event(&AguiEvent::StateSnapshot {
                snapshot: Value::Object(merged),
            })
            .await
    }

    async fn run<S>(
        &mut self,
        orchestrator: &Orchestrator,
        input: &RunAgentInput,
        sender: &mut S,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, SendError>
    where
        S: EventSender + ?Sized,
    {
        // Dropping this request (or failing a send) cancels the run
        let run_cancel = cancel.child_token();
        let _guard = run_cancel.clone().drop_guard();

        sender
            .send_event(&AguiEvent::RunStarted {
                thread_id: self.thread_id.clone(),
                run_id: self.run_id.clone(),
            })
            .await?;

        let message_id = ids::message_id();
        sender
            .send_event(&AguiEvent::TextMessageStart {
                message_id: message_id.clone(),
                role: MessageRole::Assistant,
            })
            .await?;

        let mut updates = orchestrator.adapter.run_agent(
            run_cancel,
            input,
            &self.thread_id,
            &self.run_id,
            &message_id,
            &orchestrator.user_id,
        );

        let result = loop {
            match updates.recv().await {
                Some(RunUpdate::Event(event)) => sender.send_event(&event).await?,
                Some(RunUpdate::Finished) => break Ok(()),
                Some(RunUpdate::Failed(err)) => break Err(err),
                None => break Err(AdapterError::Incomplete),
            }
        };

        self.transition(RequestPhase::Draining);

        sender
            .send_event(&AguiEvent::TextMessageEnd { message_id })
            .await?;

        match result {
            Ok(()) => {
                sender
                    .send_event(&AguiEvent::RunFinished {
                        thread_id: self.thread_id.clone(),
                        run_id: self.run_id.clone(),
                    })
                    .await?;
                Ok(RunOutcome::Finished)
            }
            Err(err) => {
                sender.send_run_error(&self.run_id, &err).await?;
                Ok(RunOutcome::Failed(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
