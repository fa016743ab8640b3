//! Drives one agent run and streams its AG-UI events over a channel.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AdapterError;
use crate::events::AguiEvent;
use crate::input::RunAgentInput;
use crate::runner::AgentRunner;
use crate::session::SessionManager;
use crate::translate::{translate, TranslationContext};

/// Default bound on a single run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// Default capacity of the per-run event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Deployment-level adapter settings.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Application name used for runner sessions.
    pub app_name: String,
    /// Hard limit on one run, start to finish.
    pub timeout: Duration,
    /// Capacity of the channel between the run and the transport.
    pub channel_capacity: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            app_name: "agent-rs-ag-ui".to_string(),
            timeout: DEFAULT_RUN_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// One item on a run's channel.
///
/// A run always ends with exactly one `Finished` or `Failed` before the
/// channel closes. A channel that closes without one was cut short.
#[derive(Debug, Clone)]
pub enum RunUpdate {
    /// A protocol event, in production order.
    Event(AguiEvent),
    /// The run completed normally.
    Finished,
    /// The run failed; no further events follow.
    Failed(AdapterError),
}

/// Adapter between an [`AgentRunner`] and the AG-UI event stream.
pub struct AguiAdapter {
    runner: Arc<dyn AgentRunner>,
    sessions: SessionManager,
    config: AdapterConfig,
}

impl AguiAdapter {
    /// Create an adapter.
    pub fn new(runner: Arc<dyn AgentRunner>, sessions: SessionManager, config: AdapterConfig) -> Self {
        Self {
            runner,
            sessions,
            config,
        }
    }

    /// The adapter's settings.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Start a run and return the receiving end of its event channel.
    ///
    /// The run executes on its own task, which is the only writer of the
    /// channel and drops it on every exit path. Cancelling `cancel` or
    /// exceeding the configured timeout ends the run with `Failed`.
    pub fn run_agent(
        &self,
        cancel: CancellationToken,
        input: &RunAgentInput,
        thread_id: &str,
        run_id: &str,
        message_id: &str,
        user_id: &str,
    ) -> mpsc::Receiver<RunUpdate> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let mut producer = RunProducer {
            tx,
            ctx: TranslationContext::new(message_id),
        };
        let job = RunJob {
            runner: self.runner.clone(),
            sessions: self.sessions.clone(),
            app_name: self.config.app_name.clone(),
            user_id: user_id.to_string(),
            thread_id: thread_id.to_string(),
            user_text: input.last_user_text().map(str::to_string),
        };
        let timeout = self.config.timeout;
        let run_id = run_id.to_string();

        tokio::spawn(async move {
            tracing::debug!(thread_id = %job.thread_id, %run_id, "agent run started");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(AdapterError::Cancelled),
                result = tokio::time::timeout(timeout, job.drive(&mut producer)) => {
                    result.unwrap_or(Err(AdapterError::Timeout(timeout)))
                }
            };

            match &outcome {
                Ok(()) => tracing::debug!(thread_id = %job.thread_id, %run_id, "agent run finished"),
                Err(e) => {
                    tracing::warn!(thread_id = %job.thread_id, %run_id, error = %e, "agent run failed")
                }
            }

            producer.finish(outcome).await;
        });

        rx
    }
}

struct RunJob {
    runner: Arc<dyn AgentRunner>,
    sessions: SessionManager,
    app_name: String,
    user_id: String,
    thread_id: String,
    user_text: Option<String>,
}

impl RunJob {
    async fn drive(&self, producer: &mut RunProducer) -> Result<(), AdapterError> {
        let session = self
            .sessions
            .get_or_create(&self.app_name, &self.user_id, &self.thread_id)
            .await?;

        let content = self
            .user_text
            .as_deref()
            .ok_or(AdapterError::NoUserMessage)?;

        let mut outputs = self.runner.run(&self.user_id, &session.id, content).await?;

        while let Some(item) = outputs.next().await {
            let output = item?;
            for event in translate(&output, &mut producer.ctx) {
                producer.emit(event).await?;
            }
            // One run is one logical turn
            if output.is_final {
                break;
            }
        }

        Ok(())
    }
}

struct RunProducer {
    tx: mpsc::Sender<RunUpdate>,
    ctx: TranslationContext,
}

impl RunProducer {
    async fn emit(&self, event: AguiEvent) -> Result<(), AdapterError> {
        self.tx
            .send(RunUpdate::Event(event))
            .await
            .map_err(|_| AdapterError::Cancelled)
    }

    /// Close open tool calls, then write the terminal marker.
    async fn finish(mut self, outcome: Result<(), AdapterError>) {
        let mut trailing = self.ctx.close_open_tool_calls();
        if outcome.is_ok() {
            trailing.extend(self.ctx.fallback_content());
        }

        for event in trailing {
            if self.emit(event).await.is_err() {
                return;
            }
        }

        let terminal = match outcome {
            Ok(()) => RunUpdate::Finished,
            Err(e) => RunUpdate::Failed(e),
        };
        let _ = self.tx.send(terminal).await;
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
