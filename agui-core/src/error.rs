//! Error types for the AG-UI engine.
//!
//! Every failure a client can see ends up as a `RUN_ERROR` event on the
//! stream it is already reading. [`AdapterError`] is the taxonomy of those
//! failures; [`SendError`] is the one failure that cannot be reported in-band
//! because the transport itself is gone.

use std::time::Duration;

use thiserror::Error;

/// Errors from the agent runner collaborator.
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    /// The runner could not be constructed or refused to start.
    #[error("failed to create runner: {0}")]
    Create(String),

    /// The runner failed while producing output.
    #[error("agent execution error: {0}")]
    Execution(String),
}

/// Errors from the session service collaborator.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The session does not exist.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The backing store failed.
    #[error("session storage error: {0}")]
    Storage(String),
}

/// Failures of a single run, each reported to the client as `RUN_ERROR`.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// A message in the request is malformed. The run never starts.
    #[error("Invalid messages: {0}")]
    Validation(String),

    /// The session could not be resolved. The run never starts.
    #[error("failed to get session: {0}")]
    Session(String),

    /// The runner refused to start. Reported with the session code.
    #[error("failed to create runner: {0}")]
    RunnerStart(String),

    /// No user message with text content to answer.
    #[error("no valid user message found")]
    NoUserMessage,

    /// The runner failed mid-stream.
    #[error("{0}")]
    Runner(String),

    /// The run exceeded its deadline.
    #[error("agent run timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The request was cancelled (client disconnect or shutdown).
    #[error("agent run was cancelled")]
    Cancelled,

    /// The event stream closed without a terminal marker.
    #[error("agent stream ended unexpectedly")]
    Incomplete,
}

impl AdapterError {
    /// Short machine-readable code carried on the `RUN_ERROR` event.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Session(_) | Self::RunnerStart(_) => "SESSION_ERROR",
            Self::NoUserMessage => "NO_USER_MESSAGE",
            Self::Runner(_) => "RUNNER_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Incomplete => "INCOMPLETE_STREAM",
        }
    }
}

impl From<SessionError> for AdapterError {
    fn from(err: SessionError) -> Self {
        Self::Session(err.to_string())
    }
}

impl From<RunnerError> for AdapterError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Create(message) => Self::RunnerStart(message),
            RunnerError::Execution(_) => Self::Runner(err.to_string()),
        }
    }
}

/// Transport write failures. These abort the request and are never retried.
#[derive(Debug, Error)]
pub enum SendError {
    /// The peer went away or the response body was dropped.
    #[error("transport closed")]
    Closed,

    /// The event could not be encoded for the wire.
    #[error("failed to encode event: {0}")]
    Encode(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
