//! The transport capability.
//!
//! A transport implements [`EventSender`] once; the orchestrator never knows
//! which wire format is behind it. Every implementation must deliver each
//! event to the peer before returning, with no batching across events.

use async_trait::async_trait;

use crate::error::{AdapterError, SendError};
use crate::events::AguiEvent;

/// Writes protocol events to one client.
#[async_trait]
pub trait EventSender: Send {
    /// Encode and transmit one event.
    async fn send_event(&mut self, event: &AguiEvent) -> Result<(), SendError>;

    /// Wrap `err` in a `RUN_ERROR` event for `run_id` and send it.
    async fn send_run_error(&mut self, run_id: &str, err: &AdapterError) -> Result<(), SendError> {
        let event = AguiEvent::run_error(err, Some(run_id));
        self.send_event(&event).await
    }
}
