//! Application state for the AG-UI server.

use agui_core::Orchestrator;
use tokio_util::sync::CancellationToken;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Runs requests against the shared adapter and state store.
    pub orchestrator: Orchestrator,
    /// Cancelled when the server shuts down; each request runs under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state for one router.
    pub fn new(orchestrator: Orchestrator, shutdown: CancellationToken) -> Self {
        Self {
            orchestrator,
            shutdown,
        }
    }

    /// Token for one request's lifetime.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
