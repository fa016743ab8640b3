//! AG-UI event streaming engine.
//!
//! This crate turns one user turn into an ordered stream of AG-UI protocol
//! events. It drives an external agent runner, translates the runner's
//! incremental output into typed events, and keeps per-thread state that
//! clients can merge into and read back.
//!
//! It has no HTTP dependency: transports implement [`EventSender`] and hand
//! requests to the [`Orchestrator`].
//!
//! # Components
//!
//! - [`ThreadStateStore`] - per-thread key/value state with shallow merge
//! - [`translate`] - runner output to protocol events
//! - [`AguiAdapter`] - one run: session lookup, runner invocation, event channel
//! - [`EventSender`] - the transport capability
//! - [`Orchestrator`] - the request lifecycle tying everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agui_core::{AdapterConfig, AguiAdapter, Orchestrator, SessionManager, ThreadStateStore};
//! # use agui_core::runner::AgentRunner;
//!
//! # fn example(runner: Arc<dyn AgentRunner>) {
//! let adapter = AguiAdapter::new(runner, SessionManager::in_memory(), AdapterConfig::default());
//! let orchestrator = Orchestrator::new(Arc::new(adapter), Arc::new(ThreadStateStore::new()));
//! # let _ = orchestrator;
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod events;
pub mod ids;
pub mod input;
pub mod orchestrator;
pub mod runner;
pub mod sender;
pub mod session;
pub mod state;
pub mod translate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapter::{AdapterConfig, AguiAdapter, RunUpdate};
pub use error::{AdapterError, RunnerError, SendError, SessionError};
pub use events::{AguiEvent, MessageRole, WireEvent};
pub use input::{Message, RunAgentInput};
pub use orchestrator::{Orchestrator, RequestPhase, RunOutcome};
pub use runner::{AgentRunner, FunctionCall, FunctionResponse, Part, RunnerOutput};
pub use sender::EventSender;
pub use session::{InMemorySessionService, Session, SessionManager, SessionService};
pub use state::{StateMap, ThreadStateStore};
pub use translate::{translate, TranslationContext, NO_RESPONSE_FALLBACK};
