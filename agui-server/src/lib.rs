//! HTTP transports for the AG-UI protocol engine in `agui-core`.
//!
//! This crate serves an [`agui_core::Orchestrator`] over two wire formats:
//!
//! - Server-Sent Events: `POST` a JSON `RunAgentInput`, receive one
//!   `data: <event json>` frame per event.
//! - Connect RPC (`connect` feature, on by default): the server-streaming
//!   `agui.v1.AGUIService/RunAgent` method with binary and JSON codecs.
//!
//! Both transports produce the same event sequence for the same request.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agui_core::{AdapterConfig, AguiAdapter, Orchestrator, SessionManager, ThreadStateStore};
//! use agui_server::{AguiRouter, EchoRunner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = AguiAdapter::new(
//!     Arc::new(EchoRunner::new()),
//!     SessionManager::in_memory(),
//!     AdapterConfig::default(),
//! );
//! let orchestrator = Orchestrator::new(Arc::new(adapter), Arc::new(ThreadStateStore::new()));
//!
//! let app = AguiRouter::new(orchestrator).with_default_routes().build()?;
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod echo;
pub mod error;
pub mod janitor;
pub mod router;
pub(crate) mod state;
pub mod transport;

// Re-exports
pub use config::Config;
pub use echo::EchoRunner;
pub use error::{BuildError, ServerError, ServerResult};
pub use janitor::spawn_state_janitor;
pub use router::AguiRouter;
