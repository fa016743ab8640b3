//! Router builder for AG-UI HTTP endpoints.

use std::collections::HashSet;

use agui_core::Orchestrator;
use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::BuildError;
use crate::state::AppState;
use crate::transport::sse::{method_not_allowed, preflight_handler, sse_handler};

/// Builder for configuring AG-UI HTTP endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use agui_server::AguiRouter;
/// # use agui_core::Orchestrator;
///
/// # async fn example(orchestrator: Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
/// let app = AguiRouter::new(orchestrator)
///     .with_sse("/sse")
///     .with_health("/health")
///     .build()?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct AguiRouter {
    orchestrator: Orchestrator,
    shutdown: CancellationToken,
    sse_paths: Vec<String>,
    #[cfg(feature = "connect")]
    connect_paths: Vec<String>,
    health_path: Option<String>,
    cors: bool,
}

impl AguiRouter {
    /// Create a new router builder around an orchestrator.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            shutdown: CancellationToken::new(),
            sse_paths: Vec::new(),
            #[cfg(feature = "connect")]
            connect_paths: Vec::new(),
            health_path: None,
            cors: true,
        }
    }

    /// Register the standard routes: SSE at `/sse` and `/`, Connect at the
    /// service path and `/connect`, health at `/health`.
    pub fn with_default_routes(self) -> Self {
        let router = self.with_sse("/sse").with_sse("/");
        #[cfg(feature = "connect")]
        let router = router
            .with_connect(crate::transport::proto::RUN_AGENT_PATH)
            .with_connect("/connect");
        router.with_health("/health")
    }

    /// Serve the SSE transport at `path`. May be called more than once.
    pub fn with_sse(mut self, path: impl Into<String>) -> Self {
        self.sse_paths.push(path.into());
        self
    }

    /// Serve the Connect RPC transport at `path`. May be called more than once.
    #[cfg(feature = "connect")]
    pub fn with_connect(mut self, path: impl Into<String>) -> Self {
        self.connect_paths.push(path.into());
        self
    }

    /// Serve `{"status":"ok"}` at `path`.
    pub fn with_health(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Cancel every in-flight run when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Enable or disable the permissive CORS layer (enabled by default).
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    /// Build the router with all configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoEndpoints`] when no transport is configured,
    /// and [`BuildError::InvalidPath`] / [`BuildError::DuplicatePath`] for
    /// paths axum would refuse.
    pub fn build(self) -> Result<Router, BuildError> {
        #[cfg(feature = "connect")]
        let has_endpoints = !self.sse_paths.is_empty() || !self.connect_paths.is_empty();
        #[cfg(not(feature = "connect"))]
        let has_endpoints = !self.sse_paths.is_empty();

        if !has_endpoints {
            return Err(BuildError::NoEndpoints);
        }

        let mut seen = HashSet::new();
        let mut check = |path: &str| -> Result<(), BuildError> {
            if !path.starts_with('/') {
                return Err(BuildError::InvalidPath(path.to_string()));
            }
            if !seen.insert(path.to_string()) {
                return Err(BuildError::DuplicatePath(path.to_string()));
            }
            Ok(())
        };

        let mut router = Router::new();

        for path in &self.sse_paths {
            check(path)?;
            router = router.route(path, stream_endpoint(post(sse_handler)));
        }

        #[cfg(feature = "connect")]
        for path in &self.connect_paths {
            use crate::transport::connect::connect_handler;

            check(path)?;
            router = router.route(path, stream_endpoint(post(connect_handler)));
        }

        if let Some(path) = &self.health_path {
            check(path)?;
            router = router.route(path, get(health_handler));
        }

        let state = AppState::new(self.orchestrator, self.shutdown);
        let mut router = router.with_state(state).layer(TraceLayer::new_for_http());

        if self.cors {
            router = router.layer(cors_layer());
        }

        Ok(router)
    }
}

/// POST plus a plain OPTIONS answer; anything else is a 405.
fn stream_endpoint(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .options(preflight_handler)
        .fallback(method_not_allowed)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("connect-protocol-version"),
        ])
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
