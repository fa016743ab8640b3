//! Error types for the AG-UI server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// No endpoints were configured.
    #[error("No endpoints configured. Call .with_sse() or .with_connect() before .build()")]
    NoEndpoints,

    /// A route path does not start with `/`.
    #[error("Invalid route path '{0}': paths must start with '/'")]
    InvalidPath(String),

    /// The same path was registered twice.
    #[error("Route path '{0}' registered more than once")]
    DuplicatePath(String),
}

/// Errors returned to HTTP clients before any event is streamed.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The endpoint does not accept this HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request body has a content type no codec understands.
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
