//! Session lookup for the agent runner.
//!
//! A session holds the runner's conversation memory for one thread. The
//! thread ID doubles as the session ID so consecutive runs on a thread
//! share history.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// A runner session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID.
    pub id: String,
    /// Application the session belongs to.
    pub app_name: String,
    /// Owning user.
    pub user_id: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Storage backend for sessions.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Look up a session by ID.
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError>;

    /// Create a session, using `session_id` when given.
    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Session, SessionError>;
}

/// Sessions kept in process memory.
#[derive(Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// True when no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Session, SessionError> {
        let id = session_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let session = Session {
            id: id.clone(),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.sessions.write().insert(id, session.clone());
        Ok(session)
    }
}

/// Get-or-create front for a [`SessionService`].
#[derive(Clone)]
pub struct SessionManager {
    service: Arc<dyn SessionService>,
}

impl SessionManager {
    /// Wrap a session service.
    pub fn new(service: Arc<dyn SessionService>) -> Self {
        Self { service }
    }

    /// A manager backed by [`InMemorySessionService`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySessionService::new()))
    }

    /// The underlying service.
    pub fn service(&self) -> &Arc<dyn SessionService> {
        &self.service
    }

    /// Return the session for `session_id`, creating it if needed.
    ///
    /// A failed lookup is not fatal: it falls through to creating a new
    /// session. Only a failed create is returned as an error.
    ///
    /// ```rust
    /// use agui_core::SessionManager;
    ///
    /// # tokio_test::block_on(async {
    /// let sessions = SessionManager::in_memory();
    ///
    /// let first = sessions.get_or_create("app", "demo_user", "t1").await.unwrap();
    /// let again = sessions.get_or_create("app", "demo_user", "t1").await.unwrap();
    /// assert_eq!(first, again);
    /// # });
    /// ```
    pub async fn get_or_create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, SessionError> {
        if !session_id.is_empty() {
            match self.service.get(session_id).await {
                Ok(Some(session)) => return Ok(session),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "session lookup failed, creating new session");
                }
            }
        }

        let id = (!session_id.is_empty()).then_some(session_id);
        self.service.create(app_name, user_id, id).await
    }
}
