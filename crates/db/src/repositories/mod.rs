use async_trait::async_trait;
use thiserror::Error;

use expenso_core::domain::session::{Session, SessionEvent, SessionEventKind, SessionId};

pub mod memory;
pub mod session;

pub use memory::InMemorySessionRepository;
pub use session::SqlSessionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Appends one event and returns it with its storage-assigned id.
    /// Fails with `SessionNotFound` when the session does not exist.
    async fn append_event(
        &self,
        session_id: &SessionId,
        kind: SessionEventKind,
        payload: serde_json::Value,
    ) -> Result<SessionEvent, RepositoryError>;

    /// Events for a session in append order.
    async fn list_events(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<SessionEvent>, RepositoryError>;
}
