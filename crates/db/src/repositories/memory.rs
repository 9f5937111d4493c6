use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use expenso_core::domain::session::{Session, SessionEvent, SessionEventKind, SessionId};

use super::{RepositoryError, SessionRepository};

/// In-memory stand-in for tests. Events share one id sequence, matching
/// the sqlite AUTOINCREMENT behavior.
#[derive(Default)]
pub struct InMemorySessionRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    events: Vec<SessionEvent>,
    next_event_id: i64,
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.id.0.clone(), session);
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(&id.0).cloned())
    }

    async fn append_event(
        &self,
        session_id: &SessionId,
        kind: SessionEventKind,
        payload: serde_json::Value,
    ) -> Result<SessionEvent, RepositoryError> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(&session_id.0) {
            return Err(RepositoryError::SessionNotFound(session_id.0.clone()));
        }

        inner.next_event_id += 1;
        let event = SessionEvent {
            id: inner.next_event_id,
            session_id: session_id.clone(),
            kind,
            payload,
            created_at: Utc::now(),
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn list_events(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<SessionEvent>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|event| event.session_id == *session_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use expenso_core::domain::session::{Session, SessionEventKind, SessionId};

    use crate::repositories::{InMemorySessionRepository, RepositoryError, SessionRepository};

    #[tokio::test]
    async fn in_memory_session_round_trip() {
        let repo = InMemorySessionRepository::default();
        let session = Session {
            id: SessionId("S-1".to_string()),
            user_id: "U100".to_string(),
            created_at: Utc::now(),
        };

        repo.create(session.clone()).await.expect("create session");
        let found = repo.find_by_id(&session.id).await.expect("find session");

        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn in_memory_events_are_scoped_per_session() {
        let repo = InMemorySessionRepository::default();
        for id in ["S-1", "S-2"] {
            repo.create(Session {
                id: SessionId(id.to_string()),
                user_id: "U100".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("create session");
        }

        let first = SessionId("S-1".to_string());
        let second = SessionId("S-2".to_string());
        repo.append_event(&first, SessionEventKind::Validation, json!({"is_valid": true}))
            .await
            .expect("append event");
        repo.append_event(&second, SessionEventKind::Summary, json!({"expense_count": 0}))
            .await
            .expect("append event");

        let events = repo.list_events(&first).await.expect("list events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, SessionEventKind::Validation);
    }

    #[tokio::test]
    async fn in_memory_append_checks_session_existence() {
        let repo = InMemorySessionRepository::default();

        let error = repo
            .append_event(&SessionId("ghost".to_string()), SessionEventKind::Validation, json!({}))
            .await
            .expect_err("append should fail");

        assert!(matches!(error, RepositoryError::SessionNotFound(_)));
    }
}
