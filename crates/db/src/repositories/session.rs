use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use expenso_core::domain::session::{Session, SessionEvent, SessionEventKind, SessionId};

use super::{RepositoryError, SessionRepository};
use crate::DbPool;

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn create(&self, session: Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&session.id.0)
        .bind(&session.user_id)
        .bind(session.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, created_at
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|value| session_from_row(&value)).transpose()
    }

    async fn append_event(
        &self,
        session_id: &SessionId,
        kind: SessionEventKind,
        payload: serde_json::Value,
    ) -> Result<SessionEvent, RepositoryError> {
        if self.find_by_id(session_id).await?.is_none() {
            return Err(RepositoryError::SessionNotFound(session_id.0.clone()));
        }

        let created_at = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO session_events (session_id, kind, payload, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&session_id.0)
        .bind(kind.as_str())
        .bind(payload.to_string())
        .bind(created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(SessionEvent {
            id: row.get::<i64, _>("id"),
            session_id: session_id.clone(),
            kind,
            payload,
            created_at,
        })
    }

    async fn list_events(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<SessionEvent>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, kind, payload, created_at
            FROM session_events
            WHERE session_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(&session_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}

fn session_from_row(row: &SqliteRow) -> Result<Session, RepositoryError> {
    Ok(Session {
        id: SessionId(row.get::<String, _>("id")),
        user_id: row.get::<String, _>("user_id"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn event_from_row(row: &SqliteRow) -> Result<SessionEvent, RepositoryError> {
    let kind_raw = row.get::<String, _>("kind");
    let kind = SessionEventKind::parse(&kind_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown event kind `{kind_raw}`")))?;

    let payload_raw = row.get::<String, _>("payload");
    let payload = serde_json::from_str(&payload_raw)
        .map_err(|err| RepositoryError::Decode(format!("event payload is not valid JSON: {err}")))?;

    Ok(SessionEvent {
        id: row.get::<i64, _>("id"),
        session_id: SessionId(row.get::<String, _>("session_id")),
        kind,
        payload,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Decode(format!("invalid timestamp `{raw}`: {err}")))
}
