use std::time::Duration;

use expenso_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

/// Opens the session-store pool described by `config`. The pragmas run on
/// every new connection: foreign keys back the session_events cascade, WAL
/// keeps history reads available while the server appends events, and the
/// busy timeout makes concurrent appends queue instead of failing.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Single-connection pool for an ephemeral database url, as used by tests
/// against `sqlite::memory:`.
pub async fn connect_ephemeral(url: &str) -> Result<DbPool, sqlx::Error> {
    let config =
        DatabaseConfig { url: url.to_string(), max_connections: 1, timeout_secs: 30 };
    connect(&config).await
}
