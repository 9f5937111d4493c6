use std::sync::Arc;

use expenso_agent::search::{HttpPolicySearch, PolicySearch, SearchError, StaticPolicySearch};
use expenso_agent::AgentRuntime;
use expenso_core::config::{AppConfig, ConfigError, LoadOptions};
use expenso_db::{connect, migrations, DbPool, SessionRepository, SqlSessionRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub agent_runtime: Arc<AgentRuntime>,
    pub sessions: Arc<dyn SessionRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("policy search setup failed: {0}")]
    Search(#[source] SearchError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let search: Arc<dyn PolicySearch> = if config.search.enabled {
        Arc::new(HttpPolicySearch::from_config(&config.search).map_err(BootstrapError::Search)?)
    } else {
        Arc::new(StaticPolicySearch)
    };
    info!(
        event_name = "system.bootstrap.policy_search_ready",
        correlation_id = "bootstrap",
        backend = if config.search.enabled { "http" } else { "static" },
        "policy search backend initialized"
    );

    let sessions: Arc<dyn SessionRepository> = Arc::new(SqlSessionRepository::new(db_pool.clone()));

    Ok(Application {
        config,
        db_pool,
        agent_runtime: Arc::new(AgentRuntime::with_default_tools(search)),
        sessions,
    })
}
