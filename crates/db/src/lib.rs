pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_ephemeral, DbPool};
pub use repositories::{
    InMemorySessionRepository, RepositoryError, SessionRepository, SqlSessionRepository,
};
