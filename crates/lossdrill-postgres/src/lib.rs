//! PostgreSQL backend for lossdrill
//!
//! - [`PostgresConfig`]: connection parameters with validation and URL parsing
//! - [`PgSession`]: one connection, released on every exit path
//! - [`PostgresTableStore`]: every workflow step as transactional SQL

pub mod config;
pub mod session;
pub mod sql;
pub mod store;

pub use config::PostgresConfig;
pub use session::{PgSession, describe_pg_error};
pub use store::PostgresTableStore;

use lossdrill_core::error::DrillResult;

/// Open a session and wrap it as a [`PostgresTableStore`].
pub async fn connect(config: &PostgresConfig) -> DrillResult<PostgresTableStore> {
    PgSession::connect(config).await.map(PostgresTableStore::new)
}
