//! A single PostgreSQL session with scoped release
//!
//! `tokio_postgres` splits a connection into a `Client` and a connection
//! future that must be polled. [`PgSession`] owns both: `close()` drops the
//! client and waits for the connection to wind down, and dropping the
//! session on any other path aborts the connection task.

use lossdrill_core::error::{DrillError, DrillResult};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use crate::config::PostgresConfig;

/// Render a driver error, including the SQLSTATE when the server sent one.
pub fn describe_pg_error(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => format!("{} (SQLSTATE {})", db.message(), db.code().code()),
        None => error.to_string(),
    }
}

/// An open, validated connection.
pub struct PgSession {
    client: Client,
    connection: Option<JoinHandle<()>>,
    server_version: String,
}

impl PgSession {
    /// Open a connection and check it answers queries.
    ///
    /// Fails with `DrillError::InvalidConfig` before any network traffic if
    /// the config is malformed, and with `DrillError::Connection` for
    /// network, authentication or server errors.
    pub async fn connect(config: &PostgresConfig) -> DrillResult<Self> {
        config.validate()?;

        let (client, connection) = config
            .build_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| DrillError::Connection {
                reason: describe_pg_error(&e),
            })?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        let mut session = Self {
            client,
            connection: Some(handle),
            server_version: String::new(),
        };

        // Dropping `session` on this error path aborts the connection task
        session.server_version = session
            .client
            .query_one("SELECT version()", &[])
            .await
            .and_then(|row| row.try_get::<_, String>(0))
            .map_err(|e| DrillError::Connection {
                reason: describe_pg_error(&e),
            })?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            server_version = %session.server_version,
            "Connected to PostgreSQL"
        );

        Ok(session)
    }

    /// Get reference to the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get mutable reference to the underlying client
    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    /// `version()` as reported when the session was opened
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Close the session and wait for the connection task to finish.
    pub async fn close(mut self) {
        let handle = self.connection.take();
        drop(self);
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!(error = %e, "Connection task ended abnormally");
            }
        }
        debug!("PostgreSQL session closed");
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        if let Some(handle) = self.connection.take() {
            handle.abort();
        }
    }
}
