//! [`TableStore`] over a PostgreSQL session
//!
//! Each step runs in its own transaction and commits before returning, so
//! a failed step leaves nothing half-done. There is no transaction spanning
//! steps: once the delete commits, the rows live only in the backup table
//! until the restore commits.

use std::collections::HashSet;

use async_trait::async_trait;
use lossdrill_core::error::{DrillError, DrillResult, RestoreFailure};
use lossdrill_core::identifiers::{ColumnName, TableName};
use lossdrill_core::keys::{PrimaryKey, SampleSet};
use lossdrill_core::store::TableStore;
use tokio_postgres::Transaction;
use tracing::debug;

use crate::session::{PgSession, describe_pg_error};
use crate::sql;

/// PostgreSQL implementation of every workflow step.
pub struct PostgresTableStore {
    session: PgSession,
}

impl PostgresTableStore {
    pub fn new(session: PgSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &PgSession {
        &self.session
    }

    /// Close the underlying session.
    pub async fn close(self) {
        self.session.close().await;
    }
}

/// Columns of `table` that take explicit values on insert.
async fn insertable_columns(
    tx: &Transaction<'_>,
    table: &TableName,
) -> Result<Vec<String>, tokio_postgres::Error> {
    let quoted = table.quoted();
    let rows = tx.query(sql::INSERTABLE_COLUMNS, &[&quoted]).await?;
    rows.iter().map(|row| row.try_get::<_, String>(0)).collect()
}

#[async_trait]
impl TableStore for PostgresTableStore {
    async fn primary_keys(
        &mut self,
        table: &TableName,
        primary_key: &ColumnName,
    ) -> DrillResult<Vec<PrimaryKey>> {
        let scan_error = |e: tokio_postgres::Error| DrillError::KeyScan {
            table: table.to_string(),
            reason: describe_pg_error(&e),
        };

        let rows = self
            .session
            .client()
            .query(&sql::select_keys(table, primary_key), &[])
            .await
            .map_err(scan_error)?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            // A NULL key means the column is not really a primary key
            let value: Option<String> = row.try_get(0).map_err(scan_error)?;
            match value {
                Some(text) => keys.push(PrimaryKey::new(text)),
                None => {
                    return Err(DrillError::KeyScan {
                        table: table.to_string(),
                        reason: format!("column '{}' contains NULL values", primary_key),
                    });
                }
            }
        }

        debug!(table = %table, keys = keys.len(), "Read key population");
        Ok(keys)
    }

    async fn existing_tables(&mut self) -> DrillResult<HashSet<String>> {
        let rows = self
            .session
            .client()
            .query(sql::LIST_RELATIONS, &[])
            .await
            .map_err(|e| DrillError::Catalog {
                reason: describe_pg_error(&e),
            })?;

        rows.iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| DrillError::Catalog {
                reason: describe_pg_error(&e),
            })
    }

    async fn create_backup(
        &mut self,
        target: &TableName,
        backup: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64> {
        let write_error = |reason: String| DrillError::BackupWrite {
            table: backup.to_string(),
            reason,
        };
        let pg_error = |e: tokio_postgres::Error| write_error(describe_pg_error(&e));

        let tx = self
            .session
            .client_mut()
            .transaction()
            .await
            .map_err(pg_error)?;

        tx.batch_execute(&sql::create_backup_table(backup, target))
            .await
            .map_err(pg_error)?;

        let columns = insertable_columns(&tx, backup).await.map_err(pg_error)?;
        let copied = tx
            .execute(
                &sql::copy_rows(backup, target, primary_key, &columns),
                &[&keys.to_text_params()],
            )
            .await
            .map_err(pg_error)?;

        // Dropping the transaction rolls back the CREATE TABLE as well
        if copied != keys.len() as u64 {
            return Err(write_error(format!(
                "copied {} row(s) but {} key(s) were sampled; rows changed since sampling",
                copied,
                keys.len()
            )));
        }

        tx.commit().await.map_err(pg_error)?;
        Ok(copied)
    }

    async fn delete_rows(
        &mut self,
        target: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64> {
        let pg_error = |e: tokio_postgres::Error| DrillError::Delete {
            table: target.to_string(),
            reason: describe_pg_error(&e),
        };

        let tx = self
            .session
            .client_mut()
            .transaction()
            .await
            .map_err(pg_error)?;
        let deleted = tx
            .execute(
                &sql::delete_rows(target, primary_key),
                &[&keys.to_text_params()],
            )
            .await
            .map_err(pg_error)?;
        tx.commit().await.map_err(pg_error)?;

        Ok(deleted)
    }

    async fn restore_rows(
        &mut self,
        target: &TableName,
        backup: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64> {
        let pg_error = |e: tokio_postgres::Error| DrillError::Restore {
            table: target.to_string(),
            failure: RestoreFailure::Statement(describe_pg_error(&e)),
        };
        let params = keys.to_text_params();

        let tx = self
            .session
            .client_mut()
            .transaction()
            .await
            .map_err(pg_error)?;

        let present = tx
            .query(&sql::present_keys(target, primary_key), &[&params])
            .await
            .map_err(pg_error)?;
        if !present.is_empty() {
            let conflicting = present
                .iter()
                .map(|row| row.try_get::<_, String>(0).map(PrimaryKey::new))
                .collect::<Result<Vec<_>, _>>()
                .map_err(pg_error)?;
            return Err(DrillError::Restore {
                table: target.to_string(),
                failure: RestoreFailure::KeyConflict {
                    keys: SampleSet::new(conflicting).as_slice().to_vec(),
                },
            });
        }

        let columns = insertable_columns(&tx, target).await.map_err(pg_error)?;
        let restored = tx
            .execute(
                &sql::copy_rows(target, backup, primary_key, &columns),
                &[&params],
            )
            .await
            .map_err(pg_error)?;
        tx.commit().await.map_err(pg_error)?;

        Ok(restored)
    }
}
