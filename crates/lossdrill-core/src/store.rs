//! The database operations a simulation run needs
//!
//! [`TableStore`] is the seam between the workflow and a concrete database.
//! Every method maps to exactly one workflow step, and each one either
//! completes fully or leaves the database as it found it.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::DrillResult;
use crate::identifiers::{ColumnName, TableName};
use crate::keys::{PrimaryKey, SampleSet};

#[async_trait]
pub trait TableStore: Send {
    /// Every primary key value of `table`, in no particular order.
    ///
    /// Fails with `DrillError::KeyScan`.
    async fn primary_keys(
        &mut self,
        table: &TableName,
        primary_key: &ColumnName,
    ) -> DrillResult<Vec<PrimaryKey>>;

    /// Names of the relations a new table would collide with.
    ///
    /// Fails with `DrillError::Catalog`.
    async fn existing_tables(&mut self) -> DrillResult<HashSet<String>>;

    /// Create `backup` with the full schema of `target` and copy the rows
    /// whose key is in `keys` into it. Returns the number of rows copied,
    /// which always equals `keys.len()`.
    ///
    /// Fails with `DrillError::BackupWrite`; on failure no backup table is
    /// left behind.
    async fn create_backup(
        &mut self,
        target: &TableName,
        backup: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64>;

    /// Delete the rows of `target` whose key is in `keys`. Returns the
    /// number of rows deleted.
    ///
    /// Fails with `DrillError::Delete`.
    async fn delete_rows(
        &mut self,
        target: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64>;

    /// Copy the rows whose key is in `keys` from `backup` back into
    /// `target`. Returns the number of rows restored.
    ///
    /// Fails with `DrillError::Restore`. If any of the keys is already
    /// present in `target` nothing is inserted and the failure is
    /// `RestoreFailure::KeyConflict`.
    async fn restore_rows(
        &mut self,
        target: &TableName,
        backup: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64>;
}
