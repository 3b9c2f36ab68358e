//! # In-Memory Table Store
//!
//! A small relational model that honours the same contract as the
//! PostgreSQL store: all-or-nothing steps, key conflicts on restore, backup
//! tables that mirror the source schema. Steps can be made to fail on
//! demand, and every call is recorded so tests can check ordering.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use lossdrill_core::error::{DrillError, DrillResult, RestoreFailure};
use lossdrill_core::identifiers::{ColumnName, TableName};
use lossdrill_core::keys::{PrimaryKey, SampleSet};
use lossdrill_core::store::TableStore;

/// One row: column values in column order, `None` for NULL
pub type Row = Vec<Option<String>>;

/// The store operations, in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    PrimaryKeys,
    ExistingTables,
    CreateBackup,
    DeleteRows,
    RestoreRows,
}

/// A table held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemTable {
    columns: Vec<String>,
    primary_key: Option<String>,
    rows: Vec<Row>,
}

impl MemTable {
    /// Create an empty table. `primary_key` names the column
    /// [`MemTable::sorted_rows`] orders by; key uniqueness is not checked.
    pub fn new(columns: &[&str], primary_key: Option<&str>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            primary_key: primary_key.map(str::to_string),
            rows: Vec::new(),
        }
    }

    /// Add a row of non-NULL values
    pub fn with_row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|v| Some(v.to_string())).collect());
        self
    }

    /// Add a row that may contain NULLs
    pub fn with_nullable_row(mut self, values: Row) -> Self {
        self.rows.push(values);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Rows sorted by key, for order-insensitive comparison
    pub fn sorted_rows(&self) -> Vec<Row> {
        let mut rows = self.rows.clone();
        match self.primary_key.as_deref().and_then(|pk| self.column_index(pk)) {
            Some(idx) => rows.sort_by_key(|row| self.key_of(row, idx)),
            None => rows.sort(),
        }
        rows
    }

    fn key_of(&self, row: &Row, idx: usize) -> Option<PrimaryKey> {
        row.get(idx).cloned().flatten().map(PrimaryKey::new)
    }
}

/// In-memory [`TableStore`] with fault injection and call recording.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableStore {
    tables: BTreeMap<String, MemTable>,
    failures: HashSet<StoreCall>,
    calls: Vec<StoreCall>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table
    pub fn with_table(mut self, name: &str, table: MemTable) -> Self {
        self.tables.insert(name.to_string(), table);
        self
    }

    /// Make every call of `call` fail
    pub fn with_failure(mut self, call: StoreCall) -> Self {
        self.failures.insert(call);
        self
    }

    pub fn table(&self, name: &str) -> Option<&MemTable> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    fn record(&mut self, call: StoreCall) -> Result<(), String> {
        self.calls.push(call);
        if self.failures.contains(&call) {
            Err(format!("injected failure in {:?}", call))
        } else {
            Ok(())
        }
    }

    fn lookup(&self, table: &TableName) -> Result<&MemTable, String> {
        self.tables
            .get(table.as_str())
            .ok_or_else(|| format!("relation \"{}\" does not exist", table))
    }

    fn key_column(table: &MemTable, name: &TableName, column: &ColumnName) -> Result<usize, String> {
        table
            .column_index(column.as_str())
            .ok_or_else(|| format!("column \"{}\" of relation \"{}\" does not exist", column, name))
    }

    /// Rows of `source` whose key is in `keys`, projected onto the columns
    /// of `destination` by name.
    fn select_for_copy(
        source: &MemTable,
        source_name: &TableName,
        destination: &MemTable,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> Result<Vec<Row>, String> {
        let key_idx = Self::key_column(source, source_name, primary_key)?;
        let mapping = destination
            .columns
            .iter()
            .map(|c| {
                source
                    .column_index(c)
                    .ok_or_else(|| format!("column \"{}\" does not exist in \"{}\"", c, source_name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(source
            .rows
            .iter()
            .filter(|row| {
                source
                    .key_of(row, key_idx)
                    .is_some_and(|key| keys.contains(&key))
            })
            .map(|row| {
                mapping
                    .iter()
                    .map(|&i| row.get(i).cloned().flatten())
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn primary_keys(
        &mut self,
        table: &TableName,
        primary_key: &ColumnName,
    ) -> DrillResult<Vec<PrimaryKey>> {
        let scan_error = |reason: String| DrillError::KeyScan {
            table: table.to_string(),
            reason,
        };
        self.record(StoreCall::PrimaryKeys).map_err(scan_error)?;

        let mem = self.lookup(table).map_err(scan_error)?;
        let idx = Self::key_column(mem, table, primary_key).map_err(scan_error)?;
        mem.rows
            .iter()
            .map(|row| {
                mem.key_of(row, idx).ok_or_else(|| {
                    scan_error(format!("column '{}' contains NULL values", primary_key))
                })
            })
            .collect()
    }

    async fn existing_tables(&mut self) -> DrillResult<HashSet<String>> {
        self.record(StoreCall::ExistingTables)
            .map_err(|reason| DrillError::Catalog { reason })?;
        Ok(self.tables.keys().cloned().collect())
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
        self.record(StoreCall::CreateBackup).map_err(write_error)?;

        if self.tables.contains_key(backup.as_str()) {
            return Err(write_error(format!("relation \"{}\" already exists", backup)));
        }
        let source = self.lookup(target).map_err(write_error)?;

        let mut copy = MemTable {
            columns: source.columns.clone(),
            primary_key: source.primary_key.clone(),
            rows: Vec::new(),
        };
        let rows = Self::select_for_copy(source, target, &copy, primary_key, keys)
            .map_err(write_error)?;
        copy.rows = rows;

        if copy.rows.len() != keys.len() {
            return Err(write_error(format!(
                "copied {} row(s) but {} key(s) were sampled; rows changed since sampling",
                copy.rows.len(),
                keys.len()
            )));
        }

        let copied = copy.rows.len() as u64;
        self.tables.insert(backup.to_string(), copy);
        Ok(copied)
    }

    async fn delete_rows(
        &mut self,
        target: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64> {
        let delete_error = |reason: String| DrillError::Delete {
            table: target.to_string(),
            reason,
        };
        self.record(StoreCall::DeleteRows).map_err(delete_error)?;

        let mem = self
            .tables
            .get_mut(target.as_str())
            .ok_or_else(|| delete_error(format!("relation \"{}\" does not exist", target)))?;
        let idx = mem
            .column_index(primary_key.as_str())
            .ok_or_else(|| delete_error(format!("column \"{}\" does not exist", primary_key)))?;

        let before = mem.rows.len();
        mem.rows.retain(|row| {
            !row.get(idx)
                .cloned()
                .flatten()
                .is_some_and(|key| keys.contains(&PrimaryKey::new(key)))
        });
        Ok((before - mem.rows.len()) as u64)
    }

    async fn restore_rows(
        &mut self,
        target: &TableName,
        backup: &TableName,
        primary_key: &ColumnName,
        keys: &SampleSet,
    ) -> DrillResult<u64> {
        let restore_error = |reason: String| DrillError::Restore {
            table: target.to_string(),
            failure: RestoreFailure::Statement(reason),
        };
        self.record(StoreCall::RestoreRows).map_err(restore_error)?;

        let destination = self.lookup(target).map_err(restore_error)?;
        let key_idx =
            Self::key_column(destination, target, primary_key).map_err(restore_error)?;

        let conflicting: Vec<PrimaryKey> = destination
            .rows
            .iter()
            .filter_map(|row| destination.key_of(row, key_idx))
            .filter(|key| keys.contains(key))
            .collect();
        if !conflicting.is_empty() {
            return Err(DrillError::Restore {
                table: target.to_string(),
                failure: RestoreFailure::KeyConflict {
                    keys: SampleSet::new(conflicting).as_slice().to_vec(),
                },
            });
        }

        let source = self.lookup(backup).map_err(restore_error)?;
        let rows = Self::select_for_copy(source, backup, destination, primary_key, keys)
            .map_err(restore_error)?;

        let restored = rows.len() as u64;
        if let Some(mem) = self.tables.get_mut(target.as_str()) {
            mem.rows.extend(rows);
        }
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> (TableName, TableName, ColumnName) {
        (
            TableName::new("people").unwrap(),
            TableName::new("people_backup").unwrap(),
            ColumnName::new("id").unwrap(),
        )
    }

    fn people() -> InMemoryTableStore {
        InMemoryTableStore::new().with_table(
            "people",
            MemTable::new(&["id", "name"], Some("id"))
                .with_row(&["1", "ada"])
                .with_row(&["2", "grace"])
                .with_row(&["3", "edsger"]),
        )
    }

    fn keys(values: &[i64]) -> SampleSet {
        SampleSet::new(values.iter().map(|&v| PrimaryKey::from(v)).collect())
    }

    #[tokio::test]
    async fn test_backup_copies_only_sampled_rows() {
        let (target, backup, pk) = names();
        let mut store = people();

        let copied = store
            .create_backup(&target, &backup, &pk, &keys(&[1, 3]))
            .await
            .unwrap();

        assert_eq!(copied, 2);
        let copy = store.table("people_backup").unwrap();
        assert_eq!(copy.columns(), ["id", "name"]);
        assert_eq!(copy.len(), 2);
    }

    #[tokio::test]
    async fn test_backup_missing_rows_leaves_no_table() {
        let (target, backup, pk) = names();
        let mut store = people();

        let err = store
            .create_backup(&target, &backup, &pk, &keys(&[1, 99]))
            .await
            .unwrap_err();

        assert!(matches!(err, DrillError::BackupWrite { .. }));
        assert!(store.table("people_backup").is_none());
    }

    #[tokio::test]
    async fn test_restore_refuses_present_keys() {
        let (target, backup, pk) = names();
        let mut store = people();
        store
            .create_backup(&target, &backup, &pk, &keys(&[2]))
            .await
            .unwrap();

        let err = store
            .restore_rows(&target, &backup, &pk, &keys(&[2]))
            .await
            .unwrap_err();

        match err {
            DrillError::Restore {
                failure: RestoreFailure::KeyConflict { keys },
                ..
            } => assert_eq!(keys, vec![PrimaryKey::from(2_i64)]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.table("people").unwrap().len(), 3);
    }

    #[test]
    fn test_sorted_rows_orders_by_key_without_checking_uniqueness() {
        let table = MemTable::new(&["id", "name"], Some("id"))
            .with_row(&["10", "b"])
            .with_row(&["9", "a"])
            .with_row(&["10", "c"]);

        let keys: Vec<_> = table
            .sorted_rows()
            .into_iter()
            .map(|row| row[0].clone().unwrap())
            .collect();
        assert_eq!(keys, ["9", "10", "10"]);
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_null_key_fails_scan() {
        let (target, _, pk) = names();
        let mut store = InMemoryTableStore::new().with_table(
            "people",
            MemTable::new(&["id", "name"], None).with_nullable_row(vec![None, Some("x".into())]),
        );

        let err = store.primary_keys(&target, &pk).await.unwrap_err();
        assert!(matches!(err, DrillError::KeyScan { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let mut store = people().with_failure(StoreCall::ExistingTables);

        let err = store.existing_tables().await.unwrap_err();
        assert!(matches!(err, DrillError::Catalog { .. }));
        assert_eq!(store.calls(), [StoreCall::ExistingTables]);
    }
}
