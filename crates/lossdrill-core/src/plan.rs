//! What a simulation run operates on

use serde::{Deserialize, Serialize};

use crate::error::DrillResult;
use crate::identifiers::{ColumnName, TableName};

/// Target table, key column, backup base name and sample size for one run.
///
/// The default plan is the stock drill against `customers`: ten rows keyed
/// by `customer_id`, backed up under `customers_backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationPlan {
    /// Table rows are sampled from, deleted from and restored into
    pub table: TableName,
    /// Base name for the backup table, suffixed on collision
    pub backup_table: TableName,
    /// Primary key column of `table`
    pub primary_key: ColumnName,
    /// Number of rows to sample
    pub sample_size: usize,
}

impl SimulationPlan {
    pub const DEFAULT_TABLE: &'static str = "customers";
    pub const DEFAULT_BACKUP_TABLE: &'static str = "customers_backup";
    pub const DEFAULT_PRIMARY_KEY: &'static str = "customer_id";
    pub const DEFAULT_SAMPLE_SIZE: usize = 10;

    /// Build a plan from raw names, validating each identifier.
    pub fn new(
        table: impl Into<String>,
        backup_table: impl Into<String>,
        primary_key: impl Into<String>,
        sample_size: usize,
    ) -> DrillResult<Self> {
        Ok(Self {
            table: TableName::new(table)?,
            backup_table: TableName::new(backup_table)?,
            primary_key: ColumnName::new(primary_key)?,
            sample_size,
        })
    }
}

impl Default for SimulationPlan {
    fn default() -> Self {
        // Safety: the defaults are short plain identifiers
        Self {
            table: TableName::new_unchecked(Self::DEFAULT_TABLE),
            backup_table: TableName::new_unchecked(Self::DEFAULT_BACKUP_TABLE),
            primary_key: ColumnName::new_unchecked(Self::DEFAULT_PRIMARY_KEY),
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
        }
    }
}
