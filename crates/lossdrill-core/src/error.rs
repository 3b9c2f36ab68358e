//! Error types for the simulation workflow.
//!
//! Every failure is terminal: errors propagate to the entry point with `?`
//! and nothing is retried or rolled back across steps. Each variant knows
//! which stage the run had reached when it failed, so the caller can tell
//! whether the target table is left with missing rows.

use crate::identifiers::InvalidIdentifier;
use crate::keys::PrimaryKey;
use crate::stage::SimulationStage;

/// Why a restore was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreFailure {
    /// Some sampled keys are already present in the target table.
    KeyConflict { keys: Vec<PrimaryKey> },
    /// The database rejected a statement.
    Statement(String),
}

impl std::fmt::Display for RestoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreFailure::KeyConflict { keys } => {
                let rendered: Vec<&str> = keys.iter().map(PrimaryKey::as_str).collect();
                write!(
                    f,
                    "{} key(s) already present in target: [{}]",
                    keys.len(),
                    rendered.join(", ")
                )
            }
            RestoreFailure::Statement(reason) => f.write_str(reason),
        }
    }
}

/// Errors that can occur while running a simulation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DrillError {
    /// Configuration rejected before connecting.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A configured table or column name is not a valid identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Could not open or validate the database connection.
    #[error("Connection to database failed: {reason}")]
    Connection { reason: String },

    /// Reading the key population from the target table failed.
    #[error("Failed to read primary keys from '{table}': {reason}")]
    KeyScan { table: String, reason: String },

    /// Requested sample is larger than the key population.
    #[error("Sample size {requested} exceeds population of {population} row(s)")]
    InvalidSampleSize { requested: usize, population: usize },

    /// Listing existing relations failed.
    #[error("Failed to list existing tables: {reason}")]
    Catalog { reason: String },

    /// No valid backup name could be derived from the base name.
    #[error("Cannot derive a backup table name from '{base}': {source}")]
    BackupName {
        base: String,
        #[source]
        source: InvalidIdentifier,
    },

    /// Creating or filling the backup table failed.
    #[error("Failed to back up records to '{table}': {reason}")]
    BackupWrite { table: String, reason: String },

    /// Deleting sampled rows from the target table failed.
    #[error("Failed to remove records from '{table}': {reason}")]
    Delete { table: String, reason: String },

    /// Copying rows back from the backup table failed.
    #[error("Failed to restore records into '{table}': {failure}")]
    Restore {
        table: String,
        failure: RestoreFailure,
    },
}

impl DrillError {
    /// The last stage the run completed before this error.
    pub fn stage_reached(&self) -> SimulationStage {
        match self {
            DrillError::InvalidConfig { .. }
            | DrillError::InvalidIdentifier(_)
            | DrillError::Connection { .. } => SimulationStage::Configured,
            DrillError::KeyScan { .. } | DrillError::InvalidSampleSize { .. } => {
                SimulationStage::Connected
            }
            DrillError::Catalog { .. } | DrillError::BackupName { .. } => SimulationStage::Sampled,
            DrillError::BackupWrite { .. } => SimulationStage::BackupNamed,
            DrillError::Delete { .. } => SimulationStage::BackedUp,
            DrillError::Restore { .. } => SimulationStage::Deleted,
        }
    }

    /// Short, stable name of the error kind for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DrillError::InvalidConfig { .. } => "invalid_config",
            DrillError::InvalidIdentifier(_) => "invalid_identifier",
            DrillError::Connection { .. } => "connection",
            DrillError::KeyScan { .. } => "key_scan",
            DrillError::InvalidSampleSize { .. } => "invalid_sample_size",
            DrillError::Catalog { .. } => "catalog",
            DrillError::BackupName { .. } => "backup_name",
            DrillError::BackupWrite { .. } => "backup_write",
            DrillError::Delete { .. } => "delete",
            DrillError::Restore { .. } => "restore",
        }
    }
}

pub type DrillResult<T> = Result<T, DrillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_reached_per_kind() {
        let err = DrillError::InvalidSampleSize {
            requested: 11,
            population: 10,
        };
        assert_eq!(err.stage_reached(), SimulationStage::Connected);
        assert_eq!(err.kind(), "invalid_sample_size");

        let err = DrillError::Delete {
            table: "customers".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.stage_reached(), SimulationStage::BackedUp);

        let err = DrillError::Restore {
            table: "customers".to_string(),
            failure: RestoreFailure::Statement("boom".to_string()),
        };
        assert!(err.stage_reached().target_has_missing_rows());
    }

    #[test]
    fn test_messages_name_the_failure() {
        let err = DrillError::InvalidSampleSize {
            requested: 11,
            population: 10,
        };
        assert_eq!(
            err.to_string(),
            "Sample size 11 exceeds population of 10 row(s)"
        );

        let err = DrillError::Restore {
            table: "customers".to_string(),
            failure: RestoreFailure::KeyConflict {
                keys: vec![PrimaryKey::from(4_i64), PrimaryKey::from(7_i64)],
            },
        };
        assert_eq!(
            err.to_string(),
            "Failed to restore records into 'customers': 2 key(s) already present in target: [4, 7]"
        );
    }

    #[test]
    fn test_identifier_error_converts() {
        let err: DrillError = InvalidIdentifier::Empty.into();
        assert_eq!(err.stage_reached(), SimulationStage::Configured);
        assert!(err.to_string().contains("cannot be empty"));
    }
}
