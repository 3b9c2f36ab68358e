//! Console status lines and the end-of-run report

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identifiers::TableName;
use crate::keys::SampleSet;
use crate::naming::BackupName;

/// A user-facing status line emitted as the workflow progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The requested backup name was taken and a suffixed one was chosen
    BackupRenamed { requested: TableName, chosen: TableName },
    /// Sampled rows were copied into the backup table
    BackedUp { backup: TableName, keys: SampleSet },
    /// Sampled rows were deleted from the target table
    Removed { keys: SampleSet },
    /// Sampled rows were copied back into the target table
    Restored { keys: SampleSet },
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusEvent::BackupRenamed { chosen, .. } => write!(
                f,
                "Backup table name already exists. It will be renamed to {}.",
                chosen
            ),
            StatusEvent::BackedUp { backup, keys } => write!(
                f,
                "These records {} are backed up successfully to {}.",
                keys, backup
            ),
            StatusEvent::Removed { keys } => write!(f, "Records {} removed successfully.", keys),
            StatusEvent::Restored { keys } => write!(f, "Records {} restored successfully.", keys),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub table: TableName,
    pub backup: BackupName,
    pub sampled: SampleSet,
    pub backed_up: u64,
    pub deleted: u64,
    pub restored: u64,
}

impl SimulationReport {
    /// Every sampled row went out and came back.
    pub fn is_complete(&self) -> bool {
        let expected = self.sampled.len() as u64;
        self.backed_up == expected && self.deleted == expected && self.restored == expected
    }
}
