//! Workflow stages

use serde::{Deserialize, Serialize};

/// Stages of one simulation run, in the only order they can be reached.
///
/// `Configured` is the state before a connection exists; the remaining
/// stages follow `Connected → Sampled → BackupNamed → BackedUp → Deleted →
/// Restored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStage {
    Configured,
    Connected,
    Sampled,
    BackupNamed,
    BackedUp,
    Deleted,
    Restored,
}

impl SimulationStage {
    /// The stage a successful transition from this one reaches, if any.
    pub fn next(self) -> Option<Self> {
        use SimulationStage::*;
        match self {
            Configured => Some(Connected),
            Connected => Some(Sampled),
            Sampled => Some(BackupNamed),
            BackupNamed => Some(BackedUp),
            BackedUp => Some(Deleted),
            Deleted => Some(Restored),
            Restored => None,
        }
    }

    /// Whether the target table may differ from its pre-run contents.
    ///
    /// Only the window between deletion and restoration loses data.
    pub fn target_has_missing_rows(self) -> bool {
        self == SimulationStage::Deleted
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimulationStage::Configured => "configured",
            SimulationStage::Connected => "connected",
            SimulationStage::Sampled => "sampled",
            SimulationStage::BackupNamed => "backup_named",
            SimulationStage::BackedUp => "backed_up",
            SimulationStage::Deleted => "deleted",
            SimulationStage::Restored => "restored",
        }
    }
}

impl std::fmt::Display for SimulationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_form_a_single_chain() {
        let mut stage = SimulationStage::Configured;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited.len(), 7);
        assert_eq!(stage, SimulationStage::Restored);
    }

    #[test]
    fn test_only_deleted_stage_loses_rows() {
        assert!(SimulationStage::Deleted.target_has_missing_rows());
        assert!(!SimulationStage::BackedUp.target_has_missing_rows());
        assert!(!SimulationStage::Restored.target_has_missing_rows());
    }
}
