use crate::keys::SampleSet;
use crate::naming::BackupName;
use crate::stage::SimulationStage;

/// Marker trait for workflow states
pub trait DrillState {
    const STAGE: SimulationStage;
}

/// A live connection, nothing read yet
#[derive(Debug, Clone)]
pub struct Connected;

/// Keys chosen for the simulated loss
#[derive(Debug, Clone)]
pub struct Sampled {
    pub sample: SampleSet,
}

/// Backup table name resolved, nothing written yet
#[derive(Debug, Clone)]
pub struct BackupNamed {
    pub sample: SampleSet,
    pub backup: BackupName,
}

/// Sampled rows copied into the backup table
#[derive(Debug, Clone)]
pub struct BackedUp {
    pub sample: SampleSet,
    pub backup: BackupName,
    pub backed_up: u64,
}

/// Sampled rows removed from the target table
#[derive(Debug, Clone)]
pub struct Deleted {
    pub sample: SampleSet,
    pub backup: BackupName,
    pub backed_up: u64,
    pub deleted: u64,
}

/// Sampled rows back in the target table
#[derive(Debug, Clone)]
pub struct Restored {
    pub sample: SampleSet,
    pub backup: BackupName,
    pub backed_up: u64,
    pub deleted: u64,
    pub restored: u64,
}

impl DrillState for Connected {
    const STAGE: SimulationStage = SimulationStage::Connected;
}
impl DrillState for Sampled {
    const STAGE: SimulationStage = SimulationStage::Sampled;
}
impl DrillState for BackupNamed {
    const STAGE: SimulationStage = SimulationStage::BackupNamed;
}
impl DrillState for BackedUp {
    const STAGE: SimulationStage = SimulationStage::BackedUp;
}
impl DrillState for Deleted {
    const STAGE: SimulationStage = SimulationStage::Deleted;
}
impl DrillState for Restored {
    const STAGE: SimulationStage = SimulationStage::Restored;
}
