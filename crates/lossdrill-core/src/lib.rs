//! # Lossdrill Core
//!
//! Core types and the workflow for simulated data loss drills: sample rows
//! from a table, back them up, delete them, then restore them.
//!
//! The database side is behind the [`TableStore`] trait; see
//! `lossdrill-postgres` for the PostgreSQL implementation.

pub mod drill;
pub mod error;
pub mod identifiers;
pub mod keys;
pub mod naming;
pub mod plan;
pub mod report;
pub mod sampling;
pub mod stage;
pub mod store;

pub use drill::{Drill, run_simulation};
pub use error::{DrillError, DrillResult, RestoreFailure};
pub use identifiers::{ColumnName, InvalidIdentifier, TableName};
pub use keys::{PrimaryKey, SampleSet};
pub use naming::{BackupName, resolve_backup_name};
pub use plan::SimulationPlan;
pub use report::{SimulationReport, StatusEvent};
pub use sampling::sample_keys;
pub use stage::SimulationStage;
pub use store::TableStore;
