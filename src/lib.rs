//! # Lossdrill
//!
//! Simulated data loss drills for PostgreSQL: sample rows from a table,
//! back them up to a uniquely named table, delete them, then restore them.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`core`]: plan, identifiers, sampling, backup naming and the drill workflow
//! - [`postgres`]: the PostgreSQL table store and connection handling

pub use lossdrill_core as core;
pub use lossdrill_postgres as postgres;

pub use lossdrill_core::{
    Drill, DrillError, DrillResult, PrimaryKey, SampleSet, SimulationPlan, SimulationReport,
    StatusEvent, TableStore, run_simulation,
};
