//! The simulation workflow as a typestate machine
//!
//! A run moves through `Connected → Sampled → BackupNamed → BackedUp →
//! Deleted → Restored`. Each transition consumes the previous state, so a
//! step can neither be skipped nor repeated, and `delete` only exists once a
//! backup has been written.

mod states;

pub use states::{BackedUp, BackupNamed, Connected, Deleted, DrillState, Restored, Sampled};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::DrillResult;
use crate::naming::resolve_backup_name;
use crate::plan::SimulationPlan;
use crate::report::{SimulationReport, StatusEvent};
use crate::sampling::sample_keys;
use crate::stage::SimulationStage;
use crate::store::TableStore;

/// One simulation run over a borrowed store.
pub struct Drill<'a, T, S = Connected>
where
    T: TableStore + ?Sized,
{
    store: &'a mut T,
    plan: SimulationPlan,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    pub state: S,
}

impl<T, S> Drill<'_, T, S>
where
    T: TableStore + ?Sized,
    S: DrillState,
{
    pub fn stage(&self) -> SimulationStage {
        S::STAGE
    }

    pub fn plan(&self) -> &SimulationPlan {
        &self.plan
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

impl<'a, T> Drill<'a, T, Connected>
where
    T: TableStore + ?Sized,
{
    pub fn new(store: &'a mut T, plan: SimulationPlan) -> Self {
        Self {
            store,
            plan,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: Connected,
        }
    }

    /// Read the key population and draw the sample.
    #[instrument(skip_all, fields(run_id = %self.run_id, table = %self.plan.table))]
    pub async fn sample<R>(self, rng: &mut R) -> DrillResult<Drill<'a, T, Sampled>>
    where
        R: Rng + ?Sized,
    {
        let population = self
            .store
            .primary_keys(&self.plan.table, &self.plan.primary_key)
            .await?;
        let population_size = population.len();
        let sample = sample_keys(rng, population, self.plan.sample_size)?;

        info!(
            population = population_size,
            sampled = sample.len(),
            "Sampled primary keys"
        );

        Ok(Drill {
            store: self.store,
            plan: self.plan,
            run_id: self.run_id,
            started_at: self.started_at,
            state: Sampled { sample },
        })
    }
}

impl<'a, T> Drill<'a, T, Sampled>
where
    T: TableStore + ?Sized,
{
    /// Resolve a backup table name that does not collide with any relation.
    #[instrument(skip_all, fields(run_id = %self.run_id, base = %self.plan.backup_table))]
    pub async fn name_backup(self) -> DrillResult<Drill<'a, T, BackupNamed>> {
        let existing = self.store.existing_tables().await?;
        let backup = resolve_backup_name(&self.plan.backup_table, &existing)?;

        if backup.was_renamed() {
            info!(chosen = %backup.name, "Backup table name taken, using suffixed name");
        }

        Ok(Drill {
            store: self.store,
            plan: self.plan,
            run_id: self.run_id,
            started_at: self.started_at,
            state: BackupNamed {
                sample: self.state.sample,
                backup,
            },
        })
    }
}

impl<'a, T> Drill<'a, T, BackupNamed>
where
    T: TableStore + ?Sized,
{
    /// Create the backup table and copy the sampled rows into it.
    #[instrument(skip_all, fields(run_id = %self.run_id, backup = %self.state.backup.name))]
    pub async fn back_up(self) -> DrillResult<Drill<'a, T, BackedUp>> {
        let backed_up = self
            .store
            .create_backup(
                &self.plan.table,
                &self.state.backup.name,
                &self.plan.primary_key,
                &self.state.sample,
            )
            .await?;

        info!(rows = backed_up, "Backup written");

        Ok(Drill {
            store: self.store,
            plan: self.plan,
            run_id: self.run_id,
            started_at: self.started_at,
            state: BackedUp {
                sample: self.state.sample,
                backup: self.state.backup,
                backed_up,
            },
        })
    }
}

impl<'a, T> Drill<'a, T, BackedUp>
where
    T: TableStore + ?Sized,
{
    /// Remove the sampled rows from the target table.
    #[instrument(skip_all, fields(run_id = %self.run_id, table = %self.plan.table))]
    pub async fn delete(self) -> DrillResult<Drill<'a, T, Deleted>> {
        let deleted = self
            .store
            .delete_rows(&self.plan.table, &self.plan.primary_key, &self.state.sample)
            .await?;

        if deleted != self.state.sample.len() as u64 {
            warn!(
                deleted,
                expected = self.state.sample.len(),
                "Deleted row count differs from sample size"
            );
        } else {
            info!(rows = deleted, "Sampled rows removed");
        }

        Ok(Drill {
            store: self.store,
            plan: self.plan,
            run_id: self.run_id,
            started_at: self.started_at,
            state: Deleted {
                sample: self.state.sample,
                backup: self.state.backup,
                backed_up: self.state.backed_up,
                deleted,
            },
        })
    }
}

impl<'a, T> Drill<'a, T, Deleted>
where
    T: TableStore + ?Sized,
{
    /// Copy the sampled rows back from the backup table.
    #[instrument(skip_all, fields(run_id = %self.run_id, table = %self.plan.table))]
    pub async fn restore(self) -> DrillResult<Drill<'a, T, Restored>> {
        let restored = self
            .store
            .restore_rows(
                &self.plan.table,
                &self.state.backup.name,
                &self.plan.primary_key,
                &self.state.sample,
            )
            .await?;

        if restored != self.state.sample.len() as u64 {
            warn!(
                restored,
                expected = self.state.sample.len(),
                "Restored row count differs from sample size"
            );
        } else {
            info!(rows = restored, "Sampled rows restored");
        }

        Ok(Drill {
            store: self.store,
            plan: self.plan,
            run_id: self.run_id,
            started_at: self.started_at,
            state: Restored {
                sample: self.state.sample,
                backup: self.state.backup,
                backed_up: self.state.backed_up,
                deleted: self.state.deleted,
                restored,
            },
        })
    }
}

impl<T> Drill<'_, T, Restored>
where
    T: TableStore + ?Sized,
{
    pub fn finish(self) -> SimulationReport {
        SimulationReport {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            table: self.plan.table,
            backup: self.state.backup,
            sampled: self.state.sample,
            backed_up: self.state.backed_up,
            deleted: self.state.deleted,
            restored: self.state.restored,
        }
    }
}

/// Run every step in order, reporting a status line after each one that
/// has something to tell the user.
///
/// The first failure ends the run; the database is left in whatever state
/// the failing step found it (see [`crate::DrillError::stage_reached`]).
pub async fn run_simulation<T, R, F>(
    store: &mut T,
    plan: SimulationPlan,
    rng: &mut R,
    mut on_status: F,
) -> DrillResult<SimulationReport>
where
    T: TableStore + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&StatusEvent),
{
    let drill = Drill::new(store, plan).sample(rng).await?;

    let drill = drill.name_backup().await?;
    if drill.state.backup.was_renamed() {
        on_status(&StatusEvent::BackupRenamed {
            requested: drill.plan.backup_table.clone(),
            chosen: drill.state.backup.name.clone(),
        });
    }

    let drill = drill.back_up().await?;
    on_status(&StatusEvent::BackedUp {
        backup: drill.state.backup.name.clone(),
        keys: drill.state.sample.clone(),
    });

    let drill = drill.delete().await?;
    on_status(&StatusEvent::Removed {
        keys: drill.state.sample.clone(),
    });

    let drill = drill.restore().await?;
    on_status(&StatusEvent::Restored {
        keys: drill.state.sample.clone(),
    });

    Ok(drill.finish())
}

