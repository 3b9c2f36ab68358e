//! Uniform sampling of primary keys

use rand::Rng;
use rand::seq::index;

use crate::error::{DrillError, DrillResult};
use crate::keys::{PrimaryKey, SampleSet};

/// Draw `size` distinct keys uniformly at random, without replacement.
///
/// The population is the full key column of the target table. Duplicate
/// values in the population would break distinctness, so they are removed
/// before drawing; a primary key column never has any.
///
/// Fails with [`DrillError::InvalidSampleSize`] when `size` exceeds the
/// population. `size == 0` yields an empty sample.
pub fn sample_keys<R: Rng + ?Sized>(
    rng: &mut R,
    mut population: Vec<PrimaryKey>,
    size: usize,
) -> DrillResult<SampleSet> {
    population.sort();
    population.dedup();

    if size > population.len() {
        return Err(DrillError::InvalidSampleSize {
            requested: size,
            population: population.len(),
        });
    }

    let chosen = index::sample(rng, population.len(), size)
        .into_iter()
        .map(|i| population[i].clone())
        .collect();

    Ok(SampleSet::new(chosen))
}
