//! Property-Based Tests for Sampling, Naming and Round Trips
//!
//! These tests check the invariants that must hold for any table size,
//! sample size or set of existing relation names.

use std::collections::HashSet;

use lossdrill_core::{PrimaryKey, TableName, resolve_backup_name, run_simulation, sample_keys};
use lossdrill_testing::{customers_plan_with_size, customers_store};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn population(size: usize) -> Vec<PrimaryKey> {
    (1..=size as i64).map(PrimaryKey::from).collect()
}

// Strategy for generating table names that leave room for a suffix
fn base_name_strategy() -> impl Strategy<Value = TableName> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,40}")
        .unwrap()
        .prop_filter_map("Valid table name", |s| TableName::new(s).ok())
}

proptest! {
    /// Property: a sample holds exactly N distinct keys, all from the population
    #[test]
    fn prop_sample_has_requested_size_and_distinct_keys(
        (size, n) in (0usize..200).prop_flat_map(|size| (Just(size), 0..=size)),
        seed in any::<u64>()
    ) {
        let keys = population(size);
        let sample = sample_keys(&mut StdRng::seed_from_u64(seed), keys.clone(), n).unwrap();

        prop_assert_eq!(sample.len(), n);
        let distinct: HashSet<_> = sample.iter().collect();
        prop_assert_eq!(distinct.len(), n);
        prop_assert!(sample.iter().all(|k| keys.contains(k)));
        prop_assert!(sample.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: asking for more keys than exist always fails
    #[test]
    fn prop_oversized_sample_is_rejected(size in 0usize..100, extra in 1usize..10) {
        let result = sample_keys(&mut StdRng::seed_from_u64(0), population(size), size + extra);
        prop_assert!(result.is_err());
    }

    /// Property: with base, base_v1 .. base_v(M-1) taken the backup is base_vM
    #[test]
    fn prop_backup_name_is_first_free_version(base in base_name_strategy(), taken in 0u32..20) {
        let mut existing: HashSet<String> = (1..taken)
            .map(|v| format!("{}_v{}", base, v))
            .collect();
        if taken > 0 {
            existing.insert(base.to_string());
        }
        existing.insert(format!("{}_v{}", base, taken + 1));

        let chosen = resolve_backup_name(&base, &existing).unwrap();

        if taken == 0 {
            prop_assert_eq!(chosen.name.as_str(), base.as_str());
            prop_assert_eq!(chosen.version, None);
        } else {
            prop_assert_eq!(chosen.name.to_string(), format!("{}_v{}", base, taken));
            prop_assert_eq!(chosen.version, Some(taken));
        }
        prop_assert!(!existing.contains(chosen.name.as_str()));
    }

    /// Property: a complete run leaves the table as it found it
    #[test]
    fn prop_round_trip_restores_table(
        (rows, n) in (0u32..60).prop_flat_map(|rows| (Just(rows), 0..=rows as usize)),
        seed in any::<u64>()
    ) {
        tokio_test::block_on(async {
            let mut store = customers_store(rows);
            let before = store.table("customers").unwrap().sorted_rows();

            let report = run_simulation(
                &mut store,
                customers_plan_with_size(n),
                &mut StdRng::seed_from_u64(seed),
                |_| {},
            )
            .await
            .expect("Drill should complete");

            assert!(report.is_complete());
            assert_eq!(store.table("customers").unwrap().sorted_rows(), before);
            assert_eq!(store.table("customers_backup").unwrap().len(), n);
        });
    }
}
