//! Backup table naming with collision avoidance

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{DrillError, DrillResult};
use crate::identifiers::TableName;

/// Outcome of resolving a backup table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupName {
    /// Name the backup table will be created under
    pub name: TableName,
    /// Version suffix appended to the base name, `None` if the base was free
    pub version: Option<u32>,
}

impl BackupName {
    pub fn was_renamed(&self) -> bool {
        self.version.is_some()
    }
}

/// Pick the first unused name among `base`, `base_v1`, `base_v2`, ...
///
/// `existing` holds the relation names already present. When the base name
/// collides with `base, base_v1, ..., base_v(M-1)` the result is `base_vM`.
/// A candidate longer than PostgreSQL keeps is an error, never a silently
/// truncated name.
pub fn resolve_backup_name(base: &TableName, existing: &HashSet<String>) -> DrillResult<BackupName> {
    if !existing.contains(base.as_str()) {
        return Ok(BackupName {
            name: base.clone(),
            version: None,
        });
    }

    let mut version: u32 = 1;
    loop {
        let candidate = base.versioned(version).map_err(|source| DrillError::BackupName {
            base: base.to_string(),
            source,
        })?;
        if !existing.contains(candidate.as_str()) {
            return Ok(BackupName {
                name: candidate,
                version: Some(version),
            });
        }
        version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn existing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unused_base_is_returned_unchanged() {
        let base = TableName::new("customers_backup").unwrap();
        let resolved = resolve_backup_name(&base, &existing(&["customers"])).unwrap();
        assert_eq!(resolved.name, base);
        assert!(!resolved.was_renamed());
    }

    #[rstest]
    #[case(&["customers_backup"], "customers_backup_v1")]
    #[case(&["customers_backup", "customers_backup_v1"], "customers_backup_v2")]
    #[case(
        &["customers_backup", "customers_backup_v1", "customers_backup_v2", "customers_backup_v3"],
        "customers_backup_v4"
    )]
    #[case(&["customers_backup", "customers_backup_v2"], "customers_backup_v1")]
    fn test_collisions_probe_increasing_suffixes(#[case] taken: &[&str], #[case] expected: &str) {
        let base = TableName::new("customers_backup").unwrap();
        let resolved = resolve_backup_name(&base, &existing(taken)).unwrap();
        assert_eq!(resolved.name.as_str(), expected);
        assert!(resolved.was_renamed());
    }

    #[test]
    fn test_suffixes_do_not_accumulate() {
        let base = TableName::new("b").unwrap();
        let resolved = resolve_backup_name(&base, &existing(&["b", "b_v1", "b_v2"])).unwrap();
        assert_eq!(resolved.name.as_str(), "b_v3");
        assert_eq!(resolved.version, Some(3));
    }

    #[test]
    fn test_suffix_overflowing_identifier_limit_fails() {
        let long = "x".repeat(61);
        let base = TableName::new(long.clone()).unwrap();
        let err = resolve_backup_name(&base, &existing(&[long.as_str()])).unwrap_err();
        assert!(matches!(err, DrillError::BackupName { .. }));
    }
}
