//! Primary key values and sample sets

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A primary key value in its PostgreSQL text rendering (`pk::text`).
///
/// Keeping the server's own text form means any scalar key type (integers,
/// text, uuids, dates) can be matched back with `pk::text = ANY($1)` without
/// knowing the column type up front.
///
/// Ordering is numeric when both sides are integers and lexicographic
/// otherwise, so `9 < 10` for integer keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKey(String);

impl PrimaryKey {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i128> {
        self.0.parse().ok()
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Ord for PrimaryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for PrimaryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The keys chosen for one simulated loss, sorted ascending, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet(Vec<PrimaryKey>);

impl SampleSet {
    /// Build a sample set, sorting and removing duplicate keys.
    pub fn new(mut keys: Vec<PrimaryKey>) -> Self {
        keys.sort();
        keys.dedup();
        Self(keys)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrimaryKey> {
        self.0.iter()
    }

    pub fn contains(&self, key: &PrimaryKey) -> bool {
        self.0.binary_search(key).is_ok()
    }

    pub fn as_slice(&self) -> &[PrimaryKey] {
        &self.0
    }

    /// Keys as owned strings, the form bound to `text[]` query parameters.
    pub fn to_text_params(&self) -> Vec<String> {
        self.0.iter().map(|k| k.0.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a PrimaryKey;
    type IntoIter = std::slice::Iter<'a, PrimaryKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for SampleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", key)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(value: i64) -> PrimaryKey {
        PrimaryKey::from(value)
    }

    #[test]
    fn test_integer_keys_sort_numerically() {
        let set = SampleSet::new(vec![k(10), k(9), k(100), k(-3)]);
        let rendered: Vec<&str> = set.iter().map(PrimaryKey::as_str).collect();
        assert_eq!(rendered, vec!["-3", "9", "10", "100"]);
    }

    #[test]
    fn test_mixed_keys_sort_integers_first() {
        let set = SampleSet::new(vec!["b".into(), k(2), "a".into()]);
        assert_eq!(set.to_string(), "[2, a, b]");
    }

    #[test]
    fn test_text_keys_keep_exact_rendering() {
        // "007" and "7" are different text keys even though both parse
        let set = SampleSet::new(vec!["007".into(), "7".into()]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_text_params(), vec!["007".to_string(), "7".to_string()]);
    }

    #[test]
    fn test_sample_set_dedups_and_contains() {
        let set = SampleSet::new(vec![k(3), k(1), k(3)]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&k(3)));
        assert!(!set.contains(&k(2)));
        assert!(SampleSet::default().is_empty());
    }

    #[test]
    fn test_serializes_as_plain_strings() {
        let set = SampleSet::new(vec![k(2), k(1)]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["1","2"]"#);
    }
}
