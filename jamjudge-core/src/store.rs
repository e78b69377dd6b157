/// Read-only seam over the comparison store, plus an in-memory snapshot.
///
/// The core never writes to a store. Callers append canonical comparisons
/// themselves and re-query for the next operation.
use std::collections::HashSet;
use std::convert::Infallible;

use crate::canonical::PairKey;
use crate::error::JudgingError;
use crate::types::{Comparison, JamId, JudgeId};

/// Queries the judging core needs from a comparison store.
pub trait ComparisonSource {
    type Error;

    /// Every comparison recorded for a jam, all judges.
    fn comparisons_for_jam(&self, jam_id: &str) -> Result<Vec<Comparison>, Self::Error>;

    /// Number of comparisons one judge has recorded for a jam.
    fn comparison_count_for_judge(&self, jam_id: &str, judge_id: &str) -> Result<usize, Self::Error>;
}

/// Result of appending a comparison to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppendOutcome {
    Recorded,
    /// The judge already has a comparison for this pair in this jam. Nothing
    /// was written; the caller should fetch a new pair.
    Duplicate,
}

/// Identity of a stored comparison for the at-most-one rule.
pub type ComparisonKey = (JamId, JudgeId, PairKey);

pub fn comparison_key(comparison: &Comparison) -> ComparisonKey {
    (comparison.jam_id.clone(), comparison.judge_id.clone(), comparison.pair_key())
}

/// In-memory comparison store holding at most one comparison per
/// (jam, judge, pair).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    comparisons: Vec<Comparison>,
    keys: HashSet<ComparisonKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a comparison unless its (jam, judge, pair) is taken. The value
    /// is canonicalized first; self comparisons and out-of-range preferences
    /// are rejected.
    pub fn insert(&mut self, comparison: Comparison) -> Result<AppendOutcome, JudgingError> {
        let comparison = comparison.into_canonical()?;
        if !self.keys.insert(comparison_key(&comparison)) {
            return Ok(AppendOutcome::Duplicate);
        }
        self.comparisons.push(comparison);
        Ok(AppendOutcome::Recorded)
    }

    /// True if a comparison for the same (jam, judge, pair) is already held.
    pub fn contains(&self, comparison: &Comparison) -> bool {
        self.keys.contains(&comparison_key(comparison))
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }
}

impl ComparisonSource for MemoryStore {
    type Error = Infallible;

    fn comparisons_for_jam(&self, jam_id: &str) -> Result<Vec<Comparison>, Self::Error> {
        Ok(self.comparisons.iter().filter(|c| c.jam_id == jam_id).cloned().collect())
    }

    fn comparison_count_for_judge(&self, jam_id: &str, judge_id: &str) -> Result<usize, Self::Error> {
        Ok(self.comparisons.iter().filter(|c| c.jam_id == jam_id && c.judge_id == judge_id).count())
    }
}

/// Comparisons with `from <= timestamp <= to`. Open bounds are unbounded.
pub fn comparisons_in_range(comparisons: &[Comparison], from: Option<i64>, to: Option<i64>) -> Vec<Comparison> {
    comparisons.iter()
        .filter(|c| from.is_none_or(|f| c.timestamp >= f))
        .filter(|c| to.is_none_or(|t| c.timestamp <= t))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    fn at(judge: &str, a: &str, b: &str, timestamp: i64) -> Comparison {
        Comparison::record("gj8", judge, a, b, Outcome::Decided(1.0), timestamp).unwrap()
    }

    #[test]
    fn test_insert_rejects_same_pair_either_order() {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert(at("j1", "a", "b", 1)).unwrap(), AppendOutcome::Recorded);
        assert_eq!(store.insert(at("j1", "b", "a", 2)).unwrap(), AppendOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&at("j1", "b", "a", 3)));
        assert!(!store.contains(&at("j2", "b", "a", 3)));
    }

    #[test]
    fn test_insert_allows_other_judge_or_jam() {
        let mut store = MemoryStore::new();
        store.insert(at("j1", "a", "b", 1)).unwrap();
        assert_eq!(store.insert(at("j2", "a", "b", 1)).unwrap(), AppendOutcome::Recorded);
        let other_jam = Comparison::record("gj7", "j1", "a", "b", Outcome::Tie, 1).unwrap();
        assert_eq!(store.insert(other_jam).unwrap(), AppendOutcome::Recorded);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_queries_scope_by_jam_and_judge() {
        let mut store = MemoryStore::new();
        store.insert(at("j1", "a", "b", 1)).unwrap();
        store.insert(at("j1", "a", "c", 1)).unwrap();
        store.insert(at("j2", "a", "b", 1)).unwrap();
        store.insert(Comparison::record("gj7", "j1", "a", "b", Outcome::Skipped, 1).unwrap()).unwrap();

        assert_eq!(store.comparisons_for_jam("gj8").unwrap().len(), 3);
        assert_eq!(store.comparison_count_for_judge("gj8", "j1").unwrap(), 2);
        assert_eq!(store.comparison_count_for_judge("gj7", "j1").unwrap(), 1);
        assert_eq!(store.comparison_count_for_judge("gj8", "nobody").unwrap(), 0);
    }

    #[test]
    fn test_comparisons_in_range_inclusive() {
        let comps = vec![at("j1", "a", "b", 10), at("j1", "a", "c", 20), at("j1", "b", "c", 30)];
        assert_eq!(comparisons_in_range(&comps, Some(20), None).len(), 2);
        assert_eq!(comparisons_in_range(&comps, None, Some(20)).len(), 2);
        assert_eq!(comparisons_in_range(&comps, Some(20), Some(20)).len(), 1);
        assert_eq!(comparisons_in_range(&comps, None, None).len(), 3);
    }

    #[test]
    fn test_insert_canonicalizes_hand_built_rows() {
        let mut store = MemoryStore::new();
        let mut swapped = at("j1", "a", "b", 1);
        std::mem::swap(&mut swapped.entry_low, &mut swapped.entry_high);
        swapped.outcome = Outcome::Decided(1.0);

        assert_eq!(store.insert(swapped).unwrap(), AppendOutcome::Recorded);
        assert_eq!(store.comparisons_for_jam("gj8").unwrap(), vec![
            Comparison::record("gj8", "j1", "a", "b", Outcome::Decided(0.0), 1).unwrap(),
        ]);
        assert_eq!(store.insert(at("j1", "a", "b", 2)).unwrap(), AppendOutcome::Duplicate);
    }

    #[test]
    fn test_insert_rejects_self_comparison_row() {
        let mut store = MemoryStore::new();
        let mut row = at("j1", "a", "b", 1);
        row.entry_high = "a".to_string();
        assert_eq!(store.insert(row), Err(JudgingError::SelfComparison("a".to_string())));
        assert_eq!(store.len(), 0);
    }
}
