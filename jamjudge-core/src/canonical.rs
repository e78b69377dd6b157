/// Canonical (low, high) form for pairs and votes.
///
/// Every comparison is stored with the lexicographically smaller entry id
/// first and the outcome oriented toward that entry. Everything downstream
/// of the canonicalizer assumes this form.
use crate::error::JudgingError;
use crate::types::{EntryId, Outcome};

/// Unordered pair identity, stored as (low, high).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    low: EntryId,
    high: EntryId,
}

impl PairKey {
    /// Build the key for two entries given in any order.
    pub fn new(a: &str, b: &str) -> Result<Self, JudgingError> {
        if a == b {
            return Err(JudgingError::SelfComparison(a.to_string()));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(PairKey { low: low.to_string(), high: high.to_string() })
    }

    /// Order two ids without validating them. Equal ids give a degenerate key
    /// that no `PairKey::new` result can match.
    pub(crate) fn ordered(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        PairKey { low: low.to_string(), high: high.to_string() }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }
}

/// A vote in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalVote {
    pub low: EntryId,
    pub high: EntryId,
    pub outcome: Outcome,
}

/// Map `(entry_a, entry_b, outcome)` to canonical form.
///
/// If `entry_a < entry_b` the input passes through unchanged; otherwise the ids
/// are swapped and a decided preference `p` becomes `1 - p`. Ties and skips are
/// unaffected by the swap. Equal ids have no canonical form and are rejected.
///
/// `1 - p` is computed in `f64`, so swapping twice returns `p` only up to
/// rounding (e.g. `1 - (1 - 0.1)` is `0.09999999999999998`). Callers comparing
/// decided outcomes across orientations should allow a small tolerance.
pub fn canonicalize(entry_a: &str, entry_b: &str, outcome: Outcome) -> Result<CanonicalVote, JudgingError> {
    if entry_a == entry_b {
        return Err(JudgingError::SelfComparison(entry_a.to_string()));
    }

    if entry_a < entry_b {
        Ok(CanonicalVote { low: entry_a.to_string(), high: entry_b.to_string(), outcome })
    } else {
        Ok(CanonicalVote {
            low: entry_b.to_string(),
            high: entry_a.to_string(),
            outcome: outcome.inverted(),
        })
    }
}
