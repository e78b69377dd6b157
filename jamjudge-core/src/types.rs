use std::collections::HashMap;

use crate::canonical::{PairKey, canonicalize};
use crate::constants::TIE_POINT;
use crate::error::JudgingError;

/// Identifier of an entry within a jam. Ordered lexicographically.
pub type EntryId = String;

/// Slug of a jam (e.g. "gj7").
pub type JamId = String;

/// Identifier of a judge.
pub type JudgeId = String;

/// A submission being ranked within a jam.
///
/// Only `id` is interpreted by the core; the rest is carried through to the
/// caller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub author: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub demo_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub video_url: Option<String>,
}

impl Entry {
    /// An entry with only an id and a title.
    pub fn new(id: impl Into<EntryId>, title: impl Into<String>) -> Self {
        Entry {
            id: id.into(),
            title: title.into(),
            description: None,
            author: None,
            demo_url: None,
            video_url: None,
        }
    }
}

/// Which side of a canonical pair an outcome favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Low,
    High,
}

/// Result of one judge looking at one pair.
///
/// `Decided` carries the preference toward the *low-id* entry of the canonical
/// pair once the comparison has been canonicalized: 1.0 is a hard win for the
/// low entry, 0.0 a hard win for the high entry, values in between are
/// partial preference. The tie point itself is always `Tie`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    Decided(f64),
    Tie,
    Skipped,
}

impl Outcome {
    /// Build an outcome from a raw preference value.
    ///
    /// Exactly 0.5 becomes `Tie`. NaN and values outside [0, 1] are rejected.
    pub fn from_preference(preference: f64) -> Result<Self, JudgingError> {
        if !preference.is_finite() || !(0.0..=1.0).contains(&preference) {
            return Err(JudgingError::InvalidPreference(preference));
        }
        if preference == TIE_POINT {
            Ok(Outcome::Tie)
        } else {
            Ok(Outcome::Decided(preference))
        }
    }

    /// Convert a legacy nullable score, where `None` means the pair was skipped.
    pub fn from_score(score: Option<f64>) -> Result<Self, JudgingError> {
        match score {
            Some(p) => Outcome::from_preference(p),
            None => Ok(Outcome::Skipped),
        }
    }

    /// Re-check a value that did not come through `from_preference`, e.g. one
    /// read back from storage.
    pub fn validated(self) -> Result<Self, JudgingError> {
        match self {
            Outcome::Decided(p) => Outcome::from_preference(p),
            other => Ok(other),
        }
    }

    /// The same outcome seen from the other side of the pair. `1 - p` is
    /// subject to `f64` rounding.
    pub fn inverted(self) -> Self {
        match self {
            Outcome::Decided(p) => Outcome::Decided(1.0 - p),
            other => other,
        }
    }

    /// The favoured side, or `None` for ties, skips, and a decided value that
    /// sits exactly on the tie point.
    pub fn winner(&self) -> Option<Side> {
        match *self {
            Outcome::Decided(p) if p > TIE_POINT => Some(Side::Low),
            Outcome::Decided(p) if p < TIE_POINT => Some(Side::High),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }
}

/// One recorded vote, stored in canonical form.
///
/// `entry_low < entry_high` always holds for values built with
/// [`Comparison::record`]. Uniqueness per (jam, judge, pair) is the store's job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    pub jam_id: JamId,
    pub judge_id: JudgeId,
    pub entry_low: EntryId,
    pub entry_high: EntryId,
    pub outcome: Outcome,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Comparison {
    /// Canonicalize a vote given in presentation order and wrap it as a
    /// comparison record.
    pub fn record(
        jam_id: impl Into<JamId>,
        judge_id: impl Into<JudgeId>,
        entry_a: &str,
        entry_b: &str,
        outcome: Outcome,
        timestamp: i64,
    ) -> Result<Self, JudgingError> {
        let vote = canonicalize(entry_a, entry_b, outcome)?;
        Ok(Comparison {
            jam_id: jam_id.into(),
            judge_id: judge_id.into(),
            entry_low: vote.low,
            entry_high: vote.high,
            outcome: vote.outcome,
            timestamp,
        })
    }

    /// Bring a comparison built field by field (or deserialized) into
    /// canonical form: ids ordered, preference re-oriented and range-checked.
    pub fn into_canonical(self) -> Result<Self, JudgingError> {
        let outcome = self.outcome.validated()?;
        let vote = canonicalize(&self.entry_low, &self.entry_high, outcome)?;
        Ok(Comparison { entry_low: vote.low, entry_high: vote.high, outcome: vote.outcome, ..self })
    }

    /// The pair this comparison is about. Independent of field order.
    pub fn pair_key(&self) -> PairKey {
        PairKey::ordered(&self.entry_low, &self.entry_high)
    }
}

/// An entry with its relative score (0–100) and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedEntry {
    pub entry: Entry,
    pub score: f64,
    pub rank: usize,
}

/// Options for `calculate_rankings_with_options()`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingOptions {
    /// Maximum number of power-iteration steps.
    pub iterations: usize,
    /// Stop early once no component of the vector moves by more than this.
    /// `None` = always run the full budget.
    pub convergence_tolerance: Option<f64>,
}

impl Default for RankingOptions {
    fn default() -> Self {
        RankingOptions {
            iterations: crate::constants::POWER_ITERATIONS,
            convergence_tolerance: None,
        }
    }
}

/// Coverage statistics for a jam's comparison snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingStats {
    pub total_judges: usize,
    pub total_comparisons: usize,
    pub skipped_count: usize,
    /// Share of all possible pairs with at least one non-skipped outcome, 0–100.
    pub coverage_percent: f64,
}

/// Per-judge progress through the current session. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionProgress {
    pub completed_in_session: usize,
    pub session_size: usize,
    pub sessions_completed: usize,
}

/// Two entries in presentation order. `entry_a` is shown first.
///
/// The order is a coin flip, not the canonical order. Never store it as such.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresentedPair {
    pub entry_a: Entry,
    pub entry_b: Entry,
}

/// Result of asking the pair selector for the next pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PairSelection {
    Pair(PresentedPair),
    /// The jam has fewer than two entries.
    InsufficientEntries,
    /// This judge has recorded an outcome for every pair.
    Exhausted,
}

/// Maps entry ids to positions in the caller's entry list.
pub(crate) struct IdMap<'a> {
    id_to_idx: HashMap<&'a str, usize>,
}

impl<'a> IdMap<'a> {
    pub fn from_entries(entries: &'a [Entry]) -> Result<Self, JudgingError> {
        let mut id_to_idx = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if id_to_idx.insert(entry.id.as_str(), idx).is_some() {
                return Err(JudgingError::DuplicateEntry(entry.id.clone()));
            }
        }
        Ok(IdMap { id_to_idx })
    }

    /// Index of an entry id, or `None` if the id is not part of the jam.
    pub fn get(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }
}
