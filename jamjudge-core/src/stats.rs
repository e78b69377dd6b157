/// Coverage statistics over a jam's comparison snapshot.
use std::collections::HashSet;

use crate::canonical::PairKey;
use crate::session::total_pair_count;
use crate::types::{Comparison, Entry, RankingStats};

/// Summarize who judged, how much was skipped, and how much of the pair space
/// has been looked at.
///
/// Coverage counts distinct pairs of known entries with at least one
/// non-skipped outcome (ties included), as a percentage of all pairs.
pub fn calculate_stats(entries: &[Entry], comparisons: &[Comparison]) -> RankingStats {
    let known: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();

    let judges: HashSet<&str> = comparisons.iter().map(|c| c.judge_id.as_str()).collect();
    let skipped_count = comparisons.iter().filter(|c| c.outcome.is_skipped()).count();

    let covered: HashSet<PairKey> = comparisons.iter()
        .filter(|c| !c.outcome.is_skipped())
        .filter(|c| known.contains(c.entry_low.as_str()) && known.contains(c.entry_high.as_str()))
        .map(|c| c.pair_key())
        .collect();

    let total_pairs = total_pair_count(entries.len());
    let coverage_percent = if total_pairs > 0 {
        covered.len() as f64 / total_pairs as f64 * 100.0
    } else {
        0.0
    };

    RankingStats {
        total_judges: judges.len(),
        total_comparisons: comparisons.len(),
        skipped_count,
        coverage_percent,
    }
}
