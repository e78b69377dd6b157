/// Active pair selection for a single judge.
///
/// Candidates are all pairs the judge has not yet recorded an outcome for.
/// Each candidate is weighted by the posterior variance of its win
/// probability, so pairs with no evidence or split evidence come up more
/// often than pairs the other judges already agree on.
use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::debug;

use crate::canonical::PairKey;
use crate::constants::{BETA_PRIOR_ALPHA, BETA_PRIOR_BETA};
use crate::error::JudgingError;
use crate::types::{Comparison, Entry, IdMap, PairSelection, PresentedPair, Side};

/// Decided outcomes per canonical pair, across all judges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PairTally {
    wins_low: u32,
    wins_high: u32,
}

/// Posterior variance of a pairwise win probability under a Beta(1,1) prior.
///
/// Maximal (1/12) for an untested pair, shrinks as either side accumulates
/// wins.
pub fn calculate_uncertainty(wins_low: u32, wins_high: u32) -> f64 {
    let alpha = wins_low as f64 + BETA_PRIOR_ALPHA;
    let beta = wins_high as f64 + BETA_PRIOR_BETA;
    let sum = alpha + beta;
    (alpha * beta) / (sum * sum * (sum + 1.0))
}

/// Pick the next pair to show `judge_id` in `jam_id`.
///
/// `comparisons` is the store snapshot; rows for other jams are ignored.
pub fn select_next_pair(
    jam_id: &str,
    judge_id: &str,
    entries: &[Entry],
    comparisons: &[Comparison],
) -> Result<PairSelection, JudgingError> {
    let mut rng = rand::rng();
    select_next_pair_with_rng(jam_id, judge_id, entries, comparisons, &mut rng)
}

/// Same as [`select_next_pair`] with a caller-supplied random source.
pub fn select_next_pair_with_rng(
    jam_id: &str,
    judge_id: &str,
    entries: &[Entry],
    comparisons: &[Comparison],
    rng: &mut impl Rng,
) -> Result<PairSelection, JudgingError> {
    if entries.len() < 2 {
        return Ok(PairSelection::InsufficientEntries);
    }
    IdMap::from_entries(entries)?;

    let mut judged: HashSet<PairKey> = HashSet::new();
    let mut tallies: HashMap<PairKey, PairTally> = HashMap::new();

    for comp in comparisons.iter().filter(|c| c.jam_id == jam_id) {
        let key = comp.pair_key();
        if comp.judge_id == judge_id {
            judged.insert(key.clone());
        }
        let tally = tallies.entry(key).or_default();
        match comp.outcome.winner() {
            Some(Side::Low) => tally.wins_low += 1,
            Some(Side::High) => tally.wins_high += 1,
            None => {}
        }
    }

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    let mut weights: Vec<f64> = Vec::new();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let key = PairKey::new(&entries[i].id, &entries[j].id)?;
            if judged.contains(&key) {
                continue;
            }
            let tally = tallies.get(&key).copied().unwrap_or_default();
            candidates.push((i, j));
            weights.push(calculate_uncertainty(tally.wins_low, tally.wins_high));
        }
    }

    if candidates.is_empty() {
        debug!(jam = jam_id, judge = judge_id, "judge has exhausted all pairs");
        return Ok(PairSelection::Exhausted);
    }

    let total_weight: f64 = weights.iter().sum();
    let selected = if total_weight <= 0.0 {
        rng.random_range(0..candidates.len())
    } else {
        weighted_random_select(&weights, total_weight, rng)
    };

    let (i, j) = candidates[selected];
    debug!(
        jam = jam_id,
        judge = judge_id,
        candidates = candidates.len(),
        weight = weights[selected],
        "selected pair ({}, {})",
        entries[i].id,
        entries[j].id,
    );

    let pair = if rng.random::<f64>() < 0.5 {
        PresentedPair { entry_a: entries[i].clone(), entry_b: entries[j].clone() }
    } else {
        PresentedPair { entry_a: entries[j].clone(), entry_b: entries[i].clone() }
    };

    Ok(PairSelection::Pair(pair))
}

fn weighted_random_select(weights: &[f64], total_weight: f64, rng: &mut impl Rng) -> usize {
    let mut r = rng.random::<f64>() * total_weight;
    for (j, &w) in weights.iter().enumerate() {
        r -= w;
        if r < 1e-10 {
            return j;
        }
    }
    weights.len() - 1
}
