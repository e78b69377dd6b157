/// Spectral ranking from pairwise wins.
///
/// Wins are counted into an n×n matrix, columns are normalized into a
/// stochastic matrix (empty columns teleport uniformly), and power iteration
/// approximates the dominant eigenvector. The vector is min–max rescaled to
/// 0–100.
///
/// Internal helpers operate on `usize` indices into the caller's entry list.
use tracing::debug;

use crate::constants::{EPSILON, MAX_SCORE, NEUTRAL_SCORE};
use crate::error::JudgingError;
use crate::types::{Comparison, Entry, IdMap, RankedEntry, RankingOptions, Side};

/// Rank entries with the default options (fixed 100-step power iteration).
pub fn calculate_rankings(entries: &[Entry], comparisons: &[Comparison]) -> Result<Vec<RankedEntry>, JudgingError> {
    calculate_rankings_with_options(entries, comparisons, &RankingOptions::default())
}

/// Rank entries from a comparison snapshot.
///
/// Returns entries sorted by score, highest first. Equal scores keep their
/// relative order from `entries`. Comparisons naming ids outside `entries` are
/// ignored.
pub fn calculate_rankings_with_options(
    entries: &[Entry],
    comparisons: &[Comparison],
    options: &RankingOptions,
) -> Result<Vec<RankedEntry>, JudgingError> {
    let n = entries.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let id_map = IdMap::from_entries(entries)?;

    if n == 1 {
        return Ok(vec![RankedEntry { entry: entries[0].clone(), score: MAX_SCORE, rank: 1 }]);
    }

    let wins = build_win_matrix(&id_map, n, comparisons);

    if !wins.iter().flatten().any(|&w| w > 0.0) {
        debug!(entries = n, "no decided comparisons, all entries neutral");
        return Ok(entries.iter().enumerate().map(|(i, entry)| RankedEntry {
            entry: entry.clone(),
            score: NEUTRAL_SCORE,
            rank: i + 1,
        }).collect());
    }

    let transition = column_normalize(&wins);
    let vector = power_iterate(&transition, options);
    let scores = rescale_scores(&vector);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    Ok(order.into_iter().enumerate().map(|(pos, i)| RankedEntry {
        entry: entries[i].clone(),
        score: scores[i],
        rank: pos + 1,
    }).collect())
}

/// `wins[i][j]` = number of decided comparisons in which entry i beat entry j.
fn build_win_matrix(id_map: &IdMap, n: usize, comparisons: &[Comparison]) -> Vec<Vec<f64>> {
    let mut wins = vec![vec![0.0; n]; n];
    let mut ignored = 0usize;

    for comp in comparisons {
        let (Some(low), Some(high)) = (id_map.get(&comp.entry_low), id_map.get(&comp.entry_high)) else {
            ignored += 1;
            continue;
        };

        match comp.outcome.winner() {
            Some(Side::Low) => wins[low][high] += 1.0,
            Some(Side::High) => wins[high][low] += 1.0,
            None => {}
        }
    }

    if ignored > 0 {
        debug!(ignored, "ignored comparisons referencing unknown entries");
    }

    wins
}

/// Column-stochastic version of the win matrix.
///
/// A column with no wins against its entry is replaced by a uniform 1/n
/// column (teleportation), so that entry does not become a rank sink.
fn column_normalize(wins: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = wins.len();
    let mut normalized = vec![vec![0.0; n]; n];

    for j in 0..n {
        let col_sum: f64 = (0..n).map(|i| wins[i][j]).sum();

        if col_sum > EPSILON {
            for i in 0..n {
                normalized[i][j] = wins[i][j] / col_sum;
            }
        } else {
            for row in normalized.iter_mut() {
                row[j] = 1.0 / n as f64;
            }
        }
    }

    normalized
}

/// Power iteration from the uniform vector, renormalized to sum 1 each step.
fn power_iterate(transition: &[Vec<f64>], options: &RankingOptions) -> Vec<f64> {
    let n = transition.len();
    let mut vector = vec![1.0 / n as f64; n];

    for iteration in 0..options.iterations {
        let mut next: Vec<f64> = transition.iter()
            .map(|row| row.iter().zip(&vector).map(|(m, v)| m * v).sum())
            .collect();

        let sum: f64 = next.iter().sum();
        if sum > EPSILON {
            for v in &mut next {
                *v /= sum;
            }
        }

        let max_change = next.iter()
            .zip(&vector)
            .map(|(new, old)| (new - old).abs())
            .fold(0.0_f64, f64::max);

        vector = next;

        if let Some(tolerance) = options.convergence_tolerance {
            if max_change < tolerance {
                debug!(iterations = iteration + 1, max_change, "power iteration converged");
                break;
            }
        }
    }

    vector
}

/// Min–max rescale to [0, 100]. A collapsed range means every entry is equal.
fn rescale_scores(vector: &[f64]) -> Vec<f64> {
    let max = vector.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = vector.iter().copied().fold(f64::INFINITY, f64::min);
    let range = max - min;

    vector.iter().map(|&v| {
        if range > EPSILON {
            (v - min) / range * MAX_SCORE
        } else {
            NEUTRAL_SCORE
        }
    }).collect()
}
