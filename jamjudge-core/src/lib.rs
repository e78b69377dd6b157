/// jamjudge-core: Pairwise-comparison active ranking engine for jam judging.
///
/// Which pair should a judge see next → canonical vote records → 0–100 scores
/// and ranks. No IO, no HTTP, no database: the caller owns the comparison
/// store and hands the core snapshots.
///
/// Entries are identified by caller-provided string IDs, ordered
/// lexicographically for canonical storage.
///
/// # Quick start
///
/// ```rust
/// use jamjudge_core::{
///     calculate_rankings, calculate_stats, select_next_pair, Comparison, Entry, Outcome,
///     PairSelection,
/// };
///
/// let entries = vec![
///     Entry::new("42", "On-Chain Chess"),
///     Entry::new("57", "Dojo Dungeon"),
///     Entry::new("63", "Cairo Kart"),
/// ];
///
/// let mut comparisons: Vec<Comparison> = Vec::new();
/// if let PairSelection::Pair(pair) = select_next_pair("gj7", "judge-1", &entries, &comparisons).unwrap() {
///     // The judge picked whichever entry was shown first.
///     let vote = Comparison::record(
///         "gj7", "judge-1", &pair.entry_a.id, &pair.entry_b.id, Outcome::Decided(1.0), 0,
///     ).unwrap();
///     comparisons.push(vote);
/// }
///
/// for r in calculate_rankings(&entries, &comparisons).unwrap() {
///     println!("#{} {} ({:.1})", r.rank, r.entry.title, r.score);
/// }
/// let stats = calculate_stats(&entries, &comparisons);
/// assert_eq!(stats.total_comparisons, 1);
/// ```

pub mod canonical;
pub mod constants;
pub mod engine;
pub mod error;
pub mod pairing;
pub mod ranking;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

// Re-export primary public API at crate root.
pub use canonical::{canonicalize, CanonicalVote, PairKey};
pub use engine::{check_vote_entries, EngineConfig, EngineError, JudgingEngine, NextPrompt};
pub use error::JudgingError;
pub use pairing::{calculate_uncertainty, select_next_pair, select_next_pair_with_rng};
pub use ranking::{calculate_rankings, calculate_rankings_with_options};
pub use session::{has_exhausted_all_pairs, session_progress, total_pair_count};
pub use stats::calculate_stats;
pub use store::{comparisons_in_range, AppendOutcome, ComparisonSource, MemoryStore};
pub use types::{
    Comparison, Entry, EntryId, JamId, JudgeId, Outcome, PairSelection, PresentedPair, RankedEntry,
    RankingOptions, RankingStats, SessionProgress, Side,
};
