/// Judging engine orchestrator.
///
/// Wires a read-only comparison store to the pair selector, session tracker,
/// and rank aggregator. Every call re-reads the store; nothing derived is
/// cached. The caller records votes in the store itself, then asks again.
use rand::Rng;
use thiserror::Error;

use crate::constants::JUDGING_SESSION_SIZE;
use crate::error::JudgingError;
use crate::pairing::select_next_pair_with_rng;
use crate::ranking::calculate_rankings_with_options;
use crate::session::{has_exhausted_all_pairs, session_progress};
use crate::stats::calculate_stats;
use crate::store::ComparisonSource;
use crate::types::{
    Entry, PairSelection, PresentedPair, RankedEntry, RankingOptions, RankingStats, SessionProgress,
};

/// Configuration for the judging engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Comparisons per judging session.
    pub session_size: usize,
    pub ranking: RankingOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            session_size: JUDGING_SESSION_SIZE,
            ranking: RankingOptions::default(),
        }
    }
}

/// Failure of an engine call: either the store failed or the input was bad.
#[derive(Debug, Error)]
pub enum EngineError<E: std::error::Error + 'static> {
    #[error("comparison store error: {0}")]
    Store(#[source] E),

    #[error(transparent)]
    Judging(#[from] JudgingError),
}

/// What to show a judge who asks for the next pair.
#[derive(Debug, Clone, PartialEq)]
pub enum NextPrompt {
    Pair {
        pair: PresentedPair,
        progress: SessionProgress,
    },
    /// The judge has recorded an outcome for every pair of this jam.
    Exhausted { progress: SessionProgress },
    /// The jam has fewer than two entries; nothing can be judged yet.
    InsufficientEntries,
}

pub struct JudgingEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: ComparisonSource> JudgingEngine<S>
where
    S::Error: std::error::Error + 'static,
{
    pub fn new(store: S, config: EngineConfig) -> Self {
        assert!(config.session_size > 0, "session size must be at least 1");
        JudgingEngine { store, config }
    }

    /// Mutable access for callers that append votes through the engine's store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Progress through the current session, from a single count query.
    pub fn session_progress(&self, jam_id: &str, judge_id: &str) -> Result<SessionProgress, EngineError<S::Error>> {
        let count = self.store.comparison_count_for_judge(jam_id, judge_id).map_err(EngineError::Store)?;
        Ok(session_progress(count, self.config.session_size))
    }

    pub fn has_exhausted_all_pairs(
        &self,
        jam_id: &str,
        judge_id: &str,
        entries: &[Entry],
    ) -> Result<bool, EngineError<S::Error>> {
        let count = self.store.comparison_count_for_judge(jam_id, judge_id).map_err(EngineError::Store)?;
        Ok(has_exhausted_all_pairs(count, entries.len()))
    }

    pub fn select_next_pair(
        &self,
        jam_id: &str,
        judge_id: &str,
        entries: &[Entry],
    ) -> Result<PairSelection, EngineError<S::Error>> {
        let mut rng = rand::rng();
        self.select_next_pair_with_rng(jam_id, judge_id, entries, &mut rng)
    }

    pub fn select_next_pair_with_rng(
        &self,
        jam_id: &str,
        judge_id: &str,
        entries: &[Entry],
        rng: &mut impl Rng,
    ) -> Result<PairSelection, EngineError<S::Error>> {
        let comparisons = self.store.comparisons_for_jam(jam_id).map_err(EngineError::Store)?;
        Ok(select_next_pair_with_rng(jam_id, judge_id, entries, &comparisons, rng)?)
    }

    /// Full "next pair" flow: entry check, exhaustion check, then selection.
    pub fn next_prompt(&self, jam_id: &str, judge_id: &str, entries: &[Entry]) -> Result<NextPrompt, EngineError<S::Error>> {
        let mut rng = rand::rng();
        self.next_prompt_with_rng(jam_id, judge_id, entries, &mut rng)
    }

    pub fn next_prompt_with_rng(
        &self,
        jam_id: &str,
        judge_id: &str,
        entries: &[Entry],
        rng: &mut impl Rng,
    ) -> Result<NextPrompt, EngineError<S::Error>> {
        if entries.len() < 2 {
            return Ok(NextPrompt::InsufficientEntries);
        }

        let progress = self.session_progress(jam_id, judge_id)?;
        if has_exhausted_all_pairs(progress.total_comparisons(), entries.len()) {
            return Ok(NextPrompt::Exhausted { progress });
        }

        Ok(match self.select_next_pair_with_rng(jam_id, judge_id, entries, rng)? {
            PairSelection::Pair(pair) => NextPrompt::Pair { pair, progress },
            PairSelection::Exhausted => NextPrompt::Exhausted { progress },
            PairSelection::InsufficientEntries => NextPrompt::InsufficientEntries,
        })
    }

    pub fn rankings(&self, jam_id: &str, entries: &[Entry]) -> Result<Vec<RankedEntry>, EngineError<S::Error>> {
        let comparisons = self.store.comparisons_for_jam(jam_id).map_err(EngineError::Store)?;
        Ok(calculate_rankings_with_options(entries, &comparisons, &self.config.ranking)?)
    }

    pub fn stats(&self, jam_id: &str, entries: &[Entry]) -> Result<RankingStats, EngineError<S::Error>> {
        let comparisons = self.store.comparisons_for_jam(jam_id).map_err(EngineError::Store)?;
        Ok(calculate_stats(entries, &comparisons))
    }
}

/// Check that both sides of a submitted vote are entries of the jam.
pub fn check_vote_entries(entries: &[Entry], entry_a: &str, entry_b: &str) -> Result<(), JudgingError> {
    for id in [entry_a, entry_b] {
        if !entries.iter().any(|e| e.id == id) {
            return Err(JudgingError::UnknownEntry(id.to_string()));
        }
    }
    if entry_a == entry_b {
        return Err(JudgingError::SelfComparison(entry_a.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AppendOutcome, MemoryStore};
    use crate::types::{Comparison, Outcome};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn entries(ids: &[&str]) -> Vec<Entry> {
        ids.iter().map(|id| Entry::new(*id, format!("Entry {id}"))).collect()
    }

    fn engine() -> JudgingEngine<MemoryStore> {
        JudgingEngine::new(MemoryStore::new(), EngineConfig::default())
    }

    #[test]
    fn test_judge_walks_every_pair_once() {
        let list = entries(&["42", "57", "63", "71"]);
        let mut engine = engine();
        let mut rng = SmallRng::seed_from_u64(11);

        let mut votes = 0;
        loop {
            match engine.next_prompt_with_rng("gj8", "judge-1", &list, &mut rng).unwrap() {
                NextPrompt::Pair { pair, progress } => {
                    assert_eq!(progress.total_comparisons(), votes);
                    let comparison = Comparison::record(
                        "gj8", "judge-1", &pair.entry_a.id, &pair.entry_b.id, Outcome::Decided(1.0), votes as i64,
                    ).unwrap();
                    assert_eq!(engine.store_mut().insert(comparison).unwrap(), AppendOutcome::Recorded);
                    votes += 1;
                }
                NextPrompt::Exhausted { progress } => {
                    assert_eq!(progress.total_comparisons(), 6);
                    break;
                }
                NextPrompt::InsufficientEntries => panic!("four entries are enough"),
            }
        }

        assert_eq!(votes, 6);
        assert!(engine.has_exhausted_all_pairs("gj8", "judge-1", &list).unwrap());
        assert!(!engine.has_exhausted_all_pairs("gj8", "judge-2", &list).unwrap());
    }

    #[test]
    fn test_insufficient_entries_is_distinct_from_exhausted() {
        let engine = engine();
        let prompt = engine.next_prompt("gj8", "judge-1", &entries(&["only"])).unwrap();
        assert_eq!(prompt, NextPrompt::InsufficientEntries);
    }

    #[test]
    fn test_session_progress_from_store() {
        let mut engine = engine();
        let ids: Vec<String> = (0..8).map(|i| format!("e{i}")).collect();
        let mut inserted = 0;
        'outer: for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if inserted == 23 {
                    break 'outer;
                }
                let c = Comparison::record("gj8", "judge-1", &ids[i], &ids[j], Outcome::Tie, 0).unwrap();
                engine.store_mut().insert(c).unwrap();
                inserted += 1;
            }
        }

        let progress = engine.session_progress("gj8", "judge-1").unwrap();
        assert_eq!(progress, SessionProgress { completed_in_session: 3, session_size: 10, sessions_completed: 2 });
    }

    #[test]
    fn test_rankings_and_stats_read_store() {
        let list = entries(&["x", "y"]);
        let mut engine = engine();
        for judge in ["j1", "j2", "j3"] {
            engine.store_mut().insert(Comparison::record("gj8", judge, "x", "y", Outcome::Decided(1.0), 0).unwrap()).unwrap();
        }
        engine.store_mut().insert(Comparison::record("gj7", "j1", "y", "x", Outcome::Decided(1.0), 0).unwrap()).unwrap();

        let ranked = engine.rankings("gj8", &list).unwrap();
        assert_eq!(ranked[0].entry.id, "x");
        assert_eq!(ranked[0].rank, 1);

        let stats = engine.stats("gj8", &list).unwrap();
        assert_eq!(stats.total_judges, 3);
        assert_eq!(stats.total_comparisons, 3);
        assert_eq!(stats.coverage_percent, 100.0);
    }

    #[test]
    fn test_check_vote_entries() {
        let list = entries(&["a", "b"]);
        assert!(check_vote_entries(&list, "a", "b").is_ok());
        assert_eq!(check_vote_entries(&list, "a", "z"), Err(JudgingError::UnknownEntry("z".to_string())));
        assert_eq!(check_vote_entries(&list, "a", "a"), Err(JudgingError::SelfComparison("a".to_string())));
    }

    #[test]
    #[should_panic(expected = "session size must be at least 1")]
    fn test_engine_rejects_zero_session_size() {
        let _ = JudgingEngine::new(MemoryStore::new(), EngineConfig { session_size: 0, ..EngineConfig::default() });
    }
}
