/// Append-only JSONL comparison store.
///
/// One serialized `Comparison` per line. The whole file is loaded on open;
/// appends are checked against the loaded set so a judge can never hold two
/// comparisons for the same pair in one jam.
use jamjudge_core::{AppendOutcome, Comparison, ComparisonSource, JudgingError, MemoryStore};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "comparisons.jsonl";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on comparison store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed comparison at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid comparison at {path}:{line}: {source}")]
    Invalid {
        path: PathBuf,
        line: usize,
        #[source]
        source: JudgingError,
    },

    #[error("Comparison rejected: {0}")]
    Rejected(#[from] JudgingError),

    #[error("Failed to serialize comparison: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct JsonlStore {
    path: PathBuf,
    snapshot: MemoryStore,
}

impl JsonlStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let io_err = |source| StoreError::Io { path: path.to_path_buf(), source };

        let mut snapshot = MemoryStore::new();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(io_err(e)),
        };

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let comparison: Comparison = serde_json::from_str(line).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            let outcome = snapshot.insert(comparison).map_err(|source| StoreError::Invalid {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            if outcome == AppendOutcome::Duplicate {
                tracing::warn!(path = %path.display(), line = idx + 1, "ignoring duplicate comparison in store");
            }
        }

        tracing::debug!(path = %path.display(), comparisons = snapshot.len(), "opened comparison store");
        Ok(JsonlStore { path: path.to_path_buf(), snapshot })
    }

    /// Append a comparison in canonical form. Nothing is written for a
    /// duplicate or an invalid row.
    pub fn append(&mut self, comparison: Comparison) -> Result<AppendOutcome, StoreError> {
        let comparison = comparison.into_canonical()?;
        if self.snapshot.contains(&comparison) {
            return Ok(AppendOutcome::Duplicate);
        }

        let line = serde_json::to_string(&comparison)?;
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{line}").map_err(io_err)?;
        file.flush().map_err(io_err)?;

        Ok(self.snapshot.insert(comparison)?)
    }
}

impl ComparisonSource for JsonlStore {
    type Error = StoreError;

    fn comparisons_for_jam(&self, jam_id: &str) -> Result<Vec<Comparison>, Self::Error> {
        let Ok(comparisons) = self.snapshot.comparisons_for_jam(jam_id);
        Ok(comparisons)
    }

    fn comparison_count_for_judge(&self, jam_id: &str, judge_id: &str) -> Result<usize, Self::Error> {
        let Ok(count) = self.snapshot.comparison_count_for_judge(jam_id, judge_id);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jamjudge_core::{Entry, Outcome, PairSelection, select_next_pair};
    use pretty_assertions::assert_eq;

    fn vote(judge: &str, a: &str, b: &str, outcome: Outcome) -> Comparison {
        Comparison::record("gj8", judge, a, b, outcome, 1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(&dir.path().join(STORE_FILE_NAME)).unwrap();
        assert_eq!(store.comparisons_for_jam("gj8").unwrap().len(), 0);
    }

    #[test]
    fn test_append_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join(STORE_FILE_NAME);

        let mut store = JsonlStore::open(&path).unwrap();
        assert_eq!(store.append(vote("j1", "b", "a", Outcome::Decided(1.0))).unwrap(), AppendOutcome::Recorded);
        assert_eq!(store.append(vote("j1", "a", "c", Outcome::Skipped)).unwrap(), AppendOutcome::Recorded);

        let reopened = JsonlStore::open(&path).unwrap();
        let comps = reopened.comparisons_for_jam("gj8").unwrap();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], vote("j1", "a", "b", Outcome::Decided(0.0)));
        assert_eq!(reopened.comparison_count_for_judge("gj8", "j1").unwrap(), 2);
    }

    #[test]
    fn test_duplicate_vote_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);

        let mut store = JsonlStore::open(&path).unwrap();
        store.append(vote("j1", "a", "b", Outcome::Tie)).unwrap();
        assert_eq!(store.append(vote("j1", "b", "a", Outcome::Decided(1.0))).unwrap(), AppendOutcome::Duplicate);

        let lines = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let good = serde_json::to_string(&vote("j1", "a", "b", Outcome::Tie)).unwrap();
        std::fs::write(&path, format!("{good}\n\nnot json\n")).unwrap();

        match JsonlStore::open(&path) {
            Err(StoreError::Malformed { line, .. }) => assert_eq!(line, 3),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("malformed store should not open"),
        }
    }

    fn row(low: &str, high: &str, outcome: &str) -> String {
        format!(
            r#"{{"jam_id":"gj8","judge_id":"j1","entry_low":"{low}","entry_high":"{high}","outcome":{outcome},"timestamp":1}}"#
        )
    }

    #[test]
    fn test_swapped_row_is_canonicalized_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(&path, format!("{}\n", row("b", "a", r#"{"decided":1.0}"#))).unwrap();

        let mut store = JsonlStore::open(&path).unwrap();
        let comps = store.comparisons_for_jam("gj8").unwrap();
        assert_eq!(comps, vec![Comparison::record("gj8", "j1", "a", "b", Outcome::Decided(0.0), 1).unwrap()]);

        let entries = vec![Entry::new("a", "A"), Entry::new("b", "B")];
        let selection = select_next_pair("gj8", "j1", &entries, &comps).unwrap();
        assert_eq!(selection, PairSelection::Exhausted);
        assert_eq!(store.append(vote("j1", "a", "b", Outcome::Tie)).unwrap(), AppendOutcome::Duplicate);
    }

    #[test]
    fn test_invalid_rows_report_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let good = row("a", "b", r#""tie""#);

        for bad in [row("a", "a", r#""tie""#), row("a", "b", r#"{"decided":1.5}"#)] {
            std::fs::write(&path, format!("{good}\n{bad}\n")).unwrap();
            match JsonlStore::open(&path) {
                Err(StoreError::Invalid { line, .. }) => assert_eq!(line, 2),
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("invalid row should not load"),
            }
        }
    }

    #[test]
    fn test_duplicate_lines_in_file_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let first = serde_json::to_string(&vote("j1", "a", "b", Outcome::Decided(1.0))).unwrap();
        let second = serde_json::to_string(&vote("j1", "a", "b", Outcome::Decided(0.0))).unwrap();
        std::fs::write(&path, format!("{first}\n{second}\n")).unwrap();

        let store = JsonlStore::open(&path).unwrap();
        let comps = store.comparisons_for_jam("gj8").unwrap();
        assert_eq!(comps, vec![vote("j1", "a", "b", Outcome::Decided(1.0))]);
    }
}
