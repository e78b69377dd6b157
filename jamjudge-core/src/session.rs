/// Per-judge session progress and exhaustion, derived from counts only.
use crate::types::SessionProgress;

/// Number of unordered pairs among `entry_count` entries.
pub fn total_pair_count(entry_count: usize) -> usize {
    if entry_count < 2 {
        return 0;
    }
    entry_count * (entry_count - 1) / 2
}

/// Split a judge's total comparison count into sessions of `session_size`.
///
/// # Panics
///
/// Panics if `session_size` is zero.
pub fn session_progress(total_comparisons: usize, session_size: usize) -> SessionProgress {
    assert!(session_size > 0, "session size must be at least 1");
    SessionProgress {
        completed_in_session: total_comparisons % session_size,
        session_size,
        sessions_completed: total_comparisons / session_size,
    }
}

/// True once a judge has recorded at least as many comparisons as there are
/// pairs.
///
/// This is a count check: it trusts the store to hold at most one comparison
/// per judge and pair.
pub fn has_exhausted_all_pairs(judge_comparison_count: usize, entry_count: usize) -> bool {
    judge_comparison_count >= total_pair_count(entry_count)
}

impl SessionProgress {
    /// True right after the last vote of a session, before the next one starts.
    pub fn is_session_boundary(&self) -> bool {
        self.sessions_completed > 0 && self.completed_in_session == 0
    }

    /// Votes left before the current session is complete.
    pub fn remaining_in_session(&self) -> usize {
        self.session_size - self.completed_in_session
    }

    pub fn total_comparisons(&self) -> usize {
        self.sessions_completed * self.session_size + self.completed_in_session
    }
}
