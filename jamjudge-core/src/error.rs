//! Error types for jamjudge-core.

use thiserror::Error;

use crate::types::EntryId;

/// Errors raised for malformed input to the judging core.
///
/// Empty results ("no pair available", "no comparisons yet") are not errors;
/// they have their own variants on the result types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JudgingError {
    /// Both sides of a comparison name the same entry.
    #[error("Cannot compare entry {0} with itself")]
    SelfComparison(EntryId),

    /// The entry list names the same id twice.
    #[error("Duplicate entry ID: {0}")]
    DuplicateEntry(EntryId),

    /// A vote referenced an entry that is not part of the jam.
    #[error("Unknown entry ID: {0}")]
    UnknownEntry(EntryId),

    /// A raw preference was NaN or outside [0, 1].
    #[error("Invalid preference {0}: must be a finite value between 0.0 and 1.0")]
    InvalidPreference(f64),
}
