/// Number of comparisons in a single judging session.
///
/// A judge is offered a break after every `JUDGING_SESSION_SIZE` votes. The
/// count is derived from the store on every query, nothing is persisted.
pub const JUDGING_SESSION_SIZE: usize = 10;

/// Fixed power-iteration budget for the rank aggregator.
///
/// This is a budget, not a convergence guarantee. Jams stay in the tens of
/// entries, where 100 steps of an n×n stochastic matrix are cheap.
pub const POWER_ITERATIONS: usize = 100;

/// Threshold below which column sums, vector sums, and score ranges are
/// treated as zero.
pub const EPSILON: f64 = 1e-10;

/// Score given to every entry when there is no evidence to discriminate.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Top of the rescaled score range.
pub const MAX_SCORE: f64 = 100.0;

/// Pseudo-counts of the Beta(1,1) prior on each pairwise win probability.
pub const BETA_PRIOR_ALPHA: f64 = 1.0;
pub const BETA_PRIOR_BETA: f64 = 1.0;

/// The preference value that means "no preference".
pub const TIE_POINT: f64 = 0.5;
