//! Error types for building a grid from input and for reporting fill outcomes.

use std::io;

use instant::Duration;

use crate::grid_config::Slot;

/// Problems with the structure or word list handed to the solver. These are rejected before any
/// solving starts.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Structure has no rows")]
    EmptyStructure,

    #[error("Structure row {row} has {found} cells, expected {expected}")]
    RaggedStructure {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Structure has no fillable cells")]
    NoFillableCells,

    #[error("Word list has no entries")]
    EmptyVocabulary,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The ways a fill can come back without a solution. Every variant is an ordinary outcome, not a
/// fault; only `DeadlineExceeded` leaves open whether a solution exists.
#[derive(Debug, thiserror::Error)]
pub enum FillFailure {
    #[error("No word in the list fits slot {slot}")]
    UnsatisfiableNodeConstraint { slot: Slot },

    #[error("Arc consistency emptied the options for slot {slot}")]
    ArcInconsistency { slot: Slot },

    #[error("Search exhausted every branch without completing the grid")]
    SearchExhausted,

    #[error("No solution found within budget (gave up after {elapsed:?})")]
    DeadlineExceeded { elapsed: Duration },
}

impl FillFailure {
    /// True when the grid and word list are known to have no solution, as opposed to the search
    /// running out of time.
    #[must_use]
    pub fn is_proven_unsolvable(&self) -> bool {
        !matches!(self, FillFailure::DeadlineExceeded { .. })
    }
}
