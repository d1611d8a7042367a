//! Crossword grid filling as a constraint satisfaction problem.
//!
//! A `GridConfig` describes which cells are fillable and derives the slots (maximal runs of two or
//! more cells) and where they cross. Filling assigns one word from a `WordList` to every slot so
//! that lengths match, no word repeats, and crossing slots agree on their shared letter. The
//! pipeline in `find_fill` prunes each slot's options with node consistency and then AC-3 before
//! handing off to backtracking search.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod errors;
pub mod grid_config;
pub mod letter_grid;
pub mod log;
pub mod parse;
pub mod word_list;

pub use backtracking_search::{find_fill, Assignment, FillSuccess, SearchConfig, Statistics};
pub use errors::{FillFailure, InputError};
pub use grid_config::{Direction, GridConfig, Slot, SlotId};
pub use letter_grid::LetterGrid;
pub use word_list::{WordId, WordList};

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
