//! Grid filling by depth-first backtracking search. Slots are chosen with the minimum-remaining-
//! values heuristic (ties going to the slot with the most crossings, then to the earliest slot in
//! the grid), and each slot's options are tried least-constraining first.
//!
//! By default domains are pruned once before search and stay fixed while searching; the search
//! itself only rejects options that clash with what's already assigned. With
//! `maintain_arc_consistency` enabled, each trial assignment also re-runs AC-3 from the assigned
//! slot, snapshotting the domains first and restoring them when the branch is abandoned.

use std::cmp::Reverse;

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, trace};

use crate::arc_consistency::{establish_arc_consistency, Arc, ArcConsistencyFailure};
use crate::domains::Domains;
use crate::errors::FillFailure;
use crate::grid_config::{GridConfig, Slot, SlotId};
use crate::letter_grid::LetterGrid;
use crate::word_list::{WordId, WordList};

/// Knobs for a fill attempt.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Give up once this much time has passed since the fill started. Checked on every step of
    /// the search, so a fill that runs out of time reports `DeadlineExceeded` rather than a result.
    pub timeout: Option<Duration>,

    /// Re-establish arc consistency after each trial assignment.
    pub maintain_arc_consistency: bool,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub node_consistency_removals: usize,
    pub arc_consistency_removals: usize,
    pub duration: Duration,
}

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to chosen words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: Vec<Option<WordId>>,
}

impl Assignment {
    /// An assignment with nothing chosen for any of `slot_count` slots.
    pub fn empty(slot_count: usize) -> Assignment {
        Assignment { word_ids: vec![None; slot_count] }
    }

    #[inline]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids[slot_id]
    }

    #[inline]
    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_ids[slot_id].is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.word_ids.iter().all(Option::is_some)
    }

    /// Number of slots with a word chosen.
    pub fn len(&self) -> usize {
        self.word_ids.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        self.word_ids[slot_id] = Some(word_id);
    }

    pub fn unassign(&mut self, slot_id: SlotId) {
        self.word_ids[slot_id] = None;
    }

    /// The choices made so far, in slot id order.
    pub fn choices(&self) -> impl Iterator<Item=Choice> + '_ {
        self.word_ids.iter().enumerate().filter_map(|(slot_id, word_id)| {
            word_id.map(|word_id| Choice { slot_id, word_id })
        })
    }

    /// The chosen word for a slot, looked up by value.
    pub fn word_for<'a>(
        &self,
        config: &GridConfig,
        word_list: &'a WordList,
        slot: &Slot,
    ) -> Option<&'a str> {
        let slot_id = config.slot_id(slot)?;
        self.get(slot_id).map(|word_id| word_list.word(word_id).string.as_str())
    }

    /// Each assigned slot with its word, in slot id order.
    pub fn words<'a>(
        &'a self,
        config: &'a GridConfig,
        word_list: &'a WordList,
    ) -> impl Iterator<Item=(Slot, &'a str)> + 'a {
        self.choices().map(move |choice| {
            (*config.slot(choice.slot_id), word_list.word(choice.word_id).string.as_str())
        })
    }
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

impl FillSuccess {
    /// The letters placed in each cell by this fill.
    pub fn letter_grid(&self, config: &GridConfig, word_list: &WordList) -> LetterGrid {
        LetterGrid::new(config, word_list, &self.assignment)
    }
}

/// Marker for a search that ran past its deadline.
struct DeadlineExceeded;

/// The live state of a search.
struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    domains: Domains,
    assignment: Assignment,

    /// Words chosen for any slot so far, so we can refuse to use one twice.
    used_word_ids: BitSet,

    deadline: Option<Instant>,
    maintain_arc_consistency: bool,
    statistics: &'a mut Statistics,
}

impl<'a> Search<'a> {
    /// Pick the next slot to fill: fewest remaining options, then most crossings, then earliest
    /// position in the grid. Returns `None` once every slot is assigned.
    fn select_unassigned_slot(&self) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !self.assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| {
                (
                    self.domains.count(slot_id),
                    Reverse(self.config.degree(slot_id)),
                    *self.config.slot(slot_id),
                )
            })
    }

    /// How many options would choosing `word_id` for `slot_id` rule out in crossing slots that
    /// haven't been assigned yet?
    fn count_eliminations(&self, slot_id: SlotId, word_id: WordId) -> usize {
        let word = self.word_list.word(word_id);

        self.config.slot_configs[slot_id].crossings.iter().zip(&word.glyphs)
            .filter_map(|(crossing, &glyph)| crossing.map(|crossing| (crossing, glyph)))
            .filter(|(crossing, _)| !self.assignment.is_assigned(crossing.other_slot_id))
            .map(|(crossing, glyph)| {
                // BitSet's iterator under-reports its upper size bound, so sum rather than count.
                self.domains.options(crossing.other_slot_id).iter()
                    .map(|other_word_id| {
                        let other_glyph = self.word_list.word(other_word_id).glyphs[crossing.other_slot_cell];
                        usize::from(other_glyph != glyph)
                    })
                    .sum::<usize>()
            })
            .sum()
    }

    /// The slot's remaining options, least constraining first. Ties keep word list order.
    fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        let mut word_ids: Vec<WordId> = self.domains.options(slot_id).iter().collect();
        word_ids.sort_by_cached_key(|&word_id| self.count_eliminations(slot_id, word_id));
        word_ids
    }

    /// Can `word_id` go in `slot_id` given what's already assigned? It has to fit, it can't
    /// already be in use elsewhere, and it has to agree with every assigned crossing.
    fn is_consistent(&self, slot_id: SlotId, word_id: WordId) -> bool {
        let word = self.word_list.word(word_id);
        let slot_config = &self.config.slot_configs[slot_id];

        if self.used_word_ids.contains(word_id) || word.len() != slot_config.slot.length {
            return false;
        }

        slot_config.crossings.iter().zip(&word.glyphs).all(|(crossing, &glyph)| {
            match crossing.and_then(|c| self.assignment.get(c.other_slot_id).map(|w| (c, w))) {
                Some((crossing, other_word_id)) => {
                    self.word_list.word(other_word_id).glyphs[crossing.other_slot_cell] == glyph
                }
                None => true,
            }
        })
    }

    /// Propagate a trial assignment through its unassigned crossings. On failure the caller is
    /// responsible for restoring the domains it snapshotted.
    fn propagate_choice(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains.fix(slot_id, word_id);

        let arcs: Vec<Arc> = self.config.neighbors(slot_id)
            .filter(|&neighbor| !self.assignment.is_assigned(neighbor))
            .map(|neighbor| (neighbor, slot_id))
            .collect();

        match establish_arc_consistency(self.config, self.word_list, &mut self.domains, Some(arcs)) {
            Ok(_) => true,
            Err(ArcConsistencyFailure { slot_id: emptied }) => {
                trace!("Choice for {} empties {}", self.config.slot(slot_id), self.config.slot(emptied));
                false
            }
        }
    }

    /// Extend the current assignment to a complete one if possible. `Ok(false)` means this branch
    /// has no completion and the caller should try something else.
    fn backtrack(&mut self) -> Result<bool, DeadlineExceeded> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(DeadlineExceeded);
            }
        }

        self.statistics.states += 1;

        if self.assignment.is_complete() {
            return Ok(true);
        }
        let Some(slot_id) = self.select_unassigned_slot() else {
            return Ok(true);
        };

        for word_id in self.order_domain_values(slot_id) {
            if !self.is_consistent(slot_id, word_id) {
                continue;
            }

            self.assignment.assign(slot_id, word_id);
            self.used_word_ids.insert(word_id);

            let snapshot = self.maintain_arc_consistency.then(|| self.domains.clone());
            let viable = snapshot.is_none() || self.propagate_choice(slot_id, word_id);

            if viable && self.backtrack()? {
                return Ok(true);
            }

            // Undo the trial before moving on to the next option.
            if let Some(snapshot) = snapshot {
                self.domains = snapshot;
            }
            self.used_word_ids.remove(word_id);
            self.assignment.unassign(slot_id);
            self.statistics.backtracks += 1;

            trace!(
                "Backtracking {} from {}",
                self.config.slot(slot_id),
                self.word_list.word(word_id).string,
            );
        }

        Ok(false)
    }
}

/// Search for a valid fill for the given grid and word list.
///
/// Domains start out as the whole word list, are pruned by node consistency and then by AC-3, and
/// only then does backtracking start. If either pruning step empties a slot, search never runs.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    search_config: &SearchConfig,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let deadline = search_config.timeout.map(|timeout| start + timeout);

    let mut statistics = Statistics::default();
    let mut domains = Domains::new(config, word_list);

    statistics.node_consistency_removals = domains.enforce_node_consistency(config, word_list)?;
    debug!("Node consistency removed {} options", statistics.node_consistency_removals);

    statistics.arc_consistency_removals =
        match establish_arc_consistency(config, word_list, &mut domains, None) {
            Ok(success) => success.removals,
            Err(ArcConsistencyFailure { slot_id }) => {
                debug!("Arc consistency emptied {}", config.slot(slot_id));
                return Err(FillFailure::ArcInconsistency { slot: *config.slot(slot_id) });
            }
        };
    debug!("Arc consistency removed {} options", statistics.arc_consistency_removals);

    let mut search = Search {
        config,
        word_list,
        domains,
        assignment: Assignment::empty(config.slot_count()),
        used_word_ids: BitSet::with_capacity(word_list.len()),
        deadline,
        maintain_arc_consistency: search_config.maintain_arc_consistency,
        statistics: &mut statistics,
    };

    let outcome = search.backtrack();
    let assignment = search.assignment;
    statistics.duration = start.elapsed();

    match outcome {
        Ok(true) => {
            info!(
                "Filled {} slots in {:?} ({} states, {} backtracks)",
                config.slot_count(), statistics.duration, statistics.states, statistics.backtracks,
            );
            Ok(FillSuccess { statistics, assignment })
        }
        Ok(false) => {
            info!("No fill exists ({} states, {} backtracks)", statistics.states, statistics.backtracks);
            Err(FillFailure::SearchExhausted)
        }
        Err(DeadlineExceeded) => {
            info!("Gave up after {:?} ({} states)", statistics.duration, statistics.states);
            Err(FillFailure::DeadlineExceeded { elapsed: statistics.duration })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_config::Direction::{Across, Down};
    use crate::parse::parse_structure;

    fn fill(template: &str, words: &[&str]) -> (GridConfig, WordList, Result<FillSuccess, FillFailure>) {
        fill_with(template, words, &SearchConfig::default())
    }

    fn fill_with(
        template: &str,
        words: &[&str],
        search_config: &SearchConfig,
    ) -> (GridConfig, WordList, Result<FillSuccess, FillFailure>) {
        let config = parse_structure(template).unwrap();
        let word_list = WordList::new(words.iter().copied());
        let result = find_fill(&config, &word_list, search_config);
        (config, word_list, result)
    }

    fn assert_valid_fill(config: &GridConfig, word_list: &WordList, assignment: &Assignment) {
        assert!(assignment.is_complete());

        let mut seen = BitSet::new();
        for choice in assignment.choices() {
            let word = word_list.word(choice.word_id);
            assert_eq!(word.len(), config.slot(choice.slot_id).length);
            assert!(seen.insert(choice.word_id), "{} used twice", word.string);

            for other in config.neighbors(choice.slot_id) {
                let (i, j) = config.overlap(choice.slot_id, other).unwrap();
                let other_word_id = assignment.get(other).unwrap();
                assert_eq!(word_list.char_at(choice.word_id, i), word_list.char_at(other_word_id, j));
            }
        }
    }

    /// ___
    #[test]
    fn test_single_slot_gets_a_word_from_the_list() {
        let (config, word_list, result) = fill("___\n", &["cat", "dog"]);

        let result = result.expect("Failed to find a fill");
        let slot = Slot { row: 0, column: 0, direction: Across, length: 3 };
        let word = result.assignment.word_for(&config, &word_list, &slot).unwrap();
        assert!(word == "cat" || word == "dog");
    }

    /// ___
    /// _##
    /// _##
    #[test]
    fn test_crossing_slots_share_their_letter() {
        let (config, word_list, result) = fill("___\n_##\n_##\n", &["cat", "car", "dog", "den"]);

        let result = result.expect("Failed to find a fill");
        assert_valid_fill(&config, &word_list, &result.assignment);

        let across = Slot { row: 0, column: 0, direction: Across, length: 3 };
        let down = Slot { row: 0, column: 0, direction: Down, length: 3 };
        let across_word = result.assignment.word_for(&config, &word_list, &across).unwrap();
        let down_word = result.assignment.word_for(&config, &word_list, &down).unwrap();
        assert_eq!(across_word.chars().next(), down_word.chars().next());

        // With ties broken by position and word order, across is chosen first and gets "car".
        assert_eq!((across_word, down_word), ("car", "cat"));
    }

    #[test]
    fn test_wrong_length_vocabulary_never_reaches_search() {
        let (_, _, result) = fill("____\n", &["cat", "dog"]);

        match result.expect_err("Found an impossible fill??") {
            FillFailure::UnsatisfiableNodeConstraint { slot } => assert_eq!(slot.length, 4),
            other => panic!("Unexpected failure {:?}", other),
        }
    }

    /// ___
    /// ##_
    /// ##_
    #[test]
    fn test_arc_inconsistency_never_reaches_search() {
        let (_, _, result) = fill("___\n##_\n##_\n", &["cat", "dog"]);

        assert!(matches!(result, Err(FillFailure::ArcInconsistency { .. })));
    }

    /// __
    /// __
    #[test]
    fn test_dupe_prevention_exhausts_search() {
        // Every arc is supported, but a fill would need the same word in two slots.
        let (_, _, result) = fill("__\n__\n", &["ab", "ba"]);

        assert!(matches!(result, Err(FillFailure::SearchExhausted)));
    }

    /// __
    /// __
    #[test]
    fn test_every_two_letter_word_still_cannot_fill_a_square() {
        // Rows xy/zw make columns xz/yw, and no choice keeps all four distinct.
        let words = ["ab", "ba", "aa", "bb"];

        let (_, _, result) = fill("__\n__\n", &words);
        assert!(matches!(result, Err(FillFailure::SearchExhausted)));

        let search_config = SearchConfig { maintain_arc_consistency: true, ..Default::default() };
        let (_, _, result) = fill_with("__\n__\n", &words, &search_config);
        assert!(matches!(result, Err(FillFailure::SearchExhausted)));
    }

    /// ___
    /// _##
    /// _##
    #[test]
    fn test_lcv_counts_every_mismatched_neighbor_option() {
        let config = parse_structure("___\n_##\n_##\n").unwrap();
        let word_list = WordList::new(["cab", "cat", "cot", "cup", "dog", "tan"]);
        let mut statistics = Statistics::default();
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency(&config, &word_list).unwrap();
        let search = Search {
            config: &config,
            word_list: &word_list,
            domains,
            assignment: Assignment::empty(config.slot_count()),
            used_word_ids: BitSet::new(),
            deadline: None,
            maintain_arc_consistency: false,
            statistics: &mut statistics,
        };

        // Down can still take four c-words, one d-word and one t-word.
        assert_eq!(search.count_eliminations(0, 0), 2);
        assert_eq!(search.count_eliminations(0, 4), 5);
    }

    /// ___
    /// ___
    /// ___
    #[test]
    fn test_find_fill_for_3x3_square() {
        let words = ["cat", "ore", "wed", "cow", "are", "ted", "ace", "owe", "tee", "dew", "rot"];
        let (config, word_list, result) = fill("___\n___\n___\n", &words);

        let result = result.expect("Failed to find a fill");
        assert_valid_fill(&config, &word_list, &result.assignment);
        assert!(result.statistics.states >= 6);
    }

    #[test]
    fn test_maintained_arc_consistency_finds_the_same_kind_of_fill() {
        let words = ["cat", "ore", "wed", "cow", "are", "ted", "ace", "owe", "tee", "dew", "rot"];
        let search_config = SearchConfig { maintain_arc_consistency: true, ..Default::default() };
        let (config, word_list, result) = fill_with("___\n___\n___\n", &words, &search_config);

        let result = result.expect("Failed to find a fill");
        assert_valid_fill(&config, &word_list, &result.assignment);
    }

    #[test]
    fn test_maintained_arc_consistency_still_reports_exhaustion() {
        let search_config = SearchConfig { maintain_arc_consistency: true, ..Default::default() };
        let (_, _, result) = fill_with("__\n__\n", &["ab", "ba"], &search_config);

        assert!(matches!(result, Err(FillFailure::SearchExhausted)));
    }

    #[test]
    fn test_zero_timeout_is_not_proof_of_unsolvability() {
        let search_config = SearchConfig { timeout: Some(Duration::ZERO), ..Default::default() };
        let (_, _, result) = fill_with("___\n", &["cat", "dog"], &search_config);

        let failure = result.expect_err("Filled despite zero budget");
        assert!(matches!(failure, FillFailure::DeadlineExceeded { .. }));
        assert!(!failure.is_proven_unsolvable());
    }

    #[test]
    fn test_grid_without_slots_is_trivially_filled() {
        let (_, _, result) = fill("_#\n#_\n", &["cat"]);

        let result = result.expect("Failed to find a fill");
        assert!(result.assignment.is_empty());
    }

    /// ____
    /// _##_
    /// ____
    #[test]
    fn test_mrv_prefers_smaller_domains_then_degree() {
        let config = parse_structure("____\n_##_\n____\n").unwrap();
        let word_list = WordList::new(["abba", "acca", "baab", "aba", "aca", "bab"]);
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency(&config, &word_list).unwrap();

        let mut statistics = Statistics::default();
        let mut search = Search {
            config: &config,
            word_list: &word_list,
            domains,
            assignment: Assignment::empty(config.slot_count()),
            used_word_ids: BitSet::new(),
            deadline: None,
            maintain_arc_consistency: false,
            statistics: &mut statistics,
        };

        // All four slots have three options and two crossings, so position decides.
        assert_eq!(*config.slot(search.select_unassigned_slot().unwrap()),
                   Slot { row: 0, column: 0, direction: Across, length: 4 });

        // Shrinking the last down slot makes it the most constrained.
        let last_down = config.slot_id(&Slot { row: 0, column: 3, direction: Down, length: 3 }).unwrap();
        let aba = word_list.find("aba").unwrap();
        search.domains.remove_all(last_down, [aba]);
        assert_eq!(search.select_unassigned_slot(), Some(last_down));
    }

    /// ___
    /// _##
    /// _##
    #[test]
    fn test_lcv_orders_by_eliminations() {
        let config = parse_structure("___\n_##\n_##\n").unwrap();
        let word_list = WordList::new(["cab", "cot", "cup", "dim", "tan"]);
        let mut domains = Domains::new(&config, &word_list);
        domains.enforce_node_consistency(&config, &word_list).unwrap();

        let mut statistics = Statistics::default();
        let search = Search {
            config: &config,
            word_list: &word_list,
            domains,
            assignment: Assignment::empty(config.slot_count()),
            used_word_ids: BitSet::new(),
            deadline: None,
            maintain_arc_consistency: false,
            statistics: &mut statistics,
        };

        // Words starting with "c" leave three down options standing; the rest leave one.
        let ordered: Vec<&str> = search.order_domain_values(0).into_iter()
            .map(|word_id| word_list.word(word_id).string.as_str())
            .collect();
        assert_eq!(ordered, vec!["cab", "cot", "cup", "dim", "tan"]);

        let dim = word_list.find("dim").unwrap();
        assert_eq!(search.count_eliminations(0, dim), 4);
    }
}
