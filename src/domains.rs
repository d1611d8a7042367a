//! The set of words still considered possible for each slot.

use std::fmt::{Debug, Formatter};

use bit_set::BitSet;

use crate::errors::FillFailure;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// Candidate words per slot, as sets of `WordId`s indexed by `SlotId`. Options are only ever
/// removed; cloning the whole store is how search takes a snapshot.
#[derive(Clone, PartialEq, Eq)]
pub struct Domains {
    options: Vec<BitSet>,
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.options.iter().map(BitSet::len)).finish()
    }
}

impl Domains {
    /// Start every slot off with every word in the list.
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_words: BitSet = (0..word_list.len()).collect();

        Domains { options: vec![all_words; config.slot_count()] }
    }

    #[inline]
    pub fn options(&self, slot_id: SlotId) -> &BitSet {
        &self.options[slot_id]
    }

    #[inline]
    pub fn count(&self, slot_id: SlotId) -> usize {
        self.options[slot_id].len()
    }

    #[inline]
    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options[slot_id].is_empty()
    }

    /// Total number of options across all slots.
    pub fn total_count(&self) -> usize {
        self.options.iter().map(BitSet::len).sum()
    }

    /// Remove each of the given words from the slot, returning how many were actually present.
    pub fn remove_all<I>(&mut self, slot_id: SlotId, word_ids: I) -> usize
        where
            I: IntoIterator<Item=WordId>
    {
        let options = &mut self.options[slot_id];
        word_ids.into_iter().filter(|&word_id| options.remove(word_id)).count()
    }

    /// Narrow the slot down to a single word.
    pub fn fix(&mut self, slot_id: SlotId, word_id: WordId) {
        let options = &mut self.options[slot_id];
        options.clear();
        options.insert(word_id);
    }

    /// Remove every option whose length differs from its slot's length. Returns the number of
    /// options removed, or the first slot left with nothing to choose from.
    ///
    /// Running this again afterwards removes nothing.
    pub fn enforce_node_consistency(
        &mut self,
        config: &GridConfig,
        word_list: &WordList,
    ) -> Result<usize, FillFailure> {
        let mut removed = 0;

        for slot_config in &config.slot_configs {
            let length = slot_config.slot.length;
            let mismatched: Vec<WordId> = self.options[slot_config.id].iter()
                .filter(|&word_id| word_list.word(word_id).len() != length)
                .collect();

            removed += self.remove_all(slot_config.id, mismatched);
        }

        match (0..config.slot_count()).find(|&slot_id| self.is_empty(slot_id)) {
            Some(slot_id) => Err(FillFailure::UnsatisfiableNodeConstraint { slot: *config.slot(slot_id) }),
            None => Ok(removed),
        }
    }
}
