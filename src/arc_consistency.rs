//! AC-3 over the domain store. A pair of crossing slots is arc-consistent when every option left
//! for the first has at least one option in the second that puts the same letter in the shared
//! cell. We keep revising arcs until nothing else can be removed or some slot runs dry.

use std::collections::VecDeque;

use bit_set::BitSet;
use rustc_hash::FxHashSet;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::word_list::{WordId, WordList};

/// A directed constraint: revising `(x, y)` prunes `x` against `y`.
pub type Arc = (SlotId, SlotId);

/// Result from a successful call to `establish_arc_consistency`.
#[derive(Debug, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many options were removed across all slots.
    pub removals: usize,
}

/// Result from a failed call to `establish_arc_consistency`, naming the slot that was emptied.
#[derive(Debug, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make `x` arc consistent with `y`: remove every option for `x` that leaves no compatible option
/// for `y` in their shared cell. Slots that don't cross are never revised, and options too short
/// to reach the shared cell support nothing and are removed. Returns whether anything was removed.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    // Which glyphs can `y` still place in the shared cell?
    let mut supported_glyphs = BitSet::with_capacity(word_list.glyphs.len());
    for word_id in domains.options(y) {
        if let Some(&glyph) = word_list.word(word_id).glyphs.get(y_cell) {
            supported_glyphs.insert(glyph);
        }
    }

    let unsupported: Vec<WordId> = domains.options(x).iter()
        .filter(|&word_id| {
            !word_list.word(word_id).glyphs.get(x_cell)
                .is_some_and(|&glyph| supported_glyphs.contains(glyph))
        })
        .collect();

    domains.remove_all(x, unsupported) > 0
}

/// Work queue for AC-3. Arcs that are already waiting aren't added a second time.
struct ArcQueue {
    queue: VecDeque<Arc>,
    queued: FxHashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_arcs<I>(arcs: I) -> ArcQueue
        where
            I: IntoIterator<Item=Arc>
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: FxHashSet::default() };
        for arc in arcs {
            queue.enqueue(arc);
        }
        queue
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }
}

/// Every ordered pair of distinct slots.
pub fn all_arcs(config: &GridConfig) -> impl Iterator<Item=Arc> + '_ {
    let slot_count = config.slot_count();
    (0..slot_count).flat_map(move |x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y)))
}

/// Run AC-3 starting from the given arcs, or from every arc in the grid if `arcs` is `None`.
/// Arcs are processed in FIFO order; the resulting domains don't depend on that order.
pub fn establish_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_arcs(arcs),
        None => ArcQueue::with_initial_arcs(all_arcs(config)),
    };

    let initial_count = domains.total_count();

    while let Some((x, y)) = queue.pop_front() {
        if !revise(config, word_list, domains, x, y) {
            continue;
        }

        if domains.is_empty(x) {
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        // Shrinking `x` may have removed the last support for options in its other neighbors.
        for z in config.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess { removals: initial_count - domains.total_count() })
}
