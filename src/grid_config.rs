//! The static description of a puzzle: which cells are fillable, the slots they form, and where
//! those slots cross. Nothing here changes once a `GridConfig` has been built.

use std::fmt::{self, Debug, Display, Formatter};

use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::InputError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the GridConfig's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => f.write_str("across"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A slot identified purely by where it starts, which way it runs, and how long it is. Two slots
/// with the same fields are the same slot, so this is safe to use as a map key anywhere.
///
/// The derived ordering (row, then column, then direction) is what search uses as its last
/// tiebreak, so don't reorder the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub column: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    /// The cell occupied by this slot's `cell_idx`th letter.
    #[inline]
    pub fn cell(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.column + cell_idx),
            Direction::Down => (self.row + cell_idx, self.column),
        }
    }

    /// Generate the coords for each cell of this slot.
    pub fn cells(&self) -> impl Iterator<Item=GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| self.cell(cell_idx))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.column, self.direction, self.length)
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A slot together with its crossings, indexed by cell within the slot.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub slot: Slot,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

/// A struct representing the aspects of a grid that are static during filling.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub fillable: Vec<Vec<bool>>,
    pub slot_configs: Vec<SlotConfig>,
    slot_ids_by_slot: FxHashMap<Slot, SlotId>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

/// Every maximal run of two or more fillable cells in one line, as (start index, length).
fn find_runs<I>(line: I) -> Vec<(usize, usize)>
    where
        I: IntoIterator<Item=bool>
{
    let mut runs = vec![];
    let mut run_start: Option<usize> = None;
    let mut line_len = 0;

    for (idx, fillable) in line.into_iter().enumerate() {
        line_len = idx + 1;
        match (fillable, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start > 1 {
                    runs.push((start, idx - start));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if line_len - start > 1 {
            runs.push((start, line_len - start));
        }
    }

    runs
}

impl GridConfig {
    /// Derive slots and crossings from a fillable-cell matrix (`fillable[row][column]`).
    pub fn new(fillable: Vec<Vec<bool>>) -> Result<GridConfig, InputError> {
        let height = fillable.len();
        if height == 0 {
            return Err(InputError::EmptyStructure);
        }
        let width = fillable[0].len();
        if let Some((row, cells)) = fillable.iter().enumerate().find(|(_, cells)| cells.len() != width) {
            return Err(InputError::RaggedStructure { row, expected: width, found: cells.len() });
        }

        let mut slots: Vec<Slot> = vec![];

        for (row, cells) in fillable.iter().enumerate() {
            for (column, length) in find_runs(cells.iter().copied()) {
                slots.push(Slot { row, column, direction: Direction::Across, length });
            }
        }
        for column in 0..width {
            for (row, length) in find_runs(fillable.iter().map(|cells| cells[column])) {
                slots.push(Slot { row, column, direction: Direction::Down, length });
            }
        }

        // Each cell is covered by at most one across and one down slot, since slots are maximal
        // runs. Record (slot id, cell index within slot) for each.
        let mut entries_by_cell: FxHashMap<GridCoord, [Option<(SlotId, usize)>; 2]> =
            FxHashMap::default();

        for (slot_id, slot) in slots.iter().enumerate() {
            let direction_idx = match slot.direction {
                Direction::Across => 0,
                Direction::Down => 1,
            };
            for (cell_idx, loc) in slot.cells().enumerate() {
                entries_by_cell.entry(loc).or_insert([None, None])[direction_idx] =
                    Some((slot_id, cell_idx));
            }
        }

        let slot_configs: Vec<SlotConfig> = slots.iter().enumerate().map(|(slot_id, &slot)| {
            let other_direction_idx = match slot.direction {
                Direction::Across => 1,
                Direction::Down => 0,
            };
            let crossings = slot.cells().map(|loc| {
                entries_by_cell[&loc][other_direction_idx].map(|(other_slot_id, other_slot_cell)| {
                    Crossing { other_slot_id, other_slot_cell }
                })
            }).collect();

            SlotConfig { id: slot_id, slot, crossings }
        }).collect();

        let slot_ids_by_slot = slots.iter().enumerate().map(|(id, &slot)| (slot, id)).collect();

        let config = GridConfig { width, height, fillable, slot_configs, slot_ids_by_slot };
        debug!("Built {} slots with {} crossings", config.slot_count(), config.crossing_count());

        Ok(config)
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    #[inline]
    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slot_configs[slot_id].slot
    }

    /// Look up the id of a slot by value.
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_ids_by_slot.get(slot).copied()
    }

    /// The slots sharing a cell with `slot_id`, in cell order.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item=SlotId> + '_ {
        self.slot_configs[slot_id].crossings.iter().flatten().map(|crossing| crossing.other_slot_id)
    }

    /// How many slots cross this one.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.slot_configs[slot_id].crossings.iter().flatten().count()
    }

    /// Number of cells shared by an across and a down slot.
    pub fn crossing_count(&self) -> usize {
        (0..self.slot_count()).map(|slot_id| self.degree(slot_id)).sum::<usize>() / 2
    }

    /// If `a` and `b` share a cell, the index of that cell within `a` and within `b`.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[a].crossings.iter().enumerate().find_map(|(cell_idx, crossing)| {
            crossing
                .filter(|crossing| crossing.other_slot_id == b)
                .map(|crossing| (cell_idx, crossing.other_slot_cell))
        })
    }
}
