use std::fmt::{self, Display, Formatter};

use crate::backtracking_search::{Assignment, Choice};
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// One cell of a filled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Block,
    /// A fillable cell and the letter placed there, if any slot covering it has been assigned.
    Open(Option<char>),
}

/// The letters an assignment places in each cell, laid out as `cells[row][column]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterGrid {
    pub cells: Vec<Vec<Cell>>,
}

impl LetterGrid {
    /// Overlay each assigned slot's word across the cells it spans.
    pub fn new(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> LetterGrid {
        let mut cells: Vec<Vec<Cell>> = config.fillable.iter().map(|row| {
            row.iter().map(|&fillable| if fillable { Cell::Open(None) } else { Cell::Block }).collect()
        }).collect();

        for Choice { slot_id, word_id } in assignment.choices() {
            for (cell_idx, (row, column)) in config.slot(slot_id).cells().enumerate() {
                cells[row][column] = Cell::Open(Some(word_list.char_at(word_id, cell_idx)));
            }
        }

        LetterGrid { cells }
    }

    /// The letter at a cell, if it holds one.
    pub fn letter(&self, row: usize, column: usize) -> Option<char> {
        match self.cells.get(row)?.get(column)? {
            Cell::Open(letter) => *letter,
            Cell::Block => None,
        }
    }
}

/// Letters print as themselves, unfilled cells as spaces, and blocks as `█`.
impl Display for LetterGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (row_idx, row) in self.cells.iter().enumerate() {
            if row_idx > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let display_char = match cell {
                    Cell::Block => '█',
                    Cell::Open(Some(letter)) => *letter,
                    Cell::Open(None) => ' ',
                };
                write!(f, "{}", display_char)?;
            }
        }
        Ok(())
    }
}
