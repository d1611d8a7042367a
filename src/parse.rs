//! Reading puzzle structures and word lists from text.
//!
//! A structure has one grid row per line. `_` or `.` marks a fillable cell and anything else is a
//! block. Lines shorter than the longest one are padded out with blocks, and blank lines before
//! or after the grid are dropped.
//!
//! A word list has one word per line. Words are trimmed and upper-cased, and blank lines are
//! skipped.

use std::fs;
use std::path::Path;

use crate::errors::InputError;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

fn is_fillable(c: char) -> bool {
    c == '_' || c == '.'
}

/// Build a grid config from a structure template.
pub fn parse_structure(template: &str) -> Result<GridConfig, InputError> {
    let mut lines: Vec<Vec<char>> =
        template.lines().map(|line| line.trim_end_matches('\r').chars().collect()).collect();

    let is_blank = |line: &Vec<char>| line.iter().all(|c| c.is_whitespace());
    while lines.last().map(is_blank).unwrap_or(false) {
        lines.pop();
    }
    let leading_blank_lines = lines.iter().take_while(|line| is_blank(line)).count();
    lines.drain(..leading_blank_lines);
    if lines.is_empty() {
        return Err(InputError::EmptyStructure);
    }

    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    let fillable: Vec<Vec<bool>> = lines.iter().map(|line| {
        (0..width).map(|column| line.get(column).copied().map(is_fillable).unwrap_or(false)).collect()
    }).collect();

    if !fillable.iter().flatten().any(|&cell| cell) {
        return Err(InputError::NoFillableCells);
    }

    GridConfig::new(fillable)
}

/// Build a word list from newline-separated words.
pub fn parse_word_list(contents: &str) -> Result<WordList, InputError> {
    let words: Vec<String> = contents.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_uppercase)
        .collect();

    if words.is_empty() {
        return Err(InputError::EmptyVocabulary);
    }

    Ok(WordList::new(words))
}

pub fn load_structure<P: AsRef<Path>>(path: P) -> Result<GridConfig, InputError> {
    parse_structure(&fs::read_to_string(path)?)
}

pub fn load_word_list<P: AsRef<Path>>(path: P) -> Result<WordList, InputError> {
    parse_word_list(&fs::read_to_string(path)?)
}
