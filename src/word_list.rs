use std::fmt::{Debug, Formatter};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given letter or whatever, based on its index in the WordList's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the WordList's `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Number of cells this word occupies.
    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The vocabulary available to a fill. Words are stored sorted and without duplicates, so a
/// `WordId` is stable for a given set of input words regardless of the order they arrived in.
pub struct WordList {
    pub glyphs: SmallVec<[char; crate::MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list from the given strings. Characters are taken exactly as given; any case
    /// normalization is the caller's business.
    pub fn new<I, S>(words: I) -> WordList
        where
            I: IntoIterator<Item=S>,
            S: Into<String>,
    {
        let mut strings: Vec<String> = words.into_iter().map(Into::into).collect();
        strings.sort();
        strings.dedup();

        let mut glyphs: SmallVec<[char; crate::MAX_GLYPH_COUNT]> = SmallVec::new();
        let mut glyph_ids_by_char: FxHashMap<char, GlyphId> = FxHashMap::default();

        let words = strings.into_iter().map(|string| {
            let word_glyphs = string.chars().map(|c| {
                *glyph_ids_by_char.entry(c).or_insert_with(|| {
                    glyphs.push(c);
                    glyphs.len() - 1
                })
            }).collect();

            Word { string, glyphs: word_glyphs }
        }).collect();

        WordList { glyphs, words }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// The character at the given cell of the given word.
    #[inline]
    pub fn char_at(&self, word_id: WordId, cell_idx: usize) -> char {
        self.glyphs[self.words[word_id].glyphs[cell_idx]]
    }

    /// Look up a word's id by its exact string.
    pub fn find(&self, string: &str) -> Option<WordId> {
        self.words.binary_search_by(|word| word.string.as_str().cmp(string)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_sorted_and_deduplicated() {
        let word_list = WordList::new(["dog", "cat", "dog", "car"]);

        let strings: Vec<&str> = word_list.words.iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, vec!["car", "cat", "dog"]);
        assert_eq!(word_list.find("cat"), Some(1));
        assert_eq!(word_list.find("cow"), None);
    }

    #[test]
    fn test_shared_chars_share_glyph_ids() {
        let word_list = WordList::new(["cat", "act"]);
        let act = word_list.word(word_list.find("act").unwrap());
        let cat = word_list.word(word_list.find("cat").unwrap());

        assert_eq!(act.glyphs[0], cat.glyphs[1]);
        assert_eq!(act.glyphs[1], cat.glyphs[0]);
        assert_eq!(act.glyphs[2], cat.glyphs[2]);
        assert_eq!(word_list.glyphs.len(), 3);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let word_list = WordList::new(["éte"]);

        assert_eq!(word_list.word(0).len(), 3);
        assert_eq!(word_list.char_at(0, 0), 'é');
    }
}
