//! Opening-book reader: hash-indexed access to a compiled `.book` file.
//!
//! A lookup miss is an ordinary absence; callers fall back to search.

use std::collections::BTreeMap;
use std::path::Path;

use crate::book::book_builder::read_book_file;
use crate::book::book_entry::{BookEntry, BookError};
use crate::game_state::chess_types::GameState;

#[derive(Debug, Default)]
pub struct OpeningBook {
    entries: BTreeMap<u64, BookEntry>,
}

impl OpeningBook {
    /// Load a compiled book file. Missing or truncated files surface as
    /// errors; they are never retried here.
    pub fn open(path: &Path) -> Result<Self, BookError> {
        Ok(Self {
            entries: read_book_file(path)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a position hash, if booked.
    #[inline]
    pub fn entry(&self, hash: u64) -> Option<&BookEntry> {
        self.entries.get(&hash)
    }

    /// Entry for a live board's current position.
    #[inline]
    pub fn entry_for(&self, state: &GameState) -> Option<&BookEntry> {
        self.entry(state.zobrist_key)
    }
}
