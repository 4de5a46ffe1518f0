//! Position-indexed depth book for one side of one discipline.
//!
//! Rows are kept best first in a `Vec`, so every mutation is a plain
//! shift over at most `window_size` entries:
//!
//! - O(window) insertion and deletion
//! - O(1) positional reads
//! - Whole-book snapshots under a single read lock

use parking_lot::RwLock;

use crate::error::BookError;
use crate::types::{BookEntry, Discipline, Side};

/// Unsynchronized book contents.
#[derive(Debug, Clone, PartialEq)]
struct BookState {
    window_size: usize,
    book_type: String,
    entries: Vec<BookEntry>,
}

impl BookState {
    fn add(&mut self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        let len = self.entries.len();
        if pos > len {
            return Err(BookError::PositionGap { pos, len });
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(self.window_size);
        Ok(())
    }

    fn delete(&mut self, pos: usize) {
        if pos < self.entries.len() {
            self.entries.remove(pos);
        }
    }

    fn delete_better_or_equal(&mut self, pos: usize) {
        let end = pos.saturating_add(1).min(self.entries.len());
        self.entries.drain(..end);
    }

    fn execute(&mut self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        self.set_existing(pos, entry)?;
        self.entries.drain(..pos);
        Ok(())
    }

    fn set_existing(&mut self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        let len = self.entries.len();
        match self.entries.get_mut(pos) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(BookError::MissingPosition { pos, len }),
        }
    }

    /// Set `pos`, padding with placeholders when it lies past the end
    fn set_extending(&mut self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        if pos >= self.window_size {
            return Err(BookError::BeyondWindow {
                pos,
                window_size: self.window_size,
            });
        }
        if pos >= self.entries.len() {
            self.entries.resize_with(pos + 1, BookEntry::default);
        }
        self.entries[pos] = entry;
        Ok(())
    }

    fn replace_by_broker(&mut self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        let same_broker = self
            .entries
            .get(pos)
            .is_some_and(|current| current.is_valid() && current.broker() == entry.broker());
        if same_broker {
            self.entries[pos] = entry;
            Ok(())
        } else {
            self.add(pos, entry)
        }
    }

    fn get(&self, pos: usize) -> Option<&BookEntry> {
        self.entries.get(pos).filter(|entry| entry.is_valid())
    }
}

/// Depth book for a single side of a single discipline.
///
/// # Design Decisions
///
/// 1. **Positional rows**: The feed addresses rows by position, not by
///    price, so rows live in a `Vec` ordered best first. Position 0 is the
///    most superior price or order.
///
/// 2. **Bounded depth**: Any mutation that grows the book keeps
///    `len() <= window_size()`. Inserts push the deepest rows out;
///    extending replaces are refused past the window.
///
/// 3. **Placeholders**: Replacing past the end pads with default
///    (invalid) entries, which [`get`](Self::get) reports as empty.
///
/// # Thread Safety
///
/// The book is internally synchronized with a `parking_lot::RwLock`. Every
/// mutation holds the write lock for its whole shift, so readers never see a
/// half-applied update; use [`snapshot`](Self::snapshot) to read several rows
/// consistently.
#[derive(Debug)]
pub struct DepthBook {
    discipline: Discipline,
    side: Side,
    state: RwLock<BookState>,
}

impl DepthBook {
    /// Create an empty book
    #[must_use]
    pub fn new(discipline: Discipline, side: Side, window_size: usize) -> Self {
        Self {
            discipline,
            side,
            state: RwLock::new(BookState {
                window_size,
                book_type: discipline.as_str().to_string(),
                entries: Vec::with_capacity(window_size),
            }),
        }
    }

    /// Book discipline
    #[must_use]
    pub const fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Book side
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Set the maximum depth, dropping rows past it
    pub fn set_window_size(&self, window_size: usize) {
        let mut state = self.state.write();
        state.window_size = window_size;
        state.entries.truncate(window_size);
    }

    /// Maximum depth
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.state.read().window_size
    }

    /// Set the book type label
    pub fn set_book_type(&self, book_type: impl Into<String>) {
        self.state.write().book_type = book_type.into();
    }

    /// Book type label
    #[must_use]
    pub fn book_type(&self) -> String {
        self.state.read().book_type.clone()
    }

    /// Number of occupied positions, placeholders included
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the book holds no positions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Insert at `pos`, shifting `pos` and deeper rows down by one
    ///
    /// # Errors
    ///
    /// Returns [`BookError::PositionGap`] if `pos > len()`; the book is left
    /// unchanged.
    pub fn add(&self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        self.state.write().add(pos, entry)
    }

    /// Remove `pos`, shifting deeper rows up by one. No-op past the end.
    pub fn delete(&self, pos: usize) {
        self.state.write().delete(pos);
    }

    /// Empty the book
    pub fn delete_all(&self) {
        self.clear_all();
    }

    /// Empty the book
    pub fn clear_all(&self) {
        self.state.write().entries.clear();
    }

    /// Empty the book
    pub fn delete_side(&self) {
        self.clear_all();
    }

    /// Remove `pos` and every better row (`[0, pos]` inclusive)
    pub fn delete_better_or_equal(&self, pos: usize) {
        self.state.write().delete_better_or_equal(pos);
    }

    /// Replace `pos` with `entry` and remove every better row (`[0, pos)`)
    ///
    /// # Errors
    ///
    /// Returns [`BookError::MissingPosition`] if `pos >= len()`.
    pub fn execute(&self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        self.state.write().execute(pos, entry)
    }

    /// Replace `pos` in place
    ///
    /// # Errors
    ///
    /// Returns [`BookError::MissingPosition`] if `pos >= len()`.
    pub fn modify(&self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        self.state.write().set_existing(pos, entry)
    }

    /// Set `pos`, padding with placeholders if it lies past the end
    ///
    /// # Errors
    ///
    /// Returns [`BookError::BeyondWindow`] if `pos >= window_size()`.
    pub fn replace(&self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        self.state.write().set_extending(pos, entry)
    }

    /// Blank `pos` without collapsing the book
    ///
    /// # Errors
    ///
    /// Returns [`BookError::BeyondWindow`] if `pos >= window_size()`.
    pub fn replace_clear(&self, pos: usize) -> Result<(), BookError> {
        self.state.write().set_extending(pos, BookEntry::default())
    }

    /// Requote a broker's order.
    ///
    /// If the row at `pos` belongs to the same broker it is replaced in
    /// place; otherwise `entry` is inserted at `pos` as by [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`BookError::WrongDiscipline`] on a by-level book, or the
    /// [`add`](Self::add) error when inserting.
    pub fn replace_by_broker(&self, pos: usize, entry: BookEntry) -> Result<(), BookError> {
        if self.discipline != Discipline::ByOrder {
            return Err(BookError::WrongDiscipline {
                operation: "replace_by_broker",
                discipline: self.discipline,
            });
        }
        self.state.write().replace_by_broker(pos, entry)
    }

    /// Get the valid entry at `pos`
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<BookEntry> {
        self.state.read().get(pos).cloned()
    }

    /// Get the best valid entry (position 0)
    #[must_use]
    pub fn best(&self) -> Option<BookEntry> {
        self.get(0)
    }

    /// Copy the whole book under one read lock
    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        let state = self.state.read();
        BookSnapshot {
            discipline: self.discipline,
            side: self.side,
            window_size: state.window_size,
            book_type: state.book_type.clone(),
            entries: state.entries.clone(),
        }
    }

    /// Get the first `n` positions as seen by a reader
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<Option<BookEntry>> {
        let state = self.state.read();
        (0..n).map(|pos| state.get(pos).cloned()).collect()
    }
}

/// Point-in-time copy of a [`DepthBook`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    /// Book discipline
    pub discipline: Discipline,
    /// Book side
    pub side: Side,
    /// Maximum depth
    pub window_size: usize,
    /// Book type label
    pub book_type: String,
    /// Rows, best first, placeholders included
    pub entries: Vec<BookEntry>,
}

impl BookSnapshot {
    /// Number of occupied positions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no positions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the valid entry at `pos`
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&BookEntry> {
        self.entries.get(pos).filter(|entry| entry.is_valid())
    }

    /// Iterate over valid entries with their positions
    pub fn levels(&self) -> impl Iterator<Item = (usize, &BookEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_valid())
    }

    /// Total size over valid entries
    #[must_use]
    pub fn total_size(&self) -> i64 {
        self.levels().map(|(_, entry)| i64::from(entry.size())).sum()
    }
}
