//! Mutable edit state for one input session.
//!
//! The [`Buffer`] owns the text being typed and the cursor, and exposes the
//! editing primitives that key bindings call. Queries go through
//! [`document`](Buffer::document), which returns a [`Document`] snapshot.
//!
//! The snapshot is memoized in a `OnceCell`. Every mutating method empties
//! the cell, and the next `document()` call rebuilds it from the current
//! text and cursor, so the two can never disagree.
//!
//! Cursor arithmetic is in runes and every operation clamps: deleting more
//! than exists, or moving past either end, stops at the boundary.

use std::cell::OnceCell;

use crate::document::Document;
use crate::position::Position;
use crate::units::{DisplayWidth, RuneIndex, rune_len, rune_slice};

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The line being edited, its cursor, and a cached [`Document`].
#[derive(Debug, Clone)]
pub struct Buffer {
    /// Working copies of the input. Only `working_lines[working_index]` is
    /// edited; the stack exists so a session can hold alternate versions.
    working_lines: Vec<String>,
    working_index: usize,
    cursor: RuneIndex,
    /// Column that vertical motions aim for. Set by `cursor_up`/`cursor_down`
    /// and forgotten by any other change.
    preferred_column: Option<usize>,
    cache: OnceCell<Document>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// An empty buffer with the cursor at 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            working_lines: vec![String::new()],
            working_index: 0,
            cursor: RuneIndex::ZERO,
            preferred_column: None,
            cache: OnceCell::new(),
        }
    }

    /// A buffer holding `text` with the cursor at its end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.insert_text(text, false, true);
        buf
    }

    // -- Queries ------------------------------------------------------------

    #[must_use]
    pub fn text(&self) -> &str {
        &self.working_lines[self.working_index]
    }

    #[inline]
    #[must_use]
    pub const fn cursor_position(&self) -> RuneIndex {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }

    /// Snapshot of the current text and cursor. Rebuilt only after a change.
    pub fn document(&self) -> &Document {
        self.cache
            .get_or_init(|| Document::new(self.text().to_owned(), self.cursor))
    }

    /// Screen position of the cursor on a terminal `columns` wide.
    #[must_use]
    pub fn display_cursor_position(&self, columns: DisplayWidth) -> Position {
        self.document().display_cursor_position(columns)
    }

    // -- Raw setters --------------------------------------------------------

    /// Replace the text. The cursor is kept, clamped to the new length.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.cursor = self.cursor.min(rune_len(&text));
        self.working_lines[self.working_index] = text;
        self.changed();
    }

    /// Move the cursor to `pos`, clamped to the text.
    pub fn set_cursor_position(&mut self, pos: RuneIndex) {
        self.cursor = pos.min(rune_len(self.text()));
        self.changed();
    }

    /// Set text and cursor together.
    fn set_document(&mut self, text: String, cursor: RuneIndex) {
        self.cursor = cursor.min(rune_len(&text));
        self.working_lines[self.working_index] = text;
        self.changed();
    }

    /// Drop the cached document and the remembered column.
    fn changed(&mut self) {
        self.cache.take();
        self.preferred_column = None;
    }

    fn move_cursor_by(&mut self, delta: isize) {
        let target = self.cursor.offset(delta);
        self.set_cursor_position(target);
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at the cursor.
    ///
    /// With `overwrite`, as many runes after the cursor as `text` has are
    /// replaced, but never past the end of the current line. With
    /// `move_cursor`, the cursor ends up after the inserted text.
    pub fn insert_text(&mut self, text: &str, overwrite: bool, move_cursor: bool) {
        let current = self.text();
        let cursor = self.cursor;
        let inserted = rune_len(text);

        let replaced = if overwrite {
            let span = rune_slice(current, cursor, RuneIndex(cursor.get() + inserted.get()));
            rune_len(span.split('\n').next().unwrap_or_default()).get()
        } else {
            0
        };

        let mut next = String::with_capacity(current.len() + text.len());
        next.push_str(rune_slice(current, RuneIndex::ZERO, cursor));
        next.push_str(text);
        next.push_str(rune_slice(
            current,
            RuneIndex(cursor.get() + replaced),
            rune_len(current),
        ));

        let cursor = if move_cursor {
            RuneIndex(cursor.get() + inserted.get())
        } else {
            cursor
        };
        self.set_document(next, cursor);
    }

    /// Delete up to `count` runes before the cursor and return them.
    pub fn delete_before_cursor(&mut self, count: usize) -> String {
        let end = self.cursor;
        let start = RuneIndex(end.get().saturating_sub(count));
        if start == end {
            return String::new();
        }

        let current = self.text();
        let deleted = rune_slice(current, start, end).to_owned();
        let mut next = rune_slice(current, RuneIndex::ZERO, start).to_owned();
        next.push_str(rune_slice(current, end, rune_len(current)));

        self.set_document(next, start);
        deleted
    }

    /// Delete up to `count` runes after the cursor and return them.
    pub fn delete(&mut self, count: usize) -> String {
        let start = self.cursor;
        let current = self.text();
        let end = RuneIndex(start.get().saturating_add(count)).min(rune_len(current));
        if start == end {
            return String::new();
        }

        let deleted = rune_slice(current, start, end).to_owned();
        let mut next = rune_slice(current, RuneIndex::ZERO, start).to_owned();
        next.push_str(rune_slice(current, end, rune_len(current)));

        self.set_document(next, start);
        deleted
    }

    /// Insert a line break. With `copy_margin`, the new line starts with the
    /// leading whitespace of the current one.
    pub fn new_line(&mut self, copy_margin: bool) {
        if copy_margin {
            let margin = self.document().leading_whitespace_in_current_line();
            self.insert_text(&format!("\n{margin}"), false, true);
        } else {
            self.insert_text("\n", false, true);
        }
    }

    /// Join the next line onto the current one with `separator`, dropping
    /// the next line's leading spaces. No-op on the last line.
    pub fn join_next_line(&mut self, separator: &str) {
        if self.document().on_last_line() {
            return;
        }

        let end = self.document().end_of_line_position();
        self.set_cursor_position(RuneIndex(self.cursor.get() + end.get()));
        self.delete(1);

        let doc = self.document();
        let mut next = doc.text_before_cursor().to_owned();
        next.push_str(separator);
        next.push_str(doc.text_after_cursor().trim_start_matches(' '));
        let cursor = self.cursor;
        self.set_document(next, cursor);
    }

    /// Transpose the two runes before the cursor.
    pub fn swap_characters_before_cursor(&mut self) {
        let pos = self.cursor.get();
        if pos < 2 {
            return;
        }

        let current = self.text();
        let mut next = rune_slice(current, RuneIndex::ZERO, RuneIndex(pos - 2)).to_owned();
        next.push_str(rune_slice(current, RuneIndex(pos - 1), RuneIndex(pos)));
        next.push_str(rune_slice(current, RuneIndex(pos - 2), RuneIndex(pos - 1)));
        next.push_str(rune_slice(current, RuneIndex(pos), rune_len(current)));

        let cursor = self.cursor;
        self.set_document(next, cursor);
    }

    // -- Cursor motion ------------------------------------------------------

    /// Move left, stopping at the start of the line.
    pub fn cursor_left(&mut self, count: usize) {
        let delta = self.document().cursor_left_position(count);
        self.move_cursor_by(delta);
    }

    /// Move right, stopping at the end of the line.
    pub fn cursor_right(&mut self, count: usize) {
        let delta = self.document().cursor_right_position(count);
        self.move_cursor_by(delta);
    }

    /// Move up `count` rows, aiming for the remembered column.
    pub fn cursor_up(&mut self, count: usize) {
        let column = self
            .preferred_column
            .unwrap_or_else(|| self.document().cursor_position_col());
        let delta = self.document().cursor_up_position(count, Some(column));
        self.move_cursor_by(delta);
        self.preferred_column = Some(column);
    }

    /// Move down `count` rows, aiming for the remembered column.
    pub fn cursor_down(&mut self, count: usize) {
        let column = self
            .preferred_column
            .unwrap_or_else(|| self.document().cursor_position_col());
        let delta = self.document().cursor_down_position(count, Some(column));
        self.move_cursor_by(delta);
        self.preferred_column = Some(column);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
