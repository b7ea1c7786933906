//! Read-only snapshot of the input text and cursor.
//!
//! A [`Document`] answers every "where is the cursor" question the editing
//! commands and the renderer ask: text before and after the cursor, the
//! current line, the word around the cursor, row/column decomposition, and
//! the relative offsets for cursor motions. It is never mutated; the
//! [`Buffer`](crate::buffer::Buffer) builds a new one after each edit.
//!
//! All offsets are [`RuneIndex`] (chars). Motions return a signed *relative*
//! offset that the buffer adds to its cursor.
//!
//! Row lookup goes through a sorted array of line-start offsets and an
//! insertion-point search, so any offset maps to the last line starting at
//! or before it.

use crate::position::{Position, position_at_end_of_str};
use crate::units::{ByteIndex, DisplayWidth, RuneIndex, byte_index, rune_len};

/// Separator set used by the word queries that take none.
const SPACE: &str = " ";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Text plus cursor, with precomputed line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor: RuneIndex,
    /// Byte offset of `cursor`, for slicing.
    cursor_byte: ByteIndex,
    /// Rune offset of the first char of every line. Never empty.
    line_starts: Vec<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(String::new(), RuneIndex::ZERO)
    }
}

impl Document {
    /// Build a document. The cursor is clamped into `[0, rune_len(text)]`.
    #[must_use]
    pub fn new(text: impl Into<String>, cursor: RuneIndex) -> Self {
        let text = text.into();
        let cursor = cursor.min(rune_len(&text));
        let cursor_byte = byte_index(&text, cursor);

        let mut line_starts = vec![0];
        line_starts.extend(
            text.chars()
                .enumerate()
                .filter(|&(_, c)| c == '\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            text,
            cursor,
            cursor_byte,
            line_starts,
        }
    }

    // -- Basic accessors ----------------------------------------------------

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub const fn cursor_position(&self) -> RuneIndex {
        self.cursor
    }

    #[must_use]
    pub fn text_before_cursor(&self) -> &str {
        &self.text[..self.cursor_byte.get()]
    }

    #[must_use]
    pub fn text_after_cursor(&self) -> &str {
        &self.text[self.cursor_byte.get()..]
    }

    /// The char `offset` runes away from the cursor. `0` is the char under
    /// the cursor, `-1` the one just before it.
    #[must_use]
    pub fn char_relative_to_cursor(&self, offset: isize) -> Option<char> {
        let idx = self.cursor.get().checked_add_signed(offset)?;
        self.text.chars().nth(idx)
    }

    // -- Lines --------------------------------------------------------------

    /// Text from the start of the cursor's line up to the cursor.
    #[must_use]
    pub fn current_line_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        before.rfind('\n').map_or(before, |i| &before[i + 1..])
    }

    /// Text from the cursor to the end of its line.
    #[must_use]
    pub fn current_line_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        after.find('\n').map_or(after, |i| &after[..i])
    }

    #[must_use]
    pub fn current_line(&self) -> String {
        let mut line = self.current_line_before_cursor().to_owned();
        line.push_str(self.current_line_after_cursor());
        line
    }

    /// All lines. A trailing `\n` starts an empty last line.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    #[must_use]
    pub fn cursor_position_row(&self) -> usize {
        self.translate_index_to_position(self.cursor).0
    }

    #[must_use]
    pub fn cursor_position_col(&self) -> usize {
        self.translate_index_to_position(self.cursor).1
    }

    #[must_use]
    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() + 1 == self.line_count()
    }

    /// Whitespace at the start of the cursor's line.
    #[must_use]
    pub fn leading_whitespace_in_current_line(&self) -> String {
        let line = self.current_line();
        let trimmed = line.trim_start().len();
        line[..line.len() - trimmed].to_owned()
    }

    /// `(row, col)` of a rune offset.
    #[must_use]
    pub fn translate_index_to_position(&self, index: RuneIndex) -> (usize, usize) {
        let index = index.get();
        let row = self
            .line_starts
            .partition_point(|&start| start <= index)
            .saturating_sub(1);
        (row, index - self.line_starts[row])
    }

    /// Rune offset of `(row, col)`. The row is clamped to the existing
    /// lines and the column to the length of that line.
    #[must_use]
    pub fn translate_row_col_to_index(&self, row: usize, col: usize) -> RuneIndex {
        let row = row.min(self.line_count() - 1);
        let start = self.line_starts[row];
        let line_len = self.line_len(row);
        RuneIndex((start + col.min(line_len)).min(rune_len(&self.text).get()))
    }

    /// Length of line `row` in runes, without its newline.
    fn line_len(&self, row: usize) -> usize {
        let start = self.line_starts[row];
        self.line_starts.get(row + 1).map_or_else(
            || rune_len(&self.text).get() - start,
            |&next| next - start - 1,
        )
    }

    // -- Cursor motions -----------------------------------------------------

    /// Relative offset for moving left `count` runes without leaving the line.
    #[must_use]
    pub fn cursor_left_position(&self, count: usize) -> isize {
        -signed(count.min(self.cursor_position_col()))
    }

    /// Relative offset for moving right `count` runes without leaving the line.
    #[must_use]
    pub fn cursor_right_position(&self, count: usize) -> isize {
        signed(count.min(rune_len(self.current_line_after_cursor()).get()))
    }

    /// Relative offset for moving up `count` rows. The column is
    /// `preferred_column`, or the current one, clamped into the target line.
    #[must_use]
    pub fn cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_sub(count);
        self.relative_to(self.translate_row_col_to_index(row, col))
    }

    /// Relative offset for moving down `count` rows. See
    /// [`cursor_up_position`](Self::cursor_up_position).
    #[must_use]
    pub fn cursor_down_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_add(count);
        self.relative_to(self.translate_row_col_to_index(row, col))
    }

    /// Runes between the cursor and the end of its line.
    #[must_use]
    pub fn end_of_line_position(&self) -> RuneIndex {
        rune_len(self.current_line_after_cursor())
    }

    fn relative_to(&self, target: RuneIndex) -> isize {
        signed(target.get()) - signed(self.cursor.get())
    }

    // -- Display ------------------------------------------------------------

    /// Screen position of the cursor when the text is printed from column 0
    /// of a terminal `columns` wide.
    #[must_use]
    pub fn display_cursor_position(&self, columns: DisplayWidth) -> Position {
        position_at_end_of_str(self.text_before_cursor(), columns)
    }

    // -- Words --------------------------------------------------------------

    /// The word right before the cursor, stopping at the first space. Empty
    /// when a space is next to the cursor.
    #[must_use]
    pub fn word_before_cursor(&self) -> &str {
        self.word_before_cursor_until_separator(SPACE)
    }

    /// Like [`word_before_cursor`](Self::word_before_cursor), but spaces
    /// right before the cursor belong to the word.
    #[must_use]
    pub fn word_before_cursor_with_space(&self) -> &str {
        self.word_before_cursor_until_separator_ignore_next_to_cursor(SPACE)
    }

    #[must_use]
    pub fn word_after_cursor(&self) -> &str {
        self.word_after_cursor_until_separator(SPACE)
    }

    #[must_use]
    pub fn word_after_cursor_with_space(&self) -> &str {
        self.word_after_cursor_until_separator_ignore_next_to_cursor(SPACE)
    }

    /// The word before the cursor, where any char of `sep` ends a word.
    /// An empty `sep` means a single space.
    #[must_use]
    pub fn word_before_cursor_until_separator(&self, sep: &str) -> &str {
        let before = self.text_before_cursor();
        &before[start_of_word(before, or_space(sep))..]
    }

    #[must_use]
    pub fn word_before_cursor_until_separator_ignore_next_to_cursor(&self, sep: &str) -> &str {
        let before = self.text_before_cursor();
        &before[start_of_word_ignoring_tail(before, or_space(sep))..]
    }

    #[must_use]
    pub fn word_after_cursor_until_separator(&self, sep: &str) -> &str {
        let after = self.text_after_cursor();
        &after[..end_of_word(after, or_space(sep))]
    }

    #[must_use]
    pub fn word_after_cursor_until_separator_ignore_next_to_cursor(&self, sep: &str) -> &str {
        let after = self.text_after_cursor();
        &after[..end_of_word_ignoring_head(after, or_space(sep))]
    }

    /// Start of the word before the cursor, as a rune offset into
    /// [`text_before_cursor`](Self::text_before_cursor).
    #[must_use]
    pub fn find_start_of_previous_word(&self) -> RuneIndex {
        self.find_start_of_previous_word_until_separator(SPACE)
    }

    #[must_use]
    pub fn find_start_of_previous_word_with_space(&self) -> RuneIndex {
        self.find_start_of_previous_word_until_separator_ignore_next_to_cursor(SPACE)
    }

    #[must_use]
    pub fn find_start_of_previous_word_until_separator(&self, sep: &str) -> RuneIndex {
        let before = self.text_before_cursor();
        rune_len(&before[..start_of_word(before, or_space(sep))])
    }

    #[must_use]
    pub fn find_start_of_previous_word_until_separator_ignore_next_to_cursor(
        &self,
        sep: &str,
    ) -> RuneIndex {
        let before = self.text_before_cursor();
        rune_len(&before[..start_of_word_ignoring_tail(before, or_space(sep))])
    }

    /// End of the word after the cursor, as a rune offset into
    /// [`text_after_cursor`](Self::text_after_cursor).
    #[must_use]
    pub fn find_end_of_current_word(&self) -> RuneIndex {
        self.find_end_of_current_word_until_separator(SPACE)
    }

    #[must_use]
    pub fn find_end_of_current_word_with_space(&self) -> RuneIndex {
        self.find_end_of_current_word_until_separator_ignore_next_to_cursor(SPACE)
    }

    #[must_use]
    pub fn find_end_of_current_word_until_separator(&self, sep: &str) -> RuneIndex {
        let after = self.text_after_cursor();
        rune_len(&after[..end_of_word(after, or_space(sep))])
    }

    #[must_use]
    pub fn find_end_of_current_word_until_separator_ignore_next_to_cursor(
        &self,
        sep: &str,
    ) -> RuneIndex {
        let after = self.text_after_cursor();
        rune_len(&after[..end_of_word_ignoring_head(after, or_space(sep))])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[allow(clippy::cast_possible_wrap)]
const fn signed(n: usize) -> isize {
    n as isize
}

const fn or_space(sep: &str) -> &str {
    if sep.is_empty() { SPACE } else { sep }
}

/// Byte offset just past the last separator in `s`, or 0.
fn start_of_word(s: &str, sep: &str) -> usize {
    s.char_indices()
        .rev()
        .find(|&(_, c)| sep.contains(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Like [`start_of_word`], after skipping separators at the end of `s`.
fn start_of_word_ignoring_tail(s: &str, sep: &str) -> usize {
    let Some((end, _)) = s.char_indices().rev().find(|&(_, c)| !sep.contains(c)) else {
        return 0;
    };
    start_of_word(&s[..end], sep)
}

/// Byte offset of the first separator in `s`, or `s.len()`.
fn end_of_word(s: &str, sep: &str) -> usize {
    s.find(|c| sep.contains(c)).unwrap_or(s.len())
}

/// Like [`end_of_word`], after skipping separators at the start of `s`.
fn end_of_word_ignoring_head(s: &str, sep: &str) -> usize {
    let Some(start) = s.find(|c| !sep.contains(c)) else {
        return s.len();
    };
    start + end_of_word(&s[start..], sep)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
