//! Screen positions for rendering.
//!
//! A [`Position`] is a cell relative to the top-left corner of the prompt,
//! not of the terminal: `(0, 0)` is where the prefix starts. The renderer
//! computes one per frame and only keeps the last one around to find its way
//! back to the origin.

use crate::units::DisplayWidth;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Column and row relative to the prompt origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: DisplayWidth,
    pub y: usize,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: DisplayWidth::ZERO,
        y: 0,
    };

    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self {
            x: DisplayWidth(x),
            y,
        }
    }

    /// Continue from `self` with a position measured from `self`.
    ///
    /// On the same row the columns add up; once `other` has moved down, its
    /// column is absolute because the row started over at column 0.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        if other.y == 0 {
            Self {
                x: self.x + other.x,
                y: self.y,
            }
        } else {
            Self {
                x: other.x,
                y: self.y + other.y,
            }
        }
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Component-wise difference, saturating at zero.
    #[must_use]
    pub fn subtract(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y.saturating_sub(other.y),
        }
    }
}

// ---------------------------------------------------------------------------
// Measuring text
// ---------------------------------------------------------------------------

/// Where the cursor ends up after printing `s` from the origin on a terminal
/// `columns` wide.
///
/// `\n` and `\r\n` start a new row; a lone `\r` is ignored. When a row fills
/// up exactly the cursor moves to the start of the next one, and a glyph
/// that does not fit in what is left of the row wraps before it is printed.
/// `columns == 0` disables wrapping.
#[must_use]
pub fn position_at_end_of_str(s: &str, columns: DisplayWidth) -> Position {
    let columns = columns.get();
    let mut right = 0usize;
    let mut down = 0usize;

    for c in s.chars() {
        match c {
            '\r' => {}
            '\n' => {
                down += 1;
                right = 0;
            }
            _ => {
                let w = DisplayWidth::of_char(c).get();
                if columns > 0 && right + w > columns {
                    right = 0;
                    down += 1;
                }
                right += w;
                if columns > 0 && right == columns {
                    right = 0;
                    down += 1;
                }
            }
        }
    }

    Position::new(right, down)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(s: &str, columns: usize) -> Position {
        position_at_end_of_str(s, DisplayWidth(columns))
    }

    // -- Arithmetic ---------------------------------------------------------

    #[test]
    fn join_on_same_row_adds_columns() {
        let p = Position::new(3, 1).join(Position::new(4, 0));
        assert_eq!(p, Position::new(7, 1));
    }

    #[test]
    fn join_across_rows_takes_other_column() {
        let p = Position::new(3, 1).join(Position::new(2, 2));
        assert_eq!(p, Position::new(2, 3));
    }

    #[test]
    fn add_and_subtract() {
        let a = Position::new(5, 2);
        let b = Position::new(2, 1);
        assert_eq!(a.add(b), Position::new(7, 3));
        assert_eq!(a.subtract(b), Position::new(3, 1));
        assert_eq!(b.subtract(a), Position::ORIGIN);
    }

    // -- position_at_end_of_str ---------------------------------------------

    #[test]
    fn empty_string_stays_at_origin() {
        assert_eq!(at_end("", 20), Position::ORIGIN);
    }

    #[test]
    fn one_char() {
        assert_eq!(at_end("f", 20), Position::new(1, 0));
    }

    #[test]
    fn single_line() {
        assert_eq!(at_end("foo bar", 20), Position::new(7, 0));
    }

    #[test]
    fn newlines_start_rows() {
        assert_eq!(at_end("foo\nbar\n", 20), Position::new(0, 2));
    }

    #[test]
    fn crlf_is_one_newline() {
        assert_eq!(at_end("foo\r\nbar", 20), Position::new(3, 1));
    }

    #[test]
    fn exact_fill_wraps() {
        assert_eq!(at_end("foobar", 3), Position::new(0, 2));
    }

    #[test]
    fn wide_glyph_wraps_early() {
        // "aあ" on 2 columns: 'あ' cannot straddle the edge.
        assert_eq!(at_end("aあ", 2), Position::new(0, 2));
        assert_eq!(at_end("aあ", 3), Position::new(0, 1));
    }

    #[test]
    fn zero_columns_never_wraps() {
        assert_eq!(at_end("abcdef", 0), Position::new(6, 0));
    }
}
