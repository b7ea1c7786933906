//! Index and width units.
//!
//! Three different numbers describe "where" in a line of text and they must
//! never be mixed up:
//!
//! - **[`ByteIndex`]**: offset into the UTF-8 bytes of a `String`. Only
//!   valid on a char boundary. Used for slicing.
//! - **[`RuneIndex`]**: offset in Unicode scalar values (chars). The cursor
//!   lives in this unit.
//! - **[`DisplayWidth`]**: terminal columns. `'a'` is 1, `'あ'` is 2,
//!   control characters and combining marks are 0.
//!
//! Conversions are explicit functions. There is no `From<RuneIndex> for
//! ByteIndex` because the conversion needs the text.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use unicode_width::UnicodeWidthChar;

// ---------------------------------------------------------------------------
// RuneIndex
// ---------------------------------------------------------------------------

/// Offset in chars from the start of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RuneIndex(pub usize);

impl RuneIndex {
    pub const ZERO: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Move by a signed amount, clamping at zero.
    #[inline]
    #[must_use]
    pub const fn offset(self, delta: isize) -> Self {
        Self(self.0.saturating_add_signed(delta))
    }
}

impl fmt::Display for RuneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// ByteIndex
// ---------------------------------------------------------------------------

/// Offset in bytes into a UTF-8 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteIndex(pub usize);

impl ByteIndex {
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// DisplayWidth
// ---------------------------------------------------------------------------

/// Width in terminal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayWidth(pub usize);

impl DisplayWidth {
    pub const ZERO: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Columns occupied by one char.
    ///
    /// Control characters are 0 here, even though `unicode-width` would give
    /// some of them a width: the renderer never prints them as glyphs.
    #[must_use]
    pub fn of_char(c: char) -> Self {
        if c.is_control() {
            return Self::ZERO;
        }
        Self(c.width().unwrap_or(0))
    }

    /// Columns occupied by a whole string, summed per char.
    #[must_use]
    pub fn of_str(s: &str) -> Self {
        Self(s.chars().map(|c| Self::of_char(c).0).sum())
    }

    /// Signed form, for relative cursor moves.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn signed(self) -> isize {
        self.0 as isize
    }
}

impl Add for DisplayWidth {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for DisplayWidth {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Saturating: a width never goes negative.
impl Sub for DisplayWidth {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for DisplayWidth {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl fmt::Display for DisplayWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Number of chars in `s`.
#[inline]
#[must_use]
pub fn rune_len(s: &str) -> RuneIndex {
    RuneIndex(s.chars().count())
}

/// Byte offset of the rune at `idx`, or `s.len()` when `idx` is past the end.
#[must_use]
pub fn byte_index(s: &str, idx: RuneIndex) -> ByteIndex {
    ByteIndex(s.char_indices().nth(idx.0).map_or(s.len(), |(b, _)| b))
}

/// Slice of `s` between two rune offsets, both clamped to the text.
#[must_use]
pub fn rune_slice(s: &str, start: RuneIndex, end: RuneIndex) -> &str {
    let from = byte_index(s, start).0;
    let to = byte_index(s, end.max(start)).0;
    &s[from..to]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
