// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `Writer`'s job. This module
// just knows the byte-level encoding of every VT100 command a prompt needs.
//
// A prompt lives inline in the user's scrollback, so almost everything here
// is *relative*: cursor moves by a signed count, erases from the cursor, and
// scrolling that opens room below the current line. Absolute positioning
// (`cursor_goto`) is only used for the "window too small" fallback.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(row, col)` with CUP.
///
/// Coordinates are passed through as the terminal sees them (1-based). The
/// origin `(0, 0)` is emitted as the bare `ESC [ H` form.
pub fn cursor_goto(w: &mut impl Write, row: u16, col: u16) -> io::Result<()> {
    if row == 0 && col == 0 {
        return w.write_all(b"\x1b[H");
    }
    write!(w, "\x1b[{row};{col}H")
}

/// Move the cursor up `n` rows. Negative counts move down, zero is a no-op.
pub fn cursor_up(w: &mut impl Write, n: isize) -> io::Result<()> {
    relative(w, n, b'A', b'B')
}

/// Move the cursor down `n` rows. Negative counts move up, zero is a no-op.
pub fn cursor_down(w: &mut impl Write, n: isize) -> io::Result<()> {
    relative(w, n, b'B', b'A')
}

/// Move the cursor right `n` columns. Negative counts move left.
pub fn cursor_forward(w: &mut impl Write, n: isize) -> io::Result<()> {
    relative(w, n, b'C', b'D')
}

/// Move the cursor left `n` columns. Negative counts move right.
pub fn cursor_backward(w: &mut impl Write, n: isize) -> io::Result<()> {
    relative(w, n, b'D', b'C')
}

fn relative(w: &mut impl Write, n: isize, forward: u8, reverse: u8) -> io::Result<()> {
    match n {
        0 => Ok(()),
        n if n > 0 => write!(w, "\x1b[{n}{}", forward as char),
        n => write!(w, "\x1b[{}{}", n.unsigned_abs(), reverse as char),
    }
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn hide_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Stop blinking (`?12l`) and show the cursor (DECTCEM set).
#[inline]
pub fn show_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?12l\x1b[?25h")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ row ; col R`.
#[inline]
pub fn ask_for_cpr(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

/// Save the cursor position (SCOSC).
#[inline]
pub fn save_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[s")
}

/// Restore the cursor position saved by [`save_cursor`] (SCORC).
#[inline]
pub fn unsave_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[u")
}

// ─── Erase ───────────────────────────────────────────────────────────────────

/// Erase the entire screen (ED 2).
#[inline]
pub fn erase_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the top of the screen to the cursor (ED 1).
#[inline]
pub fn erase_up(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[1J")
}

/// Erase from the cursor to the bottom of the screen (ED 0).
#[inline]
pub fn erase_down(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[J")
}

/// Erase from the start of the line to the cursor (EL 1).
#[inline]
pub fn erase_start_of_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[1K")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn erase_end_of_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Erase the whole current line (EL 2).
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2K")
}

// ─── Scrolling ───────────────────────────────────────────────────────────────

/// Index (IND): move down one line, scrolling the screen up at the bottom.
#[inline]
pub fn scroll_down(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1bD")
}

/// Reverse index (RI): move up one line, scrolling down at the top.
#[inline]
pub fn scroll_up(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1bM")
}

// ─── Title ───────────────────────────────────────────────────────────────────

/// Set the window title (OSC 2).
///
/// XOFF (0x13) and BEL (0x07) are stripped from `title`: BEL terminates the
/// OSC string and XOFF would freeze output on terminals with flow control.
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(b"\x1b]2;")?;
    let cleaned: String = title.chars().filter(|&c| c != '\x13' && c != '\x07').collect();
    w.write_all(cleaned.as_bytes())?;
    w.write_all(b"\x07")
}

/// Reset the window title to empty.
#[inline]
pub fn clear_title(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b]2;\x07")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set foreground and background in one SGR sequence.
///
/// Without `bold` the sequence starts with `0;` so a previous bold is
/// cleared; with `bold` it ends with `;1`.
pub fn set_color(w: &mut impl Write, fg: Color, bg: Color, bold: bool) -> io::Result<()> {
    if bold {
        write!(w, "\x1b[{};{};1m", fg.fg_code(), bg.bg_code())
    } else {
        write!(w, "\x1b[0;{};{}m", fg.fg_code(), bg.bg_code())
    }
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn goto_origin_uses_short_form() {
        assert_eq!(emit(|w| cursor_goto(w, 0, 0)), "\x1b[H");
    }

    #[test]
    fn goto_position() {
        assert_eq!(emit(|w| cursor_goto(w, 3, 10)), "\x1b[3;10H");
    }

    #[test]
    fn relative_moves() {
        assert_eq!(emit(|w| cursor_up(w, 2)), "\x1b[2A");
        assert_eq!(emit(|w| cursor_down(w, 3)), "\x1b[3B");
        assert_eq!(emit(|w| cursor_forward(w, 4)), "\x1b[4C");
        assert_eq!(emit(|w| cursor_backward(w, 5)), "\x1b[5D");
    }

    #[test]
    fn zero_move_emits_nothing() {
        assert_eq!(emit(|w| cursor_up(w, 0)), "");
        assert_eq!(emit(|w| cursor_forward(w, 0)), "");
    }

    #[test]
    fn negative_move_flips_direction() {
        assert_eq!(emit(|w| cursor_up(w, -2)), "\x1b[2B");
        assert_eq!(emit(|w| cursor_down(w, -1)), "\x1b[1A");
        assert_eq!(emit(|w| cursor_forward(w, -7)), "\x1b[7D");
        assert_eq!(emit(|w| cursor_backward(w, -7)), "\x1b[7C");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| hide_cursor(w)), "\x1b[?25l");
        assert_eq!(emit(|w| show_cursor(w)), "\x1b[?12l\x1b[?25h");
    }

    #[test]
    fn cursor_report_and_save() {
        assert_eq!(emit(|w| ask_for_cpr(w)), "\x1b[6n");
        assert_eq!(emit(|w| save_cursor(w)), "\x1b[s");
        assert_eq!(emit(|w| unsave_cursor(w)), "\x1b[u");
    }

    // ── Erase ───────────────────────────────────────────────────────────

    #[test]
    fn erase_variants() {
        assert_eq!(emit(|w| erase_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| erase_up(w)), "\x1b[1J");
        assert_eq!(emit(|w| erase_down(w)), "\x1b[J");
        assert_eq!(emit(|w| erase_start_of_line(w)), "\x1b[1K");
        assert_eq!(emit(|w| erase_end_of_line(w)), "\x1b[K");
        assert_eq!(emit(|w| erase_line(w)), "\x1b[2K");
    }

    // ── Scrolling ───────────────────────────────────────────────────────

    #[test]
    fn scroll_sequences() {
        assert_eq!(emit(|w| scroll_down(w)), "\x1bD");
        assert_eq!(emit(|w| scroll_up(w)), "\x1bM");
    }

    // ── Title ───────────────────────────────────────────────────────────

    #[test]
    fn title_is_wrapped_in_osc() {
        assert_eq!(emit(|w| set_title(w, "n-repl")), "\x1b]2;n-repl\x07");
    }

    #[test]
    fn title_strips_terminators() {
        assert_eq!(emit(|w| set_title(w, "a\x07b\x13c")), "\x1b]2;abc\x07");
    }

    #[test]
    fn clear_title_sequence() {
        assert_eq!(emit(|w| clear_title(w)), "\x1b]2;\x07");
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn set_color_plain_resets_bold() {
        assert_eq!(
            emit(|w| set_color(w, Color::White, Color::Cyan, false)),
            "\x1b[0;97;46m"
        );
    }

    #[test]
    fn set_color_bold_appends_one() {
        assert_eq!(
            emit(|w| set_color(w, Color::Black, Color::Turquoise, true)),
            "\x1b[30;106;1m"
        );
    }

    #[test]
    fn set_color_defaults() {
        assert_eq!(
            emit(|w| set_color(w, Color::Default, Color::Default, false)),
            "\x1b[0;39;49m"
        );
    }

    // ── Composition ─────────────────────────────────────────────────────

    #[test]
    fn multiple_sequences_compose() {
        let mut buf = Vec::new();
        cursor_up(&mut buf, 1).unwrap();
        cursor_backward(&mut buf, 4).unwrap();
        erase_down(&mut buf).unwrap();
        set_color(&mut buf, Color::Blue, Color::Default, false).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "\x1b[1A\x1b[4D\x1b[J\x1b[0;94;49m");
    }
}
