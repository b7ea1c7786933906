// SPDX-License-Identifier: MIT
//
// Output buffering and the escape-sequence sink.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer: accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall. This eliminates per-escape
//   overhead and keeps the terminal's input parser happy.
//
//   Writer: the capability the prompt renderer draws through. Every method
//   appends to a buffer; nothing reaches the terminal until `flush()`. The
//   VT100 implementation wraps an `OutputBuffer` and any `io::Write` sink, so
//   tests render into a `Vec<u8>` and the real program renders into stdout.
//
// Appending to a Vec cannot fail, so the drawing methods are infallible and
// only `flush()` reports I/O errors.

use std::io::{self, Write};

use crate::ansi;
use crate::color::Color;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB, far more than a prompt frame needs.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails. The buffer is kept so a
    /// later flush can retry.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// A buffered escape-sequence sink.
///
/// Relative cursor moves take signed counts: a negative count moves the
/// opposite way and zero emits nothing.
pub trait Writer {
    /// Append raw bytes, escape sequences included.
    fn write_raw(&mut self, data: &[u8]);

    /// Append text for display. ESC bytes are replaced with `?` so user
    /// text can never inject a control sequence.
    fn write(&mut self, data: &[u8]);

    /// [`write`](Self::write) for a string.
    fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// [`write_raw`](Self::write_raw) for a string.
    fn write_raw_str(&mut self, s: &str) {
        self.write_raw(s.as_bytes());
    }

    fn erase_screen(&mut self);
    fn erase_up(&mut self);
    fn erase_down(&mut self);
    fn erase_start_of_line(&mut self);
    fn erase_end_of_line(&mut self);
    fn erase_line(&mut self);

    fn show_cursor(&mut self);
    fn hide_cursor(&mut self);
    fn cursor_goto(&mut self, row: u16, col: u16);
    fn cursor_up(&mut self, n: isize);
    fn cursor_down(&mut self, n: isize);
    fn cursor_forward(&mut self, n: isize);
    fn cursor_backward(&mut self, n: isize);
    fn ask_for_cpr(&mut self);
    fn save_cursor(&mut self);
    fn unsave_cursor(&mut self);

    fn scroll_down(&mut self);
    fn scroll_up(&mut self);

    fn set_title(&mut self, title: &str);
    fn clear_title(&mut self);

    /// Set foreground and background colors, optionally bold.
    fn set_color(&mut self, fg: Color, bg: Color, bold: bool);

    /// Send everything buffered so far to the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying sink fails.
    fn flush(&mut self) -> io::Result<()>;
}

// ─── Vt100Writer ─────────────────────────────────────────────────────────────

/// [`Writer`] for VT100-compatible terminals.
pub struct Vt100Writer<S: Write> {
    buf: OutputBuffer,
    sink: S,
}

impl Vt100Writer<io::Stdout> {
    /// A writer that flushes to the process's stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<S: Write> Vt100Writer<S> {
    /// Wrap `sink`; nothing is written to it until [`Writer::flush`].
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            buf: OutputBuffer::new(),
            sink,
        }
    }

    /// Bytes appended since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// The sink, holding everything flushed so far.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink (tests use it to clear captured output).
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the writer, returning the sink. Pending bytes are dropped.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: Write> Writer for Vt100Writer<S> {
    fn write_raw(&mut self, data: &[u8]) {
        self.buf.write_all(data).ok();
    }

    fn write(&mut self, data: &[u8]) {
        for &b in data {
            self.buf.write_all(&[if b == 0x1b { b'?' } else { b }]).ok();
        }
    }

    fn erase_screen(&mut self) {
        ansi::erase_screen(&mut self.buf).ok();
    }

    fn erase_up(&mut self) {
        ansi::erase_up(&mut self.buf).ok();
    }

    fn erase_down(&mut self) {
        ansi::erase_down(&mut self.buf).ok();
    }

    fn erase_start_of_line(&mut self) {
        ansi::erase_start_of_line(&mut self.buf).ok();
    }

    fn erase_end_of_line(&mut self) {
        ansi::erase_end_of_line(&mut self.buf).ok();
    }

    fn erase_line(&mut self) {
        ansi::erase_line(&mut self.buf).ok();
    }

    fn show_cursor(&mut self) {
        ansi::show_cursor(&mut self.buf).ok();
    }

    fn hide_cursor(&mut self) {
        ansi::hide_cursor(&mut self.buf).ok();
    }

    fn cursor_goto(&mut self, row: u16, col: u16) {
        ansi::cursor_goto(&mut self.buf, row, col).ok();
    }

    fn cursor_up(&mut self, n: isize) {
        ansi::cursor_up(&mut self.buf, n).ok();
    }

    fn cursor_down(&mut self, n: isize) {
        ansi::cursor_down(&mut self.buf, n).ok();
    }

    fn cursor_forward(&mut self, n: isize) {
        ansi::cursor_forward(&mut self.buf, n).ok();
    }

    fn cursor_backward(&mut self, n: isize) {
        ansi::cursor_backward(&mut self.buf, n).ok();
    }

    fn ask_for_cpr(&mut self) {
        ansi::ask_for_cpr(&mut self.buf).ok();
    }

    fn save_cursor(&mut self) {
        ansi::save_cursor(&mut self.buf).ok();
    }

    fn unsave_cursor(&mut self) {
        ansi::unsave_cursor(&mut self.buf).ok();
    }

    fn scroll_down(&mut self) {
        ansi::scroll_down(&mut self.buf).ok();
    }

    fn scroll_up(&mut self) {
        ansi::scroll_up(&mut self.buf).ok();
    }

    fn set_title(&mut self, title: &str) {
        ansi::set_title(&mut self.buf, title).ok();
    }

    fn clear_title(&mut self) {
        ansi::clear_title(&mut self.buf).ok();
    }

    fn set_color(&mut self, fg: Color, bg: Color, bold: bool) {
        ansi::set_color(&mut self.buf, fg, bg, bold).ok();
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf.flush_to(&mut self.sink)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
