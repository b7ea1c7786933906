//! Frame painting with relative cursor movement.
//!
//! The prompt lives wherever the shell left the cursor, so the renderer
//! never uses absolute positions. It remembers one thing between frames:
//! where it left the cursor, measured from the frame origin (column 0 of
//! the prompt's first row). Every frame starts by walking back to the
//! origin with relative up/backward moves and erasing everything below.
//!
//! A frame is:
//!
//! 1. the prefix, then the input text (plain or token by token through a
//!    [`Lexer`]), wrapped explicitly with a newline and a continuation
//!    prefix whenever a row of the text area fills up;
//! 2. a move to the buffer's display cursor;
//! 3. the completion dropdown below the cursor row, if there are
//!    suggestions;
//! 4. when a suggestion is selected, a preview that paints it over the word
//!    before the cursor, repaints the rest of the input, and parks the
//!    cursor after the suggestion.
//!
//! If the terminal is too small for the text plus the dropdown, the screen
//! is cleared and a fallback message is shown instead.

use std::borrow::Cow;
use std::fmt;
use std::io;

use n_term::{Color, Size, Writer};

use crate::completion::{CompletionManager, Scrollbar, format_suggestions};
use crate::document::Document;
use crate::lexer::Lexer;
use crate::position::{Position, position_at_end_of_str};
use crate::units::DisplayWidth;

/// Narrowest terminal that can show a dropdown: the two-column margins of
/// a formatted suggestion row.
pub const COMPLETION_MARGIN: usize = 4;

/// Shown instead of the prompt when it cannot fit.
pub const WINDOW_TOO_SMALL: &str = "Your console window is too small...";

/// Replaces the visible glyphs of the prefix on continuation rows.
const CONTINUATION_CHAR: char = '.';

/// Called with the submitted document after the line is broken.
pub type BreakLineCallback = Box<dyn FnMut(&Document)>;

// ---------------------------------------------------------------------------
// Prefix
// ---------------------------------------------------------------------------

/// Where the prompt prefix comes from.
pub enum Prefix {
    Static(String),
    /// Asked again on every frame.
    Live(Box<dyn Fn() -> String>),
}

impl Prefix {
    /// The prefix to draw now.
    #[must_use]
    pub fn current(&self) -> Cow<'_, str> {
        match self {
            Self::Static(s) => Cow::Borrowed(s),
            Self::Live(f) => Cow::Owned(f()),
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self::Static("> ".to_owned())
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => f.debug_tuple("Static").field(s).finish(),
            Self::Live(_) => f.write_str("Live(..)"),
        }
    }
}

/// The prefix for continuation rows: every column up to and including the
/// last non-space glyph becomes `.`, trailing spaces stay.
///
/// `">>> "` gives `"... "`, `"あ> "` gives `"... "`.
#[must_use]
pub fn continuation_prefix(prefix: &str) -> String {
    let body = prefix.trim_end_matches(' ');
    let dots = DisplayWidth::of_str(body).get();
    let spaces = prefix.len() - body.len();
    let mut out = String::with_capacity(dots + spaces);
    out.extend(std::iter::repeat_n(CONTINUATION_CHAR, dots));
    out.extend(std::iter::repeat_n(' ', spaces));
    out
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Foreground/background pair for every part of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub prefix_text: Color,
    pub prefix_bg: Color,
    pub input_text: Color,
    pub input_bg: Color,
    pub preview_text: Color,
    pub preview_bg: Color,
    pub suggestion_text: Color,
    pub suggestion_bg: Color,
    pub selected_suggestion_text: Color,
    pub selected_suggestion_bg: Color,
    pub description_text: Color,
    pub description_bg: Color,
    pub selected_description_text: Color,
    pub selected_description_bg: Color,
    pub scrollbar_thumb: Color,
    pub scrollbar_track: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            prefix_text: Color::Blue,
            prefix_bg: Color::Default,
            input_text: Color::Default,
            input_bg: Color::Default,
            preview_text: Color::Green,
            preview_bg: Color::Default,
            suggestion_text: Color::White,
            suggestion_bg: Color::Cyan,
            selected_suggestion_text: Color::Black,
            selected_suggestion_bg: Color::Turquoise,
            description_text: Color::Black,
            description_bg: Color::Turquoise,
            selected_description_text: Color::White,
            selected_description_bg: Color::Cyan,
            scrollbar_thumb: Color::DarkGray,
            scrollbar_track: Color::Cyan,
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Per-frame prefix geometry.
struct Layout {
    prefix: String,
    continuation: String,
    prefix_width: DisplayWidth,
    /// Width of the text area right of the prefix. Zero disables wrapping.
    columns: DisplayWidth,
}

/// Paints prompt frames into a [`Writer`].
pub struct Renderer<W: Writer> {
    out: W,
    prefix: Prefix,
    title: Option<String>,
    colors: Colors,
    break_line_callback: Option<BreakLineCallback>,
    size: Size,
    /// Where the last frame left the cursor, relative to the frame origin.
    previous_cursor: Position,
}

impl<W: Writer> fmt::Debug for Renderer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("prefix", &self.prefix)
            .field("title", &self.title)
            .field("size", &self.size)
            .field("previous_cursor", &self.previous_cursor)
            .finish_non_exhaustive()
    }
}

impl<W: Writer> Renderer<W> {
    /// A renderer with no window size yet; [`render`](Self::render) draws
    /// nothing until [`update_window_size`](Self::update_window_size).
    #[must_use]
    pub fn new(out: W, prefix: Prefix, colors: Colors) -> Self {
        Self {
            out,
            prefix,
            title: None,
            colors,
            break_line_callback: None,
            size: Size { cols: 0, rows: 0 },
            previous_cursor: Position::ORIGIN,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_break_line_callback(mut self, callback: Option<BreakLineCallback>) -> Self {
        self.break_line_callback = callback;
        self
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Write the window title, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the writer fails.
    pub fn setup(&mut self) -> io::Result<()> {
        if let Some(title) = &self.title {
            self.out.set_title(title);
            self.out.flush()?;
        }
        Ok(())
    }

    /// Clear the title and everything below the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the writer fails.
    pub fn close(&mut self) -> io::Result<()> {
        self.out.clear_title();
        self.out.erase_down();
        self.out.flush()
    }

    pub fn update_window_size(&mut self, size: Size) {
        tracing::debug!(target: "render", cols = size.cols, rows = size.rows, "window size");
        self.size = size;
    }

    #[must_use]
    pub const fn window_size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub const fn previous_cursor(&self) -> Position {
        self.previous_cursor
    }

    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.out
    }

    pub const fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    // -- Frames -------------------------------------------------------------

    /// Repaint the prompt for `doc` with the dropdown of `completion`.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the writer fails.
    pub fn render(
        &mut self,
        doc: &Document,
        completion: &CompletionManager,
        lexer: Option<&mut (dyn Lexer + 'static)>,
    ) -> io::Result<()> {
        // A pty without a size yet reports 0x0.
        if self.size.cols == 0 {
            return Ok(());
        }
        let layout = self.layout();
        self.clear(self.previous_cursor);

        let end = position_at_end_of_str(doc.text(), layout.columns);
        if end.y + 1 + completion.max_visible() > usize::from(self.size.rows)
            || usize::from(self.size.cols) < COMPLETION_MARGIN
            || layout.columns == DisplayWidth::ZERO
        {
            return self.render_window_too_small();
        }

        self.out.hide_cursor();

        let pen = self.render_text(doc.text(), lexer, &layout);
        self.out.set_color(Color::Default, Color::Default, false);

        let mut cursor = shift(pen, layout.prefix_width);
        let target = shift(doc.display_cursor_position(layout.columns), layout.prefix_width);
        cursor = self.move_cursor(cursor, target);

        self.render_completion(completion, &layout, cursor);

        if let Some(suggestion) = completion.selected_suggestion() {
            // The word may start on an earlier row than the cursor.
            let word = doc.word_before_cursor_until_separator(completion.word_separator());
            let before = doc.text_before_cursor();
            let head = before.strip_suffix(word).unwrap_or(before);
            let mut pen = position_at_end_of_str(head, layout.columns);
            cursor = self.move_cursor(cursor, shift(pen, layout.prefix_width));

            let (fg, bg) = (self.colors.preview_text, self.colors.preview_bg);
            self.paint(&suggestion.text, fg, bg, &mut pen, &layout);
            let end_of_suggestion = pen;

            let (fg, bg) = (self.colors.input_text, self.colors.input_bg);
            self.paint(doc.text_after_cursor(), fg, bg, &mut pen, &layout);
            self.out.set_color(Color::Default, Color::Default, false);
            // The replaced word may have been longer than the suggestion.
            self.out.erase_end_of_line();

            cursor = self.move_cursor(
                shift(pen, layout.prefix_width),
                shift(end_of_suggestion, layout.prefix_width),
            );
        }

        self.previous_cursor = cursor;
        self.out.show_cursor();
        tracing::trace!(target: "render", x = cursor.x.get(), y = cursor.y, "frame");
        self.out.flush()
    }

    /// Repaint the final text, move to a fresh line, and run the
    /// break-line callback. The next frame starts at the new line.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the writer fails.
    pub fn break_line(
        &mut self,
        doc: &Document,
        lexer: Option<&mut (dyn Lexer + 'static)>,
    ) -> io::Result<()> {
        let layout = self.layout();
        self.clear(self.previous_cursor);

        self.render_text(doc.text(), lexer, &layout);
        self.out.set_color(Color::Default, Color::Default, false);
        self.out.write_raw_str("\r\n");
        self.out.flush()?;

        if let Some(callback) = &mut self.break_line_callback {
            callback(doc);
        }
        self.previous_cursor = Position::ORIGIN;
        Ok(())
    }

    // -- Pieces -------------------------------------------------------------

    fn layout(&self) -> Layout {
        let prefix = self.prefix.current().into_owned();
        let prefix_width = DisplayWidth::of_str(&prefix);
        Layout {
            continuation: continuation_prefix(&prefix),
            columns: DisplayWidth(usize::from(self.size.cols)) - prefix_width,
            prefix,
            prefix_width,
        }
    }

    fn render_window_too_small(&mut self) -> io::Result<()> {
        tracing::debug!(target: "render", cols = self.size.cols, rows = self.size.rows, "window too small");
        self.out.cursor_goto(0, 0);
        self.out.erase_screen();
        self.out.set_color(Color::DarkRed, Color::White, false);
        self.out.write_str(WINDOW_TOO_SMALL);
        self.out.set_color(Color::Default, Color::Default, false);
        self.previous_cursor = Position::new(DisplayWidth::of_str(WINDOW_TOO_SMALL).get(), 0);
        self.out.flush()
    }

    fn render_prefix(&mut self, prefix: &str) {
        self.out
            .set_color(self.colors.prefix_text, self.colors.prefix_bg, false);
        self.out.write_raw_str("\r");
        self.out.write_str(prefix);
        self.out.set_color(Color::Default, Color::Default, false);
    }

    /// Prefix plus `text`. Returns where the text ended, in text-area
    /// coordinates.
    fn render_text(
        &mut self,
        text: &str,
        lexer: Option<&mut (dyn Lexer + 'static)>,
        layout: &Layout,
    ) -> Position {
        self.render_prefix(&layout.prefix);
        let mut pen = Position::ORIGIN;
        let bg = self.colors.input_bg;
        match lexer {
            None => self.paint(text, self.colors.input_text, bg, &mut pen, layout),
            Some(lexer) => {
                lexer.init(text);
                while let Some(token) = lexer.next_token() {
                    self.paint(&token.lexeme, token.color, bg, &mut pen, layout);
                }
            }
        }
        pen
    }

    /// Write `text` from `pen`, breaking the row before a glyph that does
    /// not fit and right after one that fills it. `pen` is advanced the
    /// same way [`position_at_end_of_str`] measures.
    fn paint(&mut self, text: &str, fg: Color, bg: Color, pen: &mut Position, layout: &Layout) {
        let wraps = layout.columns > DisplayWidth::ZERO;
        let mut run = String::new();
        self.out.set_color(fg, bg, false);

        for c in text.chars() {
            if c == '\r' {
                continue;
            }
            if c == '\n' {
                self.out.write_str(&run);
                run.clear();
                self.new_row(pen, layout, fg, bg);
                continue;
            }
            let w = DisplayWidth::of_char(c);
            if wraps && pen.x + w > layout.columns {
                self.out.write_str(&run);
                run.clear();
                self.new_row(pen, layout, fg, bg);
            }
            run.push(c);
            pen.x += w;
            if wraps && pen.x == layout.columns {
                self.out.write_str(&run);
                run.clear();
                self.new_row(pen, layout, fg, bg);
            }
        }
        self.out.write_str(&run);
    }

    fn new_row(&mut self, pen: &mut Position, layout: &Layout, fg: Color, bg: Color) {
        self.out.write_raw_str("\n");
        self.render_prefix(&layout.continuation);
        self.out.set_color(fg, bg, false);
        pen.x = DisplayWidth::ZERO;
        pen.y += 1;
    }

    /// Draw the dropdown under the row of `cursor` and come back to it.
    fn render_completion(&mut self, completion: &CompletionManager, layout: &Layout, cursor: Position) {
        let suggestions = completion.suggestions();
        if suggestions.is_empty() {
            return;
        }
        let cols = usize::from(self.size.cols);
        // One column is the scrollbar.
        let max = cols.saturating_sub(layout.prefix_width.get() + 1);
        let (formatted, width) = format_suggestions(suggestions, max);
        if width == 0 {
            return;
        }
        let width = width + 1;

        let scroll = completion.vertical_scroll().min(formatted.len());
        let end = (scroll + completion.max_visible()).min(formatted.len());
        let rows = &formatted[scroll..end];
        let window_height = rows.len();
        let scrollbar = Scrollbar::compute(window_height, suggestions.len(), scroll);
        let selected_row = completion
            .selected_index()
            .and_then(|i| i.checked_sub(scroll));

        self.prepare_area(window_height);

        let overflow = (cursor.x.get() + width).saturating_sub(cols);
        let x = cursor.x.get() - overflow.min(cursor.x.get());
        self.out.cursor_backward(signed(overflow));

        let c = self.colors;
        for (i, row) in rows.iter().enumerate() {
            self.out.cursor_down(1);
            self.out.write_raw_str("\r");
            self.out.cursor_forward(signed(x));

            let selected = selected_row == Some(i);
            if selected {
                self.out
                    .set_color(c.selected_suggestion_text, c.selected_suggestion_bg, true);
            } else {
                self.out.set_color(c.suggestion_text, c.suggestion_bg, false);
            }
            self.out.write_str(&row.text);

            if selected {
                self.out
                    .set_color(c.selected_description_text, c.selected_description_bg, false);
            } else {
                self.out.set_color(c.description_text, c.description_bg, false);
            }
            self.out.write_str(&row.description);

            let bar = if scrollbar.contains(i) {
                c.scrollbar_thumb
            } else {
                c.scrollbar_track
            };
            self.out.set_color(Color::Default, bar, false);
            self.out.write_str(" ");
            self.out.set_color(Color::Default, Color::Default, false);
            self.out.cursor_backward(signed(width));
        }

        self.out.cursor_forward(signed(overflow));
        self.out.cursor_up(signed(window_height));
        self.out.set_color(Color::Default, Color::Default, false);
    }

    /// Make room for `lines` rows below the cursor, scrolling the screen if
    /// the prompt sits at the bottom.
    fn prepare_area(&mut self, lines: usize) {
        for _ in 0..lines {
            self.out.scroll_down();
        }
        for _ in 0..lines {
            self.out.scroll_up();
        }
    }

    /// Walk back to the frame origin and erase everything after it.
    fn clear(&mut self, cursor: Position) {
        self.move_cursor(cursor, Position::ORIGIN);
        self.out.erase_down();
    }

    /// Relative move between two frame positions. Returns `to`.
    fn move_cursor(&mut self, from: Position, to: Position) -> Position {
        self.out.cursor_up(signed(from.y) - signed(to.y));
        self.out.cursor_backward(from.x.signed() - to.x.signed());
        to
    }
}

/// Text-area position to frame position.
fn shift(pos: Position, prefix_width: DisplayWidth) -> Position {
    Position {
        x: pos.x + prefix_width,
        y: pos.y,
    }
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
