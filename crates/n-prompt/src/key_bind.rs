//! Key bindings: which key runs which buffer edit.
//!
//! A binding is a [`Key`] (or a raw byte sequence, for input the decoder
//! does not know) paired with a plain function over the [`Buffer`]. The
//! engine runs, in order, the common bindings, the emacs bindings when that
//! mode is active, and the user's own. Every matching binding runs, so a
//! custom binding on `ControlA` adds to the emacs one rather than
//! replacing it.
//!
//! The edit functions are also exposed by name through [`action`] so a
//! config file can bind keys to them.

use std::fmt;
use std::str::FromStr;

use n_term::Key;

use crate::buffer::Buffer;
use crate::error::PromptError;
use crate::units::rune_len;

/// An edit triggered by a key.
pub type KeyBindFn = fn(&mut Buffer);

// ---------------------------------------------------------------------------
// Binding types
// ---------------------------------------------------------------------------

/// Run `func` when `key` is decoded.
#[derive(Debug, Clone, Copy)]
pub struct KeyBind {
    pub key: Key,
    pub func: KeyBindFn,
}

/// Run `func` when a chunk equal to `bytes` arrives and decodes to nothing.
#[derive(Debug, Clone)]
pub struct AsciiCodeBind {
    pub bytes: Vec<u8>,
    pub func: KeyBindFn,
}

/// Which built-in shortcut set is active on top of the common one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBindMode {
    /// Only the common bindings (arrows, Home/End, Delete, Backspace).
    Common,
    /// Common plus emacs-style control keys.
    #[default]
    Emacs,
}

impl fmt::Display for KeyBindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Common => "common",
            Self::Emacs => "emacs",
        })
    }
}

impl FromStr for KeyBindMode {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "emacs" => Ok(Self::Emacs),
            _ => Err(PromptError::UnknownKeyBindMode(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Edit functions
// ---------------------------------------------------------------------------

pub fn go_line_end(buf: &mut Buffer) {
    let n = rune_len(buf.document().text_after_cursor()).get();
    buf.cursor_right(n);
}

pub fn go_line_beginning(buf: &mut Buffer) {
    let n = rune_len(buf.document().text_before_cursor()).get();
    buf.cursor_left(n);
}

/// Delete the char under the cursor.
pub fn delete_char(buf: &mut Buffer) {
    buf.delete(1);
}

/// Delete the char before the cursor.
pub fn delete_before_char(buf: &mut Buffer) {
    buf.delete_before_cursor(1);
}

pub fn go_right_char(buf: &mut Buffer) {
    buf.cursor_right(1);
}

pub fn go_left_char(buf: &mut Buffer) {
    buf.cursor_left(1);
}

/// Delete from the cursor to the end of the line.
pub fn cut_line_after(buf: &mut Buffer) {
    let n = rune_len(buf.document().current_line_after_cursor()).get();
    buf.delete(n);
}

/// Delete from the start of the line to the cursor.
pub fn cut_line_before(buf: &mut Buffer) {
    let n = rune_len(buf.document().current_line_before_cursor()).get();
    buf.delete_before_cursor(n);
}

/// Delete the word before the cursor, with the spaces that follow it.
pub fn cut_word_before(buf: &mut Buffer) {
    let n = rune_len(buf.document().word_before_cursor_with_space()).get();
    buf.delete_before_cursor(n);
}

/// Ctrl+D deletes forward, unless the line is empty (then it means exit,
/// which the engine handles).
pub fn delete_char_unless_empty(buf: &mut Buffer) {
    if !buf.text().is_empty() {
        buf.delete(1);
    }
}

pub fn swap_characters(buf: &mut Buffer) {
    buf.swap_characters_before_cursor();
}

/// Join the next line onto this one with a space.
pub fn join_lines(buf: &mut Buffer) {
    buf.join_next_line(" ");
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const fn bind(key: Key, func: KeyBindFn) -> KeyBind {
    KeyBind { key, func }
}

/// Active in every mode.
pub static COMMON_KEY_BINDINGS: &[KeyBind] = &[
    bind(Key::End, go_line_end),
    bind(Key::Home, go_line_beginning),
    bind(Key::Delete, delete_char),
    bind(Key::Backspace, delete_before_char),
    bind(Key::Right, go_right_char),
    bind(Key::Left, go_left_char),
];

/// Active in [`KeyBindMode::Emacs`].
pub static EMACS_KEY_BINDINGS: &[KeyBind] = &[
    bind(Key::ControlE, go_line_end),
    bind(Key::ControlA, go_line_beginning),
    bind(Key::ControlK, cut_line_after),
    bind(Key::ControlU, cut_line_before),
    bind(Key::ControlD, delete_char_unless_empty),
    bind(Key::ControlH, delete_before_char),
    bind(Key::ControlF, go_right_char),
    bind(Key::ControlB, go_left_char),
    bind(Key::ControlW, cut_word_before),
    bind(Key::ControlT, swap_characters),
];

/// Edit functions by name, for binding keys from configuration.
static ACTIONS: &[(&str, KeyBindFn)] = &[
    ("go-line-end", go_line_end),
    ("go-line-beginning", go_line_beginning),
    ("delete-char", delete_char),
    ("delete-before-char", delete_before_char),
    ("go-right-char", go_right_char),
    ("go-left-char", go_left_char),
    ("cut-line-after", cut_line_after),
    ("cut-line-before", cut_line_before),
    ("cut-word-before", cut_word_before),
    ("swap-characters", swap_characters),
    ("join-lines", join_lines),
];

/// Look up an edit function by its kebab-case name.
#[must_use]
pub fn action(name: &str) -> Option<KeyBindFn> {
    ACTIONS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, f)| f)
}

/// Names accepted by [`action`].
pub fn action_names() -> impl Iterator<Item = &'static str> {
    ACTIONS.iter().map(|&(n, _)| n)
}

/// Run every binding in `table` whose key is `key`.
pub fn apply(table: &[KeyBind], key: Key, buf: &mut Buffer) {
    for kb in table.iter().filter(|kb| kb.key == key) {
        (kb.func)(buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
