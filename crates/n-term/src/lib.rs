// SPDX-License-Identifier: MIT
//
// n-term: Terminal plumbing for the n-prompt line editor.
//
// Everything that touches the terminal device or its byte protocol lives
// here, so the editor core can stay pure: ANSI escape generation, a
// buffered VT100 writer, raw mode and window size via termios, a
// non-blocking stdin reader with a background pump thread, resize and
// terminate signals, the 16-color palette, and the table that decodes raw
// input chunks into keys.
//
// This crate intentionally avoids external TUI frameworks (crossterm,
// termion) in favor of direct terminal control via ANSI escape sequences
// and raw termios. Every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod color;
pub mod input;
pub mod output;
pub mod reader;
pub mod signal;
pub mod terminal;

pub use color::Color;
pub use input::{Key, KeyDecoder};
pub use output::{Vt100Writer, Writer};
pub use reader::{InputPump, Reader, ScriptReader, TtyReader};
pub use terminal::Size;
