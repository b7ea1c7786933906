//! # n-prompt: Line-editing engine for n-repl
//!
//! An interactive prompt: the user edits a line (or several),
//! a dropdown of suggestions follows the cursor, and submitted lines go to
//! an executor.
//!
//! - **[`units`]**: `RuneIndex`, `ByteIndex`, `DisplayWidth` newtypes
//! - **[`position`]**: display positions and wrapped-text layout
//! - **[`document`]**: immutable text + cursor snapshot with word and line queries
//! - **[`buffer`]**: the editable text, cursor motions and edits
//! - **[`completion`]**: suggestions, selection, scrolling, dropdown formatting
//! - **[`filter`]**: prefix, suffix, substring and fuzzy matching
//! - **[`history`]**: submitted lines with editable navigation
//! - **[`key_bind`]**: edit functions and the common/emacs binding tables
//! - **[`lexer`]** / **[`highlight`]**: syntax coloring, including Rust via tree-sitter
//! - **[`renderer`]**: paints frames through an n-term `Writer`
//! - **[`config`]**: every option an engine takes
//! - **[`engine`]**: the loop that ties it all together
//!
//! Terminal I/O lives in n-term; nothing here touches a file descriptor.

pub mod buffer;
pub mod completion;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod history;
pub mod key_bind;
pub mod lexer;
pub mod position;
pub mod renderer;
pub mod units;

pub use buffer::Buffer;
pub use completion::{Completer, CompletionCycle, CompletionManager, Suggestion};
pub use config::Config;
pub use document::Document;
pub use engine::{Engine, Feed};
pub use error::{PromptError, PromptResult};
pub use history::HistoryLog;
pub use key_bind::{AsciiCodeBind, KeyBind, KeyBindMode};
pub use lexer::{EagerLexer, Lexer, Token};
pub use renderer::{Colors, Prefix, Renderer};
