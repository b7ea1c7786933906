//! Everything an [`Engine`](crate::engine::Engine) can be told before it
//! starts.
//!
//! One [`Config`] value with named fields. Start from `Config::default()`
//! and override what you need with struct update syntax:
//!
//! ```
//! use n_prompt::config::Config;
//! use n_prompt::renderer::Prefix;
//!
//! let config = Config {
//!     prefix: Prefix::Static(">>> ".into()),
//!     max_suggestions: 10,
//!     ..Config::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
//!
//! The engine calls [`validate`](Config::validate) once when it is built.

use std::fmt;

use crate::completion::{Completer, CompletionCycle};
use crate::document::Document;
use crate::error::{PromptError, PromptResult};
use crate::key_bind::{AsciiCodeBind, KeyBind, KeyBindMode};
use crate::lexer::Lexer;
use crate::renderer::{BreakLineCallback, Colors, Prefix};

/// Default number of dropdown rows.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 6;

/// Default number of spaces per indentation level.
pub const DEFAULT_INDENT_SIZE: usize = 2;

/// Decides whether the prompt should end after a line. Gets the line and
/// whether it was just submitted (`false` for every keystroke).
pub type ExitChecker = Box<dyn Fn(&str, bool) -> bool>;

/// Decides whether Enter submits the input (`true`) or inserts a newline.
pub type ExecuteOnEnter = Box<dyn Fn(&Document) -> bool>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub struct Config {
    pub prefix: Prefix,
    /// Window title set on startup and cleared on exit.
    pub title: Option<String>,
    /// Text the first buffer starts with.
    pub initial_text: String,
    /// Chars that end the word a suggestion replaces.
    pub completion_word_separator: String,
    pub colors: Colors,
    pub max_suggestions: usize,
    /// History entries, oldest first.
    pub history: Vec<String>,
    pub key_bind_mode: KeyBindMode,
    pub key_bindings: Vec<KeyBind>,
    pub ascii_code_bindings: Vec<AsciiCodeBind>,
    pub completion_cycle: CompletionCycle,
    /// Down opens the dropdown even when nothing is selected.
    pub completion_on_down: bool,
    /// Ask the completer before the first key.
    pub show_completion_at_start: bool,
    /// Spaces per indentation level for multi-line input.
    pub indent_size: usize,
    pub break_line_callback: Option<BreakLineCallback>,
    pub exit_checker: Option<ExitChecker>,
    /// Without one, Enter always submits.
    pub execute_on_enter: Option<ExecuteOnEnter>,
    pub lexer: Option<Box<dyn Lexer>>,
    pub completer: Option<Completer>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: Prefix::default(),
            title: None,
            initial_text: String::new(),
            completion_word_separator: " ".to_owned(),
            colors: Colors::default(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            history: Vec::new(),
            key_bind_mode: KeyBindMode::default(),
            key_bindings: Vec::new(),
            ascii_code_bindings: Vec::new(),
            completion_cycle: CompletionCycle::default(),
            completion_on_down: false,
            show_completion_at_start: false,
            indent_size: DEFAULT_INDENT_SIZE,
            break_line_callback: None,
            exit_checker: None,
            execute_on_enter: None,
            lexer: None,
            completer: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("prefix", &self.prefix)
            .field("title", &self.title)
            .field("initial_text", &self.initial_text)
            .field("completion_word_separator", &self.completion_word_separator)
            .field("max_suggestions", &self.max_suggestions)
            .field("history", &self.history.len())
            .field("key_bind_mode", &self.key_bind_mode)
            .field("key_bindings", &self.key_bindings.len())
            .field("ascii_code_bindings", &self.ascii_code_bindings.len())
            .field("completion_cycle", &self.completion_cycle)
            .field("completion_on_down", &self.completion_on_down)
            .field("show_completion_at_start", &self.show_completion_at_start)
            .field("indent_size", &self.indent_size)
            .field("lexer", &self.lexer.is_some())
            .field("completer", &self.completer.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// [`PromptError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> PromptResult<()> {
        if self.max_suggestions == 0 {
            return Err(invalid("max_suggestions must be at least 1"));
        }
        if self.indent_size == 0 {
            return Err(invalid("indent_size must be at least 1"));
        }
        if self.completion_word_separator.contains('\n') {
            return Err(invalid("completion_word_separator cannot contain a newline"));
        }
        Ok(())
    }

    /// One level of indentation.
    #[must_use]
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_size)
    }
}

fn invalid(msg: &str) -> PromptError {
    PromptError::InvalidConfig(msg.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use n_term::Color;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert!(matches!(&c.prefix, Prefix::Static(p) if p == "> "));
        assert_eq!(c.max_suggestions, 6);
        assert_eq!(c.indent_size, 2);
        assert_eq!(c.completion_word_separator, " ");
        assert_eq!(c.key_bind_mode, KeyBindMode::Emacs);
        assert_eq!(c.completion_cycle, CompletionCycle::Clamp);
        assert_eq!(c.colors.prefix_text, Color::Blue);
        assert_eq!(c.colors.selected_suggestion_bg, Color::Turquoise);
        assert!(!c.completion_on_down);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_zero_suggestions() {
        let c = Config {
            max_suggestions: 0,
            ..Config::default()
        };
        assert_eq!(
            c.validate().unwrap_err().to_string(),
            "invalid configuration: max_suggestions must be at least 1"
        );
    }

    #[test]
    fn rejects_zero_indent() {
        let c = Config {
            indent_size: 0,
            ..Config::default()
        };
        assert!(matches!(c.validate(), Err(PromptError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_newline_separator() {
        let c = Config {
            completion_word_separator: " \n".into(),
            ..Config::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn indent_unit() {
        let c = Config {
            indent_size: 4,
            ..Config::default()
        };
        assert_eq!(c.indent(), "    ");
    }

    #[test]
    fn debug_hides_callbacks() {
        let c = Config {
            completer: Some(Box::new(|_| Vec::new())),
            ..Config::default()
        };
        let s = format!("{c:?}");
        assert!(s.contains("completer: true"));
        assert!(s.contains("max_suggestions: 6"));
    }
}
