//! Rust syntax highlighting via tree-sitter.
//!
//! [`RustLexer`] is a [`Lexer`] for prompts that take Rust expressions. On
//! [`init`](Lexer::init) it parses the input with tree-sitter-rust, runs the
//! bundled highlight query, and splits the input into runs of chars that
//! share a color. The input is a single prompt, so every keystroke gets a
//! full reparse.
//!
//! Prompt input is usually statements or expressions, which are not valid
//! at the top level of a Rust file. The input is parsed inside a function
//! body and the wrapper's bytes are dropped from the result.
//!
//! Captures map to the 16-color palette so the prompt follows the user's
//! terminal theme. Later captures (more specific patterns) override earlier
//! ones for the same bytes.

use std::collections::VecDeque;

use n_term::Color;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

use crate::lexer::{Lexer, Token};

/// tree-sitter-rust's bundled highlight query.
const RUST_HIGHLIGHTS: &str = tree_sitter_rust::HIGHLIGHTS_QUERY;

/// Wrapper that makes statements parse as a block.
const BODY_OPEN: &str = "fn __prompt() {\n";
const BODY_CLOSE: &str = "\n}\n";

// ---------------------------------------------------------------------------
// RustLexer
// ---------------------------------------------------------------------------

/// Tree-sitter backed lexer for Rust source.
pub struct RustLexer {
    parser: Parser,
    query: Query,
    /// Color for each capture index. `Color::Default` = no highlighting.
    capture_colors: Vec<Color>,
    tokens: VecDeque<Token>,
}

impl RustLexer {
    /// Returns `None` if the grammar cannot be loaded or the query fails to
    /// compile (an ABI mismatch between tree-sitter and the grammar).
    #[must_use]
    pub fn new() -> Option<Self> {
        let language: tree_sitter::Language = tree_sitter_rust::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).ok()?;
        let query = Query::new(&language, RUST_HIGHLIGHTS).ok()?;
        let capture_colors = query
            .capture_names()
            .iter()
            .map(|name| capture_color(name))
            .collect();

        Some(Self {
            parser,
            query,
            capture_colors,
            tokens: VecDeque::new(),
        })
    }

    /// Foreground color of every byte of `input`.
    fn byte_colors(&mut self, input: &str) -> Vec<Color> {
        let source = format!("{BODY_OPEN}{input}{BODY_CLOSE}");
        let mut colors = vec![Color::Default; source.len()];
        let Some(tree) = self.parser.parse(&source, None) else {
            return vec![Color::Default; input.len()];
        };

        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(&self.query, tree.root_node(), source.as_bytes());
        while let Some((m, _)) = captures.next() {
            for capture in m.captures {
                let color = self.capture_colors[capture.index as usize];
                if color == Color::Default {
                    continue;
                }
                let node = capture.node;
                let end = node.end_byte().min(colors.len());
                for slot in &mut colors[node.start_byte().min(end)..end] {
                    *slot = color;
                }
            }
        }
        colors.drain(..BODY_OPEN.len());
        colors.truncate(input.len());
        colors
    }
}

impl Lexer for RustLexer {
    fn init(&mut self, input: &str) {
        let colors = self.byte_colors(input);
        self.tokens.clear();

        let mut run_start = 0;
        let mut run_color = Color::Default;
        for (i, _) in input.char_indices() {
            let color = colors[i];
            if i > run_start && color != run_color {
                self.tokens
                    .push_back(Token::new(&input[run_start..i], run_color));
                run_start = i;
            }
            run_color = color;
        }
        if run_start < input.len() {
            self.tokens
                .push_back(Token::new(&input[run_start..], run_color));
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}

// ---------------------------------------------------------------------------
// Capture-to-color mapping
// ---------------------------------------------------------------------------

/// Palette colors for highlight captures.
///
/// Only semantically important tokens get color; punctuation and variables
/// stay default to avoid visual noise.
#[allow(clippy::match_same_arms)] // Semantic categories may diverge later.
fn capture_color(name: &str) -> Color {
    match name {
        "keyword" => Color::Purple,

        "string" | "escape" => Color::DarkGreen,

        "comment" | "comment.documentation" => Color::DarkGray,

        "function" | "function.method" => Color::DarkBlue,

        "function.macro" | "constant" | "constant.builtin" => Color::Cyan,

        "type" | "type.builtin" | "constructor" => Color::Brown,

        "variable.builtin" => Color::DarkRed,

        "attribute" => Color::Brown,

        "label" => Color::Brown,

        "property" => Color::Cyan,

        _ => Color::Default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
