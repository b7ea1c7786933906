//! Syntax highlighting interface.
//!
//! The renderer paints the input token by token when a [`Lexer`] is
//! configured. A lexer is streaming: [`init`](Lexer::init) hands it the
//! whole input, then [`next_token`](Lexer::next_token) yields tokens until
//! it returns `None`. The lexemes must cover the input in order; text not
//! covered by a token is not drawn.
//!
//! [`EagerLexer`] adapts a plain function that tokenizes everything at once.

use std::collections::VecDeque;
use std::fmt;

use n_term::Color;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A slice of the input and the color to paint it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub color: Color,
}

impl Token {
    #[must_use]
    pub fn new(lexeme: impl Into<String>, color: Color) -> Self {
        Self {
            lexeme: lexeme.into(),
            color,
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Splits input text into colored tokens.
pub trait Lexer {
    /// Reset and start lexing `input`.
    fn init(&mut self, input: &str);

    /// The next token, or `None` at the end of the input.
    fn next_token(&mut self) -> Option<Token>;
}

/// Tokenizes a whole input at once.
pub type LexFn = Box<dyn Fn(&str) -> Vec<Token>>;

/// Streams the tokens of an all-at-once [`LexFn`].
pub struct EagerLexer {
    lex: LexFn,
    tokens: VecDeque<Token>,
}

impl EagerLexer {
    #[must_use]
    pub fn new(lex: LexFn) -> Self {
        Self {
            lex,
            tokens: VecDeque::new(),
        }
    }
}

impl fmt::Debug for EagerLexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EagerLexer")
            .field("pending", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

impl Lexer for EagerLexer {
    fn init(&mut self, input: &str) {
        self.tokens = (self.lex)(input).into();
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}
