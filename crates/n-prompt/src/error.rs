//! Errors returned by the prompt engine.

use std::io;

use n_term::color::UnknownColor;
use n_term::input::UnknownKey;
use thiserror::Error;

/// Anything that can stop a prompt from starting or running.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown key bind mode '{0}' (expected 'common' or 'emacs')")]
    UnknownKeyBindMode(String),

    #[error("unknown completion cycle '{0}' (expected 'clamp' or 'wrap')")]
    UnknownCompletionCycle(String),

    #[error(transparent)]
    UnknownColor(#[from] UnknownColor),

    #[error(transparent)]
    UnknownKey(#[from] UnknownKey),

    /// The input thread panicked while holding the reader.
    #[error("input reader lock poisoned")]
    ReaderPoisoned,
}

/// Result alias for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = PromptError::InvalidConfig("max_suggestions must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: max_suggestions must be at least 1"
        );
        assert_eq!(
            PromptError::UnknownKeyBindMode("vi".into()).to_string(),
            "unknown key bind mode 'vi' (expected 'common' or 'emacs')"
        );
    }

    #[test]
    fn color_error_is_transparent() {
        let err: PromptError = "mauve".parse::<n_term::Color>().unwrap_err().into();
        assert_eq!(err.to_string(), "unknown color 'mauve'");
    }

    #[test]
    fn io_converts() {
        let err: PromptError = io::Error::other("boom").into();
        assert!(matches!(err, PromptError::Io(_)));
    }
}
