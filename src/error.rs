//! Front‑end error types for the interpreter.
//!
//! The scanner and parser both collect their failures as lists of
//! [`LoxError`] values and keep going; neither ever aborts on the first
//! error. Runtime failures are a separate family with fail‑fast
//! propagation, defined in [`crate::interpreter`]; the two are
//! deliberately never merged.
//!
//! The module **does not** print diagnostics itself.

use log::info;
use thiserror::Error;

/// Error type shared by the scanner and parser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// The bare message, without the `[line N]` prefix.
    pub fn message(&self) -> &str {
        match self {
            LoxError::Lex { message, .. } | LoxError::Parse { message, .. } => message,
        }
    }

    /// 1‑based source line the error was reported at.
    pub fn line(&self) -> usize {
        match self {
            LoxError::Lex { line, .. } | LoxError::Parse { line, .. } => *line,
        }
    }
}

/// Crate‑wide `Result` alias for front‑end (scan/parse) failures.
pub type Result<T> = std::result::Result<T, LoxError>;
