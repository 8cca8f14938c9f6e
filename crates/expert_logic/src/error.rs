//! Error types for the expert system front end.
//!
//! Lexing, parsing and validation failures are fatal: a program that fails any
//! of them is never executed. Contradictions found while solving are *not*
//! errors; they are collected on the `ExecContext` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized `Result` type for expert system operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl Location {
    /// Creates a new `Location`.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

fn located(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" ({})", loc),
        None => String::new(),
    }
}

/// Defines the errors that can occur while turning rule text into a `Program`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The source contains a character sequence the lexer cannot scan.
    #[error("lex error: {message} ({location})")]
    Lex { message: String, location: Location },

    /// The token stream does not follow the program grammar.
    #[error("syntax error: {message}{}", located(.location))]
    Syntax {
        message: String,
        location: Option<Location>,
    },

    /// A symbol or operator token failed validation.
    #[error("validation error: {message}{}", located(.location))]
    Validation {
        message: String,
        location: Option<Location>,
    },

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn lex(message: impl Into<String>, location: Location) -> Self {
        Error::Lex {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Syntax {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn validation(message: impl Into<String>, location: Option<Location>) -> Self {
        Error::Validation {
            message: message.into(),
            location,
        }
    }

    /// Returns the source location attached to this error, if any.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Lex { location, .. } => Some(*location),
            Error::Syntax { location, .. } | Error::Validation { location, .. } => *location,
            Error::Serialization(_) => None,
        }
    }

    /// Returns `true` for lexer failures.
    pub fn is_lex(&self) -> bool {
        matches!(self, Error::Lex { .. })
    }

    /// Returns `true` for grammar failures.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// Returns `true` for symbol/operator validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
