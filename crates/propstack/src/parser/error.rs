//! Parse error types for source files and message patterns.

use thiserror::Error;

/// An error that occurred while parsing a key/value source file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid UTF-8 in input.
    #[error("invalid UTF-8 in input")]
    InvalidUtf8,
}

/// A malformed message pattern.
///
/// Patterns are authored by developers, so these errors indicate a bug in a
/// source file rather than a runtime data condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` with no matching `}`.
    #[error("unclosed placeholder at offset {offset} in pattern '{pattern}'")]
    Unclosed { pattern: String, offset: usize },

    /// Placeholder content that is not a non-negative decimal index.
    #[error("invalid parameter index '{index}' at offset {offset} in pattern '{pattern}'")]
    InvalidIndex {
        pattern: String,
        index: String,
        offset: usize,
    },
}
