//! Readers turn raw source text into typed values.
//!
//! A reader is a pure parse function. Readers that also implement
//! [`CanonicalReader`] can format a value back into text that parses to the
//! same value, which is what makes a source exportable.

mod standard;

use thiserror::Error;

use crate::parser::TemplateError;

pub use standard::{
    BoolReader, CharReader, DoubleReader, FloatReader, IntReader, LongReader, MessageReader,
    NumberReader, StringReader,
};

/// A raw value that a reader rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FormatError {
    message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TemplateError> for FormatError {
    fn from(err: TemplateError) -> Self {
        Self::new(err.to_string())
    }
}

/// Parses raw source text into a typed value.
///
/// # Example
///
/// ```
/// use propstack::{FormatError, Reader};
///
/// struct Percent;
///
/// impl Reader for Percent {
///     type Value = u8;
///
///     fn parse(&self, raw: &str) -> Result<u8, FormatError> {
///         raw.trim()
///             .strip_suffix('%')
///             .and_then(|n| n.parse().ok())
///             .filter(|n| *n <= 100)
///             .ok_or_else(|| FormatError::new(format!("'{raw}' is not a percentage")))
///     }
/// }
///
/// assert_eq!(Percent.parse("40%"), Ok(40));
/// assert!(Percent.parse("140%").is_err());
/// ```
pub trait Reader {
    /// The type produced by this reader.
    type Value: Clone + Send + Sync + 'static;

    /// Parse `raw`, or explain why it is not a valid value.
    fn parse(&self, raw: &str) -> Result<Self::Value, FormatError>;
}

/// A reader that can also write values back as text.
///
/// Implementations must satisfy `parse(&to_canonical(v)) == Ok(v)` for every
/// valid `v`.
pub trait CanonicalReader: Reader {
    fn to_canonical(&self, value: &Self::Value) -> String;
}
