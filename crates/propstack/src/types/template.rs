use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

use crate::parser::{Segment, TemplateError, parse_template};

/// Wrong number of arguments passed to [`MessageTemplate::format`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("pattern '{pattern}' expects {expected} parameters, got {got}")]
pub struct ParameterCountMismatch {
    pub pattern: String,
    pub expected: usize,
    pub got: usize,
}

/// A parsed message pattern with positional parameters.
///
/// The pattern `"{0}, {2}, {1}: do {0}"` awaits three arguments; each index
/// may be referenced any number of times. Templates are immutable once
/// parsed and are meant to be formatted many times.
///
/// # Example
///
/// ```
/// use propstack::MessageTemplate;
///
/// let template = MessageTemplate::parse("Hello {0}, you are {1} years old").unwrap();
/// assert_eq!(template.awaited_parameter_count(), 2);
/// assert_eq!(
///     template.format(&["Ann", "5"]).unwrap(),
///     "Hello Ann, you are 5 years old"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pattern: String,
    segments: Vec<Segment>,
    awaited: usize,
}

impl MessageTemplate {
    /// Parse a pattern.
    ///
    /// Returns an error for an unclosed `{` or a placeholder whose content is
    /// not a decimal index.
    pub fn parse(pattern: impl Into<String>) -> Result<Self, TemplateError> {
        let pattern = pattern.into();
        let segments = parse_template(&pattern)?;
        let awaited = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Parameter(index) => Some(index + 1),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0);
        Ok(Self {
            pattern,
            segments,
            awaited,
        })
    }

    /// The source pattern this template was parsed from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Segments in output order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// One more than the highest referenced index, or 0 without placeholders.
    pub fn awaited_parameter_count(&self) -> usize {
        self.awaited
    }

    /// Substitute `params` into the pattern.
    ///
    /// The number of arguments must match [`awaited_parameter_count`]
    /// exactly.
    ///
    /// [`awaited_parameter_count`]: MessageTemplate::awaited_parameter_count
    pub fn format<D: Display>(&self, params: &[D]) -> Result<String, ParameterCountMismatch> {
        if params.len() != self.awaited {
            return Err(ParameterCountMismatch {
                pattern: self.pattern.clone(),
                expected: self.awaited,
                got: params.len(),
            });
        }

        let mut out = String::with_capacity(self.pattern.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Parameter(index) => out.push_str(&params[*index].to_string()),
            }
        }
        Ok(out)
    }
}

impl FromStr for MessageTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
