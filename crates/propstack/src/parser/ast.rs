//! AST types for parsed message patterns.

/// A segment of a parsed message pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted verbatim.
    Literal(String),
    /// A positional parameter placeholder: `{0}`, `{1}`, ...
    Parameter(usize),
}
