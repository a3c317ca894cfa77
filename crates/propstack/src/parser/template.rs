//! Positional message pattern parser using winnow.
//!
//! A pattern is literal text interleaved with `{N}` placeholders, where `N`
//! is a non-negative decimal index. There is no escape syntax: every `{`
//! opens a placeholder, while a `}` outside a placeholder is literal text.

use winnow::ascii::digit1;
use winnow::combinator::{preceded, terminated};
use winnow::prelude::*;
use winnow::token::take_till;

use super::ast::Segment;
use super::error::TemplateError;

/// Parse a message pattern into ordered segments.
///
/// Empty literal runs are omitted, so `"{0}{1}"` yields two parameter
/// segments and nothing else.
pub fn parse_template(pattern: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut remaining = pattern;
    let mut segments = Vec::new();

    push_literal(&mut segments, literal(&mut remaining));
    while !remaining.is_empty() {
        let offset = pattern.len() - remaining.len();
        let index_text = placeholder(&mut remaining).map_err(|_| TemplateError::Unclosed {
            pattern: pattern.to_string(),
            offset,
        })?;
        let index =
            parameter_index
                .parse(index_text)
                .map_err(|_| TemplateError::InvalidIndex {
                    pattern: pattern.to_string(),
                    index: index_text.to_string(),
                    offset,
                })?;
        segments.push(Segment::Parameter(index));
        push_literal(&mut segments, literal(&mut remaining));
    }

    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
}

/// Parse a decimal parameter index.
fn parameter_index(input: &mut &str) -> ModalResult<usize> {
    digit1.try_map(str::parse::<usize>).parse_next(input)
}

/// Consume literal text up to the next `{`.
fn literal<'i>(input: &mut &'i str) -> &'i str {
    let (text, rest) = input.split_at(input.find('{').unwrap_or(input.len()));
    *input = rest;
    text
}

/// Parse `{` content `}`, returning the raw content.
///
/// The content may not contain another `{`, so `"{0 {1}"` is unclosed.
fn placeholder<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded('{', terminated(take_till(0.., ['{', '}']), '}')).parse_next(input)
}
