//! Key/value source file format.
//!
//! Line-oriented `key=value` text compatible with the classic properties
//! syntax:
//! - `#` and `!` start comment lines
//! - Keys end at the first unescaped `=`, `:` or whitespace
//! - A trailing backslash continues the entry on the next line
//! - Escapes: `\t` `\n` `\r` `\f` `\uXXXX`, anything else stands for itself

use std::collections::HashMap;
use std::str;

use winnow::combinator::{alt, cut_err, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_till, take_while};

use super::error::ParseError;

/// Parse raw bytes as a UTF-8 source file.
pub fn parse_bytes(input: &[u8]) -> Result<Vec<(String, String)>, ParseError> {
    let text = str::from_utf8(input).map_err(|_| ParseError::InvalidUtf8)?;
    parse_file(text)
}

/// Parse a source file into its entries, in first-seen order.
///
/// A key defined more than once keeps its first position and takes the last
/// value.
pub fn parse_file(input: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut remaining = input;
    let mut line = 0;

    while let Some(natural) = next_line(&mut remaining) {
        line += 1;
        let start_line = line;
        let trimmed = natural.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            let Some(next) = next_line(&mut remaining) else {
                break;
            };
            line += 1;
            logical.push_str(next.trim_start_matches(is_blank));
        }

        let (key, value) = entry.parse(logical.as_str()).map_err(|e| ParseError::Syntax {
            line: start_line,
            column: natural.len() - trimmed.len() + e.offset() + 1,
            message: "invalid escape sequence".to_string(),
        })?;

        match positions.get(&key) {
            Some(&index) => entries[index].1 = value,
            None => {
                positions.insert(key.clone(), entries.len());
                entries.push((key, value));
            }
        }
    }

    Ok(entries)
}

/// Serialize entries back into source file text, one entry per line.
///
/// The output parses back to the same entries.
pub fn write_file<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                for unit in c.encode_utf16(&mut [0; 2]) {
                    out.push_str(&format!("\\u{unit:04X}"));
                }
            }
            c => out.push(c),
        }
    }
}

/// Split off the next natural line, accepting `\n`, `\r\n` and `\r`.
fn next_line<'i>(input: &mut &'i str) -> Option<&'i str> {
    if input.is_empty() {
        return None;
    }
    let line: ModalResult<&str> = take_till(0.., ['\r', '\n']).parse_next(input);
    let line = line.ok()?;
    let _: ModalResult<Option<&str>> = opt(alt(("\r\n", "\r", "\n"))).parse_next(input);
    Some(line)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// A line continues when it ends with an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Parse one logical line: key, separator, value.
fn entry(input: &mut &str) -> ModalResult<(String, String)> {
    let key: String = repeat(0.., key_char).parse_next(input)?;
    take_while(0.., is_blank).void().parse_next(input)?;
    opt(one_of(['=', ':'])).void().parse_next(input)?;
    take_while(0.., is_blank).void().parse_next(input)?;
    let value: String = repeat(0.., value_char).parse_next(input)?;
    Ok((key, value))
}

fn key_char(input: &mut &str) -> ModalResult<char> {
    alt((escape, none_of([' ', '\t', '\x0c', '=', ':']))).parse_next(input)
}

fn value_char(input: &mut &str) -> ModalResult<char> {
    alt((escape, any)).parse_next(input)
}

/// Parse a backslash escape.
fn escape(input: &mut &str) -> ModalResult<char> {
    preceded(
        '\\',
        alt((
            preceded('u', cut_err(unicode_scalar)),
            't'.value('\t'),
            'n'.value('\n'),
            'r'.value('\r'),
            'f'.value('\x0c'),
            any,
        )),
    )
    .parse_next(input)
}

/// Parse the hex digits of a `\u` escape, joining surrogate pairs.
fn unicode_scalar(input: &mut &str) -> ModalResult<char> {
    let high = hex_unit(input)?;
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(high).ok_or_else(|| ErrMode::Cut(ContextError::new()));
    }
    let low = preceded("\\u", hex_unit).parse_next(input)?;
    if !(0xDC00..0xE000).contains(&low) {
        return Err(ErrMode::Cut(ContextError::new()));
    }
    let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(scalar).ok_or_else(|| ErrMode::Cut(ContextError::new()))
}

fn hex_unit(input: &mut &str) -> ModalResult<u32> {
    take_while(4, |c: char| c.is_ascii_hexdigit())
        .try_map(|digits| u32::from_str_radix(digits, 16))
        .parse_next(input)
}
