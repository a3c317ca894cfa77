use std::any::type_name;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

use super::{CanonicalReader, FormatError, Reader};
use crate::types::MessageTemplate;

/// Reads the raw text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringReader;

impl Reader for StringReader {
    type Value = String;

    fn parse(&self, raw: &str) -> Result<String, FormatError> {
        Ok(raw.to_string())
    }
}

impl CanonicalReader for StringReader {
    fn to_canonical(&self, value: &String) -> String {
        value.clone()
    }
}

/// Reads `true` or `false`, ignoring case and surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolReader;

impl Reader for BoolReader {
    type Value = bool;

    fn parse(&self, raw: &str) -> Result<bool, FormatError> {
        let text = raw.trim();
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(FormatError::new(format!("'{raw}' is not a boolean")))
        }
    }
}

impl CanonicalReader for BoolReader {
    fn to_canonical(&self, value: &bool) -> String {
        value.to_string()
    }
}

/// Reads exactly one character.
///
/// Surrounding whitespace is ignored, except that a raw value of one
/// whitespace character reads as that character.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharReader;

impl Reader for CharReader {
    type Value = char;

    fn parse(&self, raw: &str) -> Result<char, FormatError> {
        single_char(raw)
            .or_else(|| single_char(raw.trim()))
            .ok_or_else(|| FormatError::new(format!("'{raw}' is not a single character")))
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl CanonicalReader for CharReader {
    fn to_canonical(&self, value: &char) -> String {
        value.to_string()
    }
}

/// Reads any number type through its `FromStr`, ignoring surrounding
/// whitespace.
pub struct NumberReader<T>(PhantomData<fn() -> T>);

pub type IntReader = NumberReader<i32>;
pub type LongReader = NumberReader<i64>;
pub type FloatReader = NumberReader<f32>;
pub type DoubleReader = NumberReader<f64>;

impl<T> NumberReader<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NumberReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NumberReader<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NumberReader<T> {}

impl<T> fmt::Debug for NumberReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumberReader<{}>", type_name::<T>())
    }
}

impl<T> Reader for NumberReader<T>
where
    T: FromStr + Display + Clone + Send + Sync + 'static,
    T::Err: Display,
{
    type Value = T;

    fn parse(&self, raw: &str) -> Result<T, FormatError> {
        raw.trim()
            .parse()
            .map_err(|e| FormatError::new(format!("'{raw}' is not a valid number: {e}")))
    }
}

impl<T> CanonicalReader for NumberReader<T>
where
    T: FromStr + Display + Clone + Send + Sync + 'static,
    T::Err: Display,
{
    fn to_canonical(&self, value: &T) -> String {
        value.to_string()
    }
}

/// Reads a positional message pattern.
///
/// A malformed pattern is reported as a format error, so a resolver falls
/// back to the next source that defines the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageReader;

impl Reader for MessageReader {
    type Value = MessageTemplate;

    fn parse(&self, raw: &str) -> Result<MessageTemplate, FormatError> {
        Ok(MessageTemplate::parse(raw)?)
    }
}

impl CanonicalReader for MessageReader {
    fn to_canonical(&self, value: &MessageTemplate) -> String {
        value.pattern().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_reader_is_case_insensitive() {
        assert_eq!(BoolReader.parse(" TRUE "), Ok(true));
        assert_eq!(BoolReader.parse("False"), Ok(false));
        assert!(BoolReader.parse("yes").is_err());
    }

    #[test]
    fn char_reader_needs_one_char() {
        assert_eq!(CharReader.parse(" x "), Ok('x'));
        assert!(CharReader.parse("").is_err());
        assert!(CharReader.parse("xy").is_err());
        assert_eq!(CharReader.parse(" "), Ok(' '));
    }

    #[test]
    fn number_readers() {
        assert_eq!(IntReader::new().parse(" 42 "), Ok(42));
        assert_eq!(LongReader::new().parse("-9000000000"), Ok(-9_000_000_000));
        assert_eq!(DoubleReader::new().parse("2.5"), Ok(2.5));
        assert!(IntReader::new().parse("4.2").is_err());
        assert!(FloatReader::new().parse("abc").is_err());
    }

    #[test]
    fn canonical_forms_parse_back() {
        let reader = DoubleReader::new();
        for value in [0.1, -3.75, 1e300] {
            assert_eq!(reader.parse(&reader.to_canonical(&value)), Ok(value));
        }
        assert_eq!(BoolReader.parse(&BoolReader.to_canonical(&true)), Ok(true));
        assert_eq!(CharReader.parse(&CharReader.to_canonical(&'é')), Ok('é'));
    }

    #[test]
    fn message_reader_rejects_bad_pattern() {
        assert!(MessageReader.parse("Hello {0").is_err());
        let template = MessageReader.parse("Hello {0}").unwrap();
        assert_eq!(MessageReader.to_canonical(&template), "Hello {0}");
    }
}
