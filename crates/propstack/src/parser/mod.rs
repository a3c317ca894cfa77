//! Parsers for source files and message patterns.
//!
//! Source files are flat `key=value` text. Message patterns are literal text
//! with positional `{N}` placeholders.

pub mod ast;
pub mod error;
mod file;
mod template;

pub use ast::Segment;
pub use error::{ParseError, TemplateError};
pub use file::{parse_bytes, parse_file, write_file};
pub use template::parse_template;
