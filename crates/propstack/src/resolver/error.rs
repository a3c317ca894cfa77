//! Error types for resolution and export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A contract violation while registering sources or resolving keys.
///
/// Expected runtime conditions such as a missing file or an unconfigured key
/// are reported as [`Signal`](crate::Signal)s instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A lookup was attempted before any source was registered.
    #[error("no sources registered, cannot resolve '{key}'")]
    NoSources { key: String },

    /// A priority index past the end of the source list.
    #[error("priority index {index} is out of range for {len} registered sources")]
    IndexOutOfRange { index: usize, len: usize },

    /// The key is cached with a value of another type.
    #[error("key '{key}' is cached as {cached}, requested as {requested}")]
    TypeMismatch {
        key: String,
        cached: &'static str,
        requested: &'static str,
    },
}

/// Errors that occur while writing a source back to its resource.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No source with that name is registered.
    #[error("source '{name}' is not registered")]
    UnknownSource { name: String },

    /// The source was loaded from a read-only origin.
    #[error("source '{name}' is not writable")]
    NotWritable { name: String },

    /// The backing file could not be written.
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
