use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A resolved value held by the cache, together with its canonical text.
///
/// The value is type-erased so one cache can hold values produced by
/// different readers. Reads are checked: [`downcast_ref`] returns `None`
/// instead of reinterpreting a value of another type.
///
/// [`downcast_ref`]: CachedValue::downcast_ref
#[derive(Clone)]
pub struct CachedValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    representation: String,
}

impl CachedValue {
    /// Wrap a value and the text it round-trips through.
    pub fn new<T: Any + Send + Sync>(value: T, representation: impl Into<String>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            representation: representation.into(),
        }
    }

    /// Borrow the value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Name of the stored value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Text that parses back to this value with the reader that produced it.
    pub fn representation(&self) -> &str {
        &self.representation
    }
}

impl fmt::Debug for CachedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedValue")
            .field("type_name", &self.type_name)
            .field("representation", &self.representation)
            .finish()
    }
}

/// The outcome of a completed resolution, as stored in the cache.
#[derive(Debug, Clone)]
pub enum ResolvedEntry {
    /// Found in a source and parsed.
    Value(CachedValue),
    /// Every source was searched and the key did not resolve.
    ConfirmedAbsent,
}

impl ResolvedEntry {
    /// Build a `Value` entry.
    pub fn value<T: Any + Send + Sync>(value: T, representation: impl Into<String>) -> Self {
        ResolvedEntry::Value(CachedValue::new(value, representation))
    }

    /// The cached value, unless the entry records an absence.
    pub fn as_value(&self) -> Option<&CachedValue> {
        match self {
            ResolvedEntry::Value(value) => Some(value),
            ResolvedEntry::ConfirmedAbsent => None,
        }
    }

    pub fn is_confirmed_absent(&self) -> bool {
        matches!(self, ResolvedEntry::ConfirmedAbsent)
    }
}

/// Cache state for one key.
///
/// Distinguishes a key that was never looked up from one that was looked up
/// and confirmed missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Resolved to a value.
    Found(T),
    /// Resolved, and no source provides a usable value.
    ConfirmedAbsent,
    /// Not looked up since the cache was last cleared.
    Unresolved,
}
