//! Per-resolver store of completed resolutions.

use std::collections::BTreeMap;
use std::mem;

use crate::types::{CachedValue, ResolvedEntry};

/// A cache write observed by change listeners.
///
/// `old` and `new` are `None` when the key had no value before, or has none
/// after (never resolved, confirmed absent, or cleared).
#[derive(Debug, Clone)]
pub struct CacheChange {
    pub key: String,
    pub old: Option<CachedValue>,
    pub new: Option<CachedValue>,
}

/// Maps keys to [`ResolvedEntry`] values.
///
/// Mutations return the [`CacheChange`]s they cause instead of dispatching
/// them, so the owner can publish after releasing its lock.
#[derive(Debug, Default)]
pub(crate) struct Cache {
    entries: BTreeMap<String, ResolvedEntry>,
}

impl Cache {
    pub fn get(&self, key: &str) -> Option<&ResolvedEntry> {
        self.entries.get(key)
    }

    /// The resolved value for `key`, if it has one.
    pub fn value(&self, key: &str) -> Option<&CachedValue> {
        self.entries.get(key).and_then(ResolvedEntry::as_value)
    }

    /// Store `entry`, returning a change even when the value is unchanged.
    pub fn put(&mut self, key: &str, entry: ResolvedEntry) -> CacheChange {
        let new = entry.as_value().cloned();
        let old = self
            .entries
            .insert(key.to_string(), entry)
            .and_then(|previous| previous.as_value().cloned());
        CacheChange {
            key: key.to_string(),
            old,
            new,
        }
    }

    /// Remove every entry, returning one change per removed key in key order.
    pub fn clear(&mut self) -> Vec<CacheChange> {
        let entries = mem::take(&mut self.entries);
        entries
            .into_iter()
            .map(|(key, entry)| CacheChange {
                key,
                old: entry.as_value().cloned(),
                new: None,
            })
            .collect()
    }
}
