//! Priority-ordered, cached resolution of keys across sources.

mod cache;
mod error;
mod signal;
mod source;

use std::any::{Any, type_name};
use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use bon::Builder;
use parking_lot::Mutex;
use strsim::levenshtein;
use tracing::{debug, trace, warn};

use crate::parser::write_file;
use crate::reader::{
    BoolReader, CanonicalReader, CharReader, DoubleReader, FloatReader, IntReader, LongReader,
    MessageReader, Reader, StringReader,
};
use crate::types::{CachedValue, Lookup, MessageTemplate, ResolvedEntry};

pub use cache::CacheChange;
pub use error::{ExportError, ResolveError};
pub use signal::{Listeners, Signal, SubscriptionId};
pub use source::{Bundled, LocatorChain, Origin, Resource, ResourceLocator, SearchPath, Source};

use cache::Cache;

/// Where a newly registered source is placed in the priority order.
///
/// Position 0 is the lowest priority. A source at a higher position overrides
/// every source below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Above every source registered so far.
    #[default]
    Highest,
    /// At this position, shifting the sources at and above it up by one.
    At(usize),
}

/// The outcome of [`Resolver::add_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Loaded and registered.
    Added,
    /// A source with this name was already registered; nothing changed.
    AlreadyRegistered,
    /// No resource has this name. A [`Signal::MissingSource`] was published.
    Missing,
    /// The resource could not be read or parsed. A
    /// [`Signal::SourceReadError`] was published.
    Unreadable,
}

impl SourceStatus {
    /// Whether a source with the name is registered after the call.
    pub fn is_registered(self) -> bool {
        matches!(self, SourceStatus::Added | SourceStatus::AlreadyRegistered)
    }
}

#[derive(Debug, Default)]
struct State {
    /// Lowest priority first.
    sources: Vec<Source>,
    cache: Cache,
}

/// Something to deliver to listeners once the state lock is released.
enum Event {
    Signal(Signal),
    Change(CacheChange),
}

/// Resolves typed values from an ordered stack of [`Source`]s.
///
/// Lookups scan sources from highest to lowest priority. The first source
/// whose raw text the reader accepts wins; rejected text is reported and the
/// scan continues. Every completed lookup is cached, including the outcome
/// that no source provides the key, until the source list changes.
///
/// All state lives behind one lock. Listeners run after the lock is released
/// and may call back into the resolver. Readers run while it is held and must
/// not.
///
/// # Example
///
/// ```
/// use propstack::{Bundled, Priority, Resolver};
///
/// let resolver = Resolver::new(
///     Bundled::new()
///         .with("defaults.prop", "volume=7\nmuted=false")
///         .with("user.prop", "volume=3"),
/// );
/// resolver.add_source("defaults.prop", Priority::Highest).unwrap();
/// resolver.add_source("user.prop", Priority::Highest).unwrap();
///
/// assert_eq!(resolver.get_i32("volume").unwrap(), Some(3));
/// assert_eq!(resolver.get_bool("muted").unwrap(), Some(false));
/// assert_eq!(resolver.get_string("missing").unwrap(), None);
/// ```
#[derive(Builder)]
pub struct Resolver {
    /// Finds the resources named in [`Resolver::add_source`].
    locator: Arc<dyn ResourceLocator>,

    #[builder(skip)]
    state: Mutex<State>,

    #[builder(skip)]
    signals: Listeners<Signal>,

    #[builder(skip)]
    changes: Listeners<CacheChange>,
}

impl Resolver {
    /// Create a resolver with no sources.
    pub fn new(locator: impl ResourceLocator + 'static) -> Self {
        Resolver::builder().locator(Arc::new(locator)).build()
    }

    // =========================================================================
    // Sources
    // =========================================================================

    /// Locate, parse and register the resource `name`.
    ///
    /// Registering a name twice is a no-op. A resource that cannot be found or
    /// read is reported through a signal and leaves the source list
    /// unchanged. A successful registration clears the cache.
    pub fn add_source(&self, name: &str, priority: Priority) -> Result<SourceStatus, ResolveError> {
        let mut events = Vec::new();
        let status = self.state.lock().add_source(&*self.locator, name, priority, &mut events);
        self.flush(events);
        status
    }

    /// Whether a source named `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.state.lock().position(name).is_some()
    }

    /// Names of the registered sources, lowest priority first.
    pub fn source_names(&self) -> Vec<String> {
        self.state.lock().source_names()
    }

    /// Write the source `name` back to its file.
    ///
    /// Keys the cache holds a resolved value for are written in that value's
    /// canonical form. All other entries are written as loaded. On success the
    /// registered source is replaced by the written entries, so later cache
    /// invalidations keep the exported values.
    pub fn export(&self, name: &str) -> Result<(), ExportError> {
        let mut state = self.state.lock();
        let Some(index) = state.position(name) else {
            return Err(ExportError::UnknownSource {
                name: name.to_string(),
            });
        };
        let source = &state.sources[index];
        let Origin::File(path) = source.origin() else {
            return Err(ExportError::NotWritable {
                name: name.to_string(),
            });
        };
        let path = path.clone();

        let entries: Vec<(String, String)> = source
            .entries()
            .map(|(key, raw)| {
                let stored = state
                    .cache
                    .value(key)
                    .map_or(raw, CachedValue::representation);
                (key.to_string(), stored.to_string())
            })
            .collect();
        let text = write_file(entries.iter().map(|(key, raw)| (key.as_str(), raw.as_str())));
        fs::write(&path, text).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(source = name, path = %path.display(), "exported source");
        state.sources[index] = Source::new(name, Origin::File(path), entries);
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve `key` with `reader`.
    ///
    /// Returns `Ok(None)` when no source provides a value the reader accepts.
    /// Returns an error when no source is registered, or when the key was
    /// cached by a reader producing another type.
    pub fn get<R: Reader>(&self, key: &str, reader: &R) -> Result<Option<R::Value>, ResolveError> {
        let mut events = Vec::new();
        let result = self.state.lock().resolve(key, reader, &mut events);
        self.flush(events);
        result
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, ResolveError> {
        self.get(key, &StringReader)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ResolveError> {
        self.get(key, &BoolReader)
    }

    pub fn get_char(&self, key: &str) -> Result<Option<char>, ResolveError> {
        self.get(key, &CharReader)
    }

    pub fn get_i32(&self, key: &str) -> Result<Option<i32>, ResolveError> {
        self.get(key, &IntReader::new())
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, ResolveError> {
        self.get(key, &LongReader::new())
    }

    pub fn get_f32(&self, key: &str) -> Result<Option<f32>, ResolveError> {
        self.get(key, &FloatReader::new())
    }

    pub fn get_f64(&self, key: &str) -> Result<Option<f64>, ResolveError> {
        self.get(key, &DoubleReader::new())
    }

    pub fn get_message_template(&self, key: &str) -> Result<Option<MessageTemplate>, ResolveError> {
        self.get(key, &MessageReader)
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// The cache state of `key`, without consulting any source.
    pub fn cached<T: Any + Clone>(&self, key: &str) -> Result<Lookup<T>, ResolveError> {
        match self.state.lock().cache.get(key) {
            None => Ok(Lookup::Unresolved),
            Some(ResolvedEntry::ConfirmedAbsent) => Ok(Lookup::ConfirmedAbsent),
            Some(ResolvedEntry::Value(cached)) => downcast::<T>(key, cached).map(Lookup::Found),
        }
    }

    /// Store `value` for `key` in its canonical form, as if it had been
    /// resolved.
    pub fn set<R: CanonicalReader>(&self, key: &str, reader: &R, value: R::Value) {
        let representation = reader.to_canonical(&value);
        self.put(key, ResolvedEntry::Value(CachedValue::new(value, representation)));
    }

    /// Store `entry` for `key`. Change listeners are notified even when the
    /// value is unchanged.
    pub fn put(&self, key: &str, entry: ResolvedEntry) {
        let change = self.state.lock().cache.put(key, entry);
        self.flush(vec![Event::Change(change)]);
    }

    /// Forget every resolution, notifying change listeners once per key.
    pub fn clear_cache(&self) {
        let changes = self.state.lock().cache.clear();
        debug!(keys = changes.len(), "cache cleared");
        self.flush(changes.into_iter().map(Event::Change).collect());
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Call `listener` on every cache write.
    pub fn subscribe_changes(
        &self,
        listener: impl Fn(&CacheChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.changes.subscribe(listener)
    }

    /// Call `listener` on cache writes to `key` only.
    pub fn subscribe_key(
        &self,
        key: impl Into<String>,
        listener: impl Fn(&CacheChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let key = key.into();
        self.changes.subscribe(move |change: &CacheChange| {
            if change.key == key {
                listener(change);
            }
        })
    }

    /// Call `listener` on every non-fatal signal.
    pub fn subscribe_signals(
        &self,
        listener: impl Fn(&Signal) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.signals.subscribe(listener)
    }

    /// Remove a change or signal listener. Returns false if `id` is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.signals.unsubscribe(id) || self.changes.unsubscribe(id)
    }

    /// Log and publish a signal raised outside a resolution.
    pub(crate) fn report(&self, signal: Signal) {
        self.flush(vec![Event::Signal(signal)]);
    }

    fn flush(&self, events: Vec<Event>) {
        for event in events {
            match event {
                Event::Signal(signal) => {
                    warn!(signal = signal.name(), "{signal}");
                    self.signals.publish(&signal);
                }
                Event::Change(change) => self.changes.publish(&change),
            }
        }
    }
}

impl State {
    fn position(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|source| source.name() == name)
    }

    fn source_names(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|source| source.name().to_string())
            .collect()
    }

    fn add_source(
        &mut self,
        locator: &dyn ResourceLocator,
        name: &str,
        priority: Priority,
        events: &mut Vec<Event>,
    ) -> Result<SourceStatus, ResolveError> {
        if self.position(name).is_some() {
            return Ok(SourceStatus::AlreadyRegistered);
        }
        let index = match priority {
            Priority::Highest => self.sources.len(),
            Priority::At(index) if index <= self.sources.len() => index,
            Priority::At(index) => {
                return Err(ResolveError::IndexOutOfRange {
                    index,
                    len: self.sources.len(),
                });
            }
        };

        let resource = match locator.locate(name) {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                events.push(Event::Signal(Signal::MissingSource {
                    name: name.to_string(),
                }));
                return Ok(SourceStatus::Missing);
            }
            Err(err) => {
                events.push(Event::Signal(Signal::SourceReadError {
                    name: name.to_string(),
                    message: err.to_string(),
                }));
                return Ok(SourceStatus::Unreadable);
            }
        };
        let source = match Source::load(name, resource) {
            Ok(source) => source,
            Err(err) => {
                events.push(Event::Signal(Signal::SourceReadError {
                    name: name.to_string(),
                    message: err.to_string(),
                }));
                return Ok(SourceStatus::Unreadable);
            }
        };

        debug!(source = name, index, entries = source.len(), "registered source");
        self.sources.insert(index, source);
        let changes = self.cache.clear();
        debug!(keys = changes.len(), "cache invalidated");
        events.extend(changes.into_iter().map(Event::Change));
        Ok(SourceStatus::Added)
    }

    fn resolve<R: Reader>(
        &mut self,
        key: &str,
        reader: &R,
        events: &mut Vec<Event>,
    ) -> Result<Option<R::Value>, ResolveError> {
        match self.cache.get(key) {
            Some(ResolvedEntry::ConfirmedAbsent) => {
                trace!(key, "cache hit: absent");
                return Ok(None);
            }
            Some(ResolvedEntry::Value(cached)) => {
                trace!(key, "cache hit");
                return downcast::<R::Value>(key, cached).map(Some);
            }
            None => {}
        }
        if self.sources.is_empty() {
            return Err(ResolveError::NoSources {
                key: key.to_string(),
            });
        }

        let mut failures = 0;
        let candidates = self
            .sources
            .iter()
            .rev()
            .filter_map(|source| source.get(key).map(|raw| (source, raw)));
        for (source, raw) in candidates {
            match reader.parse(raw) {
                Ok(value) => {
                    debug!(key, source = source.name(), "resolved");
                    let entry = ResolvedEntry::Value(CachedValue::new(value.clone(), raw));
                    events.push(Event::Change(self.cache.put(key, entry)));
                    return Ok(Some(value));
                }
                Err(err) => {
                    failures += 1;
                    events.push(Event::Signal(Signal::ParseError {
                        source: source.name().to_string(),
                        key: key.to_string(),
                        raw: raw.to_string(),
                        message: err.message().to_string(),
                    }));
                }
            }
        }

        let signal = if failures == 0 {
            Signal::NotFound {
                key: key.to_string(),
                sources: self.source_names(),
                suggestions: self.suggestions(key),
            }
        } else {
            Signal::CouldNotLoad {
                key: key.to_string(),
            }
        };
        events.push(Event::Signal(signal));
        events.push(Event::Change(self.cache.put(key, ResolvedEntry::ConfirmedAbsent)));
        Ok(None)
    }

    /// Keys defined by any source within a small edit distance of `key`.
    ///
    /// Distance is at most 1 for keys of up to 3 chars and at most 2
    /// otherwise. Returns up to 3 keys, closest first.
    fn suggestions(&self, key: &str) -> Vec<String> {
        let max_distance = if key.chars().count() <= 3 { 1 } else { 2 };
        let known: BTreeSet<&str> = self.sources.iter().flat_map(Source::keys).collect();
        let mut close: Vec<(usize, &str)> = known
            .into_iter()
            .filter_map(|candidate| {
                let distance = levenshtein(key, candidate);
                (distance > 0 && distance <= max_distance).then_some((distance, candidate))
            })
            .collect();
        close.sort_by_key(|(distance, _)| *distance);
        close
            .into_iter()
            .take(3)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

fn downcast<T: Any + Clone>(key: &str, cached: &CachedValue) -> Result<T, ResolveError> {
    cached
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ResolveError::TypeMismatch {
            key: key.to_string(),
            cached: cached.type_name(),
            requested: type_name::<T>(),
        })
}
