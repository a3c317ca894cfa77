//! Non-fatal resolution events and listener fan-out.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// A non-fatal condition observed while loading sources or resolving keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// No resource exists under the source name.
    MissingSource { name: String },

    /// The resource exists but could not be read or parsed.
    SourceReadError { name: String, message: String },

    /// A source holds a value for the key that the reader rejected.
    ParseError {
        source: String,
        key: String,
        raw: String,
        message: String,
    },

    /// No registered source defines the key.
    NotFound {
        key: String,
        sources: Vec<String>,
        /// Keys defined by some source that are close to the requested one.
        suggestions: Vec<String>,
    },

    /// Every source that defines the key holds a malformed value.
    CouldNotLoad { key: String },

    /// The file is missing from the active locale's folder.
    CurrentLocaleNotFound {
        folder: String,
        file: String,
        path: String,
    },

    /// The file is missing from every folder of the locale chain.
    DefaultLocaleNotFound { file: String },

    /// A message was formatted with the wrong number of arguments.
    InvalidParameterCount {
        key: String,
        expected: usize,
        pattern: String,
        message: String,
    },
}

impl Signal {
    /// A stable identifier for the kind of signal, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Signal::MissingSource { .. } => "missing_source",
            Signal::SourceReadError { .. } => "source_read_error",
            Signal::ParseError { .. } => "parse_error",
            Signal::NotFound { .. } => "not_found",
            Signal::CouldNotLoad { .. } => "could_not_load",
            Signal::CurrentLocaleNotFound { .. } => "current_locale_not_found",
            Signal::DefaultLocaleNotFound { .. } => "default_locale_not_found",
            Signal::InvalidParameterCount { .. } => "invalid_parameter_count",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::MissingSource { name } => write!(f, "source '{name}' not found"),
            Signal::SourceReadError { name, message } => {
                write!(f, "source '{name}' could not be read: {message}")
            }
            Signal::ParseError {
                source,
                key,
                raw,
                message,
            } => write!(
                f,
                "source '{source}' has invalid value '{raw}' for '{key}': {message}"
            ),
            Signal::NotFound {
                key,
                sources,
                suggestions,
            } => {
                write!(f, "'{key}' not found in [{}]", sources.join(", "))?;
                if !suggestions.is_empty() {
                    write!(f, ", did you mean: {}", suggestions.join(", "))?;
                }
                Ok(())
            }
            Signal::CouldNotLoad { key } => write!(f, "no source holds a valid value for '{key}'"),
            Signal::CurrentLocaleNotFound { folder, file, path } => {
                write!(f, "'{file}' not found for locale '{folder}' (tried '{path}')")
            }
            Signal::DefaultLocaleNotFound { file } => {
                write!(f, "'{file}' not found in any locale folder")
            }
            Signal::InvalidParameterCount {
                key,
                expected,
                pattern,
                message,
            } => write!(
                f,
                "message '{key}' ('{pattern}') expects {expected} parameters: {message}"
            ),
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A set of listeners for events of type `E`.
///
/// Publishing iterates over a snapshot of the set, so a listener may
/// subscribe or unsubscribe listeners from inside its callback. Changes take
/// effect from the next publish.
pub struct Listeners<E> {
    entries: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if `id` is not subscribed here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener subscribed at the time of the call.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn publish_reaches_every_listener() {
        let listeners = Listeners::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let total = Arc::clone(&total);
            listeners.subscribe(move |n| {
                total.fetch_add(*n as usize, Ordering::SeqCst);
            });
        }
        listeners.publish(&2);
        assert_eq!(total.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let listeners = Listeners::<()>::new();
        let first = listeners.subscribe(|()| {});
        listeners.subscribe(|()| {});
        assert!(listeners.unsubscribe(first));
        assert!(!listeners.unsubscribe(first));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_publish() {
        let listeners = Arc::new(Listeners::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let id_slot = Arc::new(Mutex::new(None));

        let id = {
            let inner = Arc::clone(&listeners);
            let calls = Arc::clone(&calls);
            let id_slot = Arc::clone(&id_slot);
            listeners.subscribe(move |()| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *id_slot.lock() {
                    inner.unsubscribe(id);
                }
            })
        };
        *id_slot.lock() = Some(id);

        listeners.publish(&());
        listeners.publish(&());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn listener_added_during_publish_waits_for_next_event() {
        let listeners = Arc::new(Listeners::<()>::new());
        let late_calls = Arc::new(AtomicUsize::new(0));
        {
            let listeners_in = Arc::clone(&listeners);
            let late_calls = Arc::clone(&late_calls);
            listeners.subscribe(move |()| {
                let late_calls = Arc::clone(&late_calls);
                listeners_in.subscribe(move |()| {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                });
            });
        }
        listeners.publish(&());
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        listeners.publish(&());
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }
}
