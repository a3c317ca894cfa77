//! Named key/value sources and the locators that find them.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::parser::{ParseError, parse_bytes};

/// Where a located resource came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A file on disk, writable by export.
    File(PathBuf),
    /// Compiled-in or otherwise read-only content.
    Bundled,
}

/// The raw content of a located resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub origin: Origin,
    pub bytes: Vec<u8>,
}

/// Finds resources by name.
///
/// Names are `/`-separated relative paths such as `"en_US/messages.prop"`.
pub trait ResourceLocator: Send + Sync {
    /// Returns `Ok(None)` when no resource has that name, and an error when
    /// one exists but cannot be read.
    fn locate(&self, name: &str) -> io::Result<Option<Resource>>;
}

/// Searches an ordered list of directories; the first root containing the
/// name wins.
///
/// # Example
///
/// ```
/// use propstack::{ResourceLocator, SearchPath};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("app.prop"), "title=Demo").unwrap();
///
/// let search = SearchPath::new([dir.path()]);
/// assert!(search.locate("app.prop").unwrap().is_some());
/// assert!(search.locate("other.prop").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceLocator for SearchPath {
    fn locate(&self, name: &str) -> io::Result<Option<Resource>> {
        let Some(relative) = relative_path(name) else {
            return Ok(None);
        };
        for root in &self.roots {
            let path = root.join(&relative);
            if path.is_file() {
                let bytes = fs::read(&path)?;
                return Ok(Some(Resource {
                    origin: Origin::File(path),
                    bytes,
                }));
            }
        }
        Ok(None)
    }
}

/// Convert a resource name into a relative path, refusing names that could
/// escape a root.
fn relative_path(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let path = Path::new(name);
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        .then(|| path.to_path_buf())
}

/// In-memory, read-only resources.
///
/// # Example
///
/// ```
/// use propstack::{Bundled, Origin, ResourceLocator};
///
/// let bundled = Bundled::new().with("defaults.prop", "volume=7");
/// let resource = bundled.locate("defaults.prop").unwrap().unwrap();
/// assert_eq!(resource.origin, Origin::Bundled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bundled {
    resources: HashMap<String, Vec<u8>>,
}

impl Bundled {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, builder style.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.resources.insert(name.into(), content.into());
    }
}

impl ResourceLocator for Bundled {
    fn locate(&self, name: &str) -> io::Result<Option<Resource>> {
        Ok(self.resources.get(name).map(|bytes| Resource {
            origin: Origin::Bundled,
            bytes: bytes.clone(),
        }))
    }
}

/// Consults several locators in order, returning the first hit.
///
/// A typical setup puts a user-editable [`SearchPath`] before the
/// [`Bundled`] defaults.
#[derive(Default)]
pub struct LocatorChain {
    locators: Vec<Box<dyn ResourceLocator>>,
}

impl LocatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a locator consulted after the existing ones.
    pub fn with(mut self, locator: impl ResourceLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl ResourceLocator for LocatorChain {
    fn locate(&self, name: &str) -> io::Result<Option<Resource>> {
        for locator in &self.locators {
            if let Some(resource) = locator.locate(name)? {
                return Ok(Some(resource));
            }
        }
        Ok(None)
    }
}

/// An immutable, parsed key/value mapping loaded from one resource.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    origin: Origin,
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl Source {
    /// Parse a located resource.
    pub fn load(name: impl Into<String>, resource: Resource) -> Result<Self, ParseError> {
        let entries = parse_bytes(&resource.bytes)?;
        Ok(Self::new(name, resource.origin, entries))
    }

    pub fn new(name: impl Into<String>, origin: Origin, entries: Vec<(String, String)>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();
        Self {
            name: name.into(),
            origin,
            entries,
            positions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The raw text for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_rejects_escapes() {
        assert!(relative_path("fr_FR/x.prop").is_some());
        assert!(relative_path("../x.prop").is_none());
        assert!(relative_path("a/../../x.prop").is_none());
        assert!(relative_path("/etc/passwd").is_none());
        assert!(relative_path("").is_none());
    }

    #[test]
    fn search_path_prefers_first_root() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("a.prop"), "k=first").unwrap();
        fs::write(second.path().join("a.prop"), "k=second").unwrap();

        let search = SearchPath::new([first.path(), second.path()]);
        let resource = search.locate("a.prop").unwrap().unwrap();
        assert_eq!(resource.bytes, b"k=first");
        assert_eq!(resource.origin, Origin::File(first.path().join("a.prop")));
    }

    #[test]
    fn chain_falls_through_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let chain = LocatorChain::new()
            .with(SearchPath::new([dir.path()]))
            .with(Bundled::new().with("defaults.prop", "k=v"));
        let resource = chain.locate("defaults.prop").unwrap().unwrap();
        assert_eq!(resource.origin, Origin::Bundled);
        assert!(chain.locate("nothing.prop").unwrap().is_none());
    }

    #[test]
    fn source_lookup() {
        let source = Source::load(
            "s",
            Resource {
                origin: Origin::Bundled,
                bytes: b"a=1\nb=2".to_vec(),
            },
        )
        .unwrap();
        assert_eq!(source.get("b"), Some("2"));
        assert_eq!(source.get("c"), None);
        assert_eq!(source.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
