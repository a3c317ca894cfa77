use std::fmt::Display;
use std::sync::Arc;

use bon::Builder;
use tracing::debug;

use super::chain::LocaleFolderChain;
use crate::reader::{MessageReader, Reader};
use crate::resolver::{Priority, ResolveError, Resolver, Signal};

/// Localized messages backed by a [`Resolver`].
///
/// Files are registered by base name and loaded from the most specific
/// folder of the locale chain that provides them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use propstack::{Bundled, LocaleBundle, LocaleFolderChain, Priority, Resolver, args};
///
/// let resolver = Arc::new(Resolver::new(
///     Bundled::new()
///         .with("fr_FR/ui.prop", "greeting=Bonjour {0} !")
///         .with("en_US/ui.prop", "greeting=Hello {0}!"),
/// ));
/// let bundle = LocaleBundle::builder()
///     .resolver(resolver)
///     .chain(LocaleFolderChain::builder().locale("fr_CA").build().unwrap())
///     .build();
///
/// bundle.add_localized_source("ui.prop", Priority::Highest).unwrap();
/// assert_eq!(bundle.get_message("greeting", &args!["Ann"]).unwrap(), "Bonjour Ann !");
/// ```
#[derive(Builder)]
pub struct LocaleBundle {
    resolver: Arc<Resolver>,
    chain: LocaleFolderChain,
}

impl LocaleBundle {
    /// Register `file` from the first folder of the chain that has it.
    ///
    /// Returns the folder used, or `None` when no folder provides the file.
    /// Missing the active locale's folder publishes
    /// [`Signal::CurrentLocaleNotFound`]. Missing every folder also publishes
    /// [`Signal::DefaultLocaleNotFound`].
    pub fn add_localized_source(
        &self,
        file: &str,
        priority: Priority,
    ) -> Result<Option<&str>, ResolveError> {
        for (attempt, folder) in self.chain.folders().iter().enumerate() {
            let path = format!("{folder}/{file}");
            if self.resolver.add_source(&path, priority)?.is_registered() {
                if attempt > 0 {
                    debug!(file, folder = folder.as_str(), "using fallback locale folder");
                }
                return Ok(Some(folder.as_str()));
            }
            if attempt == 0 {
                self.resolver.report(Signal::CurrentLocaleNotFound {
                    folder: folder.clone(),
                    file: file.to_string(),
                    path,
                });
            }
        }
        self.resolver.report(Signal::DefaultLocaleNotFound {
            file: file.to_string(),
        });
        Ok(None)
    }

    /// Format the message `key` with `params`.
    ///
    /// Returns an empty string when the key does not resolve, or when `params`
    /// does not match the number of parameters the message awaits. The second
    /// case publishes [`Signal::InvalidParameterCount`].
    pub fn get_message<D: Display>(&self, key: &str, params: &[D]) -> Result<String, ResolveError> {
        let Some(template) = self.resolver.get(key, &MessageReader)? else {
            return Ok(String::new());
        };
        match template.format(params) {
            Ok(message) => Ok(message),
            Err(err) => {
                self.resolver.report(Signal::InvalidParameterCount {
                    key: key.to_string(),
                    expected: err.expected,
                    pattern: err.pattern.clone(),
                    message: err.to_string(),
                });
                Ok(String::new())
            }
        }
    }

    /// Resolve a locale-dependent value that is not a message.
    pub fn get_localized<R: Reader>(
        &self,
        key: &str,
        reader: &R,
    ) -> Result<Option<R::Value>, ResolveError> {
        self.resolver.get(key, reader)
    }

    pub fn chain(&self) -> &LocaleFolderChain {
        &self.chain
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }
}
