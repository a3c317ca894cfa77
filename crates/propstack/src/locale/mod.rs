//! Locale-qualified sources and localized messages.

mod bundle;
mod chain;
mod error;

pub use bundle::LocaleBundle;
pub use chain::{DEFAULT_AVAILABLE_LOCALES, LocaleFolderChain};
pub use error::LocaleError;
