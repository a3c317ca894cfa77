pub mod locale;
pub mod parser;
pub mod reader;
pub mod resolver;
pub mod types;

pub use locale::{DEFAULT_AVAILABLE_LOCALES, LocaleBundle, LocaleError, LocaleFolderChain};
pub use parser::{ParseError, TemplateError};
pub use reader::{
    BoolReader, CanonicalReader, CharReader, DoubleReader, FloatReader, FormatError, IntReader,
    LongReader, MessageReader, NumberReader, Reader, StringReader,
};
pub use resolver::{
    Bundled, CacheChange, ExportError, LocatorChain, Origin, Priority, ResolveError, Resolver,
    Resource, ResourceLocator, SearchPath, Signal, Source, SourceStatus, SubscriptionId,
};
pub use types::{CachedValue, Lookup, MessageTemplate, ParameterCountMismatch, ResolvedEntry, Value};

/// Creates a `Vec<Value>` of message arguments.
///
/// Arguments are converted via `Into<Value>`, so integers, floats, bools,
/// chars and strings can be mixed freely.
///
/// # Example
///
/// ```
/// use propstack::{MessageTemplate, args};
///
/// let template = MessageTemplate::parse("{0} has {1} cards").unwrap();
/// assert_eq!(template.format(&args!["Ann", 3]).unwrap(), "Ann has 3 cards");
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    [] => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    [ $($value:expr),+ $(,)? ] => {
        ::std::vec![ $( ::std::convert::Into::<$crate::Value>::into($value) ),+ ]
    };
}
