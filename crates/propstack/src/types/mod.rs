mod entry;
mod template;
mod value;

pub use entry::{CachedValue, Lookup, ResolvedEntry};
pub use template::{MessageTemplate, ParameterCountMismatch};
pub use value::Value;
