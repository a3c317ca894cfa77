use thiserror::Error;

/// A locale identifier that could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("invalid locale '{locale}': {message}")]
    Invalid { locale: String, message: String },
}
