use std::fmt;

/// Result type for livedisplay-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// Page definition rejected (empty page)
    InvalidPage(String),

    /// Key-value store error
    Store(livedisplay_types::Error),

    /// Cache payload could not be (de)serialized
    Serialization(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPage(msg) => write!(f, "Invalid page: {}", msg),
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPage(_) => None,
            Error::Store(err) => Some(err),
            Error::Serialization(err) => Some(err),
        }
    }
}

impl From<livedisplay_types::Error> for Error {
    fn from(err: livedisplay_types::Error) -> Self {
        Error::Store(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err)
    }
}
