use std::fmt;

/// Result type for livedisplay-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Engine layer error (invalid page definitions)
    Engine(livedisplay_engine::Error),

    /// Key-value store error
    Store(livedisplay_types::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "Engine error: {}", err),
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<livedisplay_engine::Error> for Error {
    fn from(err: livedisplay_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<livedisplay_types::Error> for Error {
    fn from(err: livedisplay_types::Error) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
