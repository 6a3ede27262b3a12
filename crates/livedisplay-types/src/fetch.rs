use std::fmt;

/// Outcome of a single producer invocation
pub type FetchResult = std::result::Result<String, FetchError>;

/// Why a producer did not yield a display string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Arguments of the wrong shape; shown on the row as `invalid`
    InvalidArgs(String),

    /// Backend unreachable, rate limited, or returned something unparseable.
    /// The row keeps its current message and the cache is left alone.
    Failed(String),
}

impl FetchError {
    /// Text a row shows for this error, if it shows anything at all.
    pub fn display_text(&self) -> Option<&'static str> {
        match self {
            FetchError::InvalidArgs(_) => Some("invalid"),
            FetchError::Failed(_) => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            FetchError::Failed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
