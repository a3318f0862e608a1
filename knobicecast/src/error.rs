//! Error types for the Icecast status client

/// Result type alias for Icecast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when querying the Icecast status endpoint
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server answered with a non-success status
    #[error("Status endpoint returned {0}")]
    StatusCode(u16),

    /// No live source for the requested mount
    #[error("Mount not found: {0}")]
    MountNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
