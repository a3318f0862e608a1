//! Error types for the Liquidsoap telnet client

/// Result type alias for Liquidsoap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the Liquidsoap server socket
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// TCP connect or read/write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connect or response deadline exceeded
    #[error("Timed out waiting for Liquidsoap ({0})")]
    Timeout(String),

    /// The peer closed without sending any payload
    #[error("Empty response for command: {0}")]
    EmptyResponse(String),

    /// Station name contains characters outside the telnet-safe set
    #[error("Invalid station name: {0:?}")]
    InvalidStationName(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}
