use thiserror::Error;

/// Errors raised by the genre indexer
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
