//! Error types for the rescue crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the rescue crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no usable Q-table at {path}: {reason}")]
    TableMissing { path: PathBuf, reason: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid action '{value}' (expected one of: up, down, left, right or 0-3)")]
    InvalidAction { value: String },

    #[error("invalid layout: {message}")]
    InvalidLayout { message: String },

    #[error("invalid level '{input}'. Expected one of: easy, hard")]
    InvalidLevel { input: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("episode already finished; call reset() before stepping again")]
    EpisodeFinished,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
