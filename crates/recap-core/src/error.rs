use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading and summarising streaming history.
#[derive(Error, Debug)]
pub enum RecapError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A history file is not a valid array of playback records.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record's timestamp did not match any recognised format.
    #[error("Invalid timestamp {value} in {path}")]
    TimestampParse { path: PathBuf, value: String },

    /// A record in a history file lacks a field every export record carries.
    #[error("Record in {path} is missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    /// A record reached projection without a field the schema requires.
    #[error("Record is missing required field `{field}`")]
    Schema { field: &'static str },

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the recap crates.
pub type Result<T> = std::result::Result<T, RecapError>;
