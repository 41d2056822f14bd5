use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the article statistics crates.
///
/// The transformation functions themselves never fail; malformed rows are
/// dropped. These variants only surface at the I/O and configuration edges.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report could not be serialised to JSON.
    #[error("Failed to serialise JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// A date string did not match `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    DateParse(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the statistics crates.
pub type Result<T> = std::result::Result<T, StatsError>;
