//! Error types for the dose_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dose_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted state could not be written
    #[error("Storage unavailable: {0}")]
    Storage(String),

    /// A calendar day string was not in `YYYY-MM-DD` form
    #[error("Invalid calendar day: {0}")]
    InvalidDay(String),

    /// A dose reference did not match anything due on the requested day
    #[error("Unknown dose: {0}")]
    UnknownDose(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
