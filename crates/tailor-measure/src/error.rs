//! Error types for measurement handling.

use thiserror::Error;

/// Errors that can occur while preparing measurements.
#[derive(Error, Debug)]
pub enum MeasureError {
    /// No fit profile with this name exists in the table.
    #[error("unknown fit profile: {0}")]
    UnknownProfile(String),

    /// A fit profile table could not be parsed.
    #[error("invalid fit profile table: {0}")]
    ProfileTable(#[from] toml::de::Error),

    /// A fit profile table parsed but is unusable.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for measurement operations.
pub type Result<T> = std::result::Result<T, MeasureError>;
