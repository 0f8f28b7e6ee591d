//! Error types for draft plans.

use tailor_measure::MeasureError;
use thiserror::Error;

/// Errors that stop a draft before any geometry is built.
#[derive(Error, Debug)]
pub enum DraftError {
    /// A step reads a point that no earlier step writes.
    #[error("step '{step}' reads '{label}', which no earlier step produces")]
    UnproducedRead {
        /// Step name.
        step: String,
        /// Point label.
        label: String,
    },

    /// Two steps write the same point.
    #[error("step '{step}' writes '{label}', which an earlier step already produces")]
    DuplicateOutput {
        /// Step name.
        step: String,
        /// Point label.
        label: String,
    },

    /// A step places notches on a path that no earlier step draws.
    #[error("step '{step}' uses path '{path}', which no earlier step draws")]
    UnknownPath {
        /// Step name.
        step: String,
        /// Path name.
        path: String,
    },

    /// A dart tool was pointed at a path the draft does not have.
    #[error("no path named '{0}'")]
    MissingPath(String),

    /// A dart tool needs a single straight segment.
    #[error("path '{0}' is not a single straight line")]
    NotALine(String),

    /// Dart geometry that cannot be built.
    #[error("dart: {0}")]
    Dart(String),

    /// No garment goes by this name.
    #[error("unknown garment '{0}'")]
    UnknownGarment(String),

    /// Invalid draft settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be parsed.
    #[error("settings file: {0}")]
    SettingsFile(#[from] toml::de::Error),

    /// Measurement layer failure.
    #[error(transparent)]
    Measure(#[from] MeasureError),

    /// A draft could not be (de)serialized.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for draft operations.
pub type Result<T> = std::result::Result<T, DraftError>;
