//! Export errors.

use tailor_draft::DraftError;
use thiserror::Error;

/// Errors returned while drafting or writing a draft to disk.
#[derive(Error, Debug)]
pub enum ExportError {
    /// An I/O error occurred during export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A draft could not be (de)serialized.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Drafting failed before any geometry was written.
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Export settings file could not be parsed.
    #[error("export settings file: {0}")]
    SettingsFile(#[from] toml::de::Error),

    /// Invalid export settings.
    #[error("invalid export settings: {0}")]
    InvalidSettings(String),

    /// The output path has no known format extension.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The draft has nothing to draw.
    #[error("empty draft '{0}'")]
    EmptyDraft(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
