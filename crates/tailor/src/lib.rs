#![warn(missing_docs)]

//! tailor: parametric pattern drafting in Rust.
//!
//! Drafts bodices, sleeves and skirts from body measurements and exports
//! them as SVG, DXF or JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use tailor::{export, DraftSettings, ExportSettings, Garment, HeadlessInput};
//!
//! let input = HeadlessInput::new().with_number("BrC", 92.0);
//! let ctx = Garment::CasualBodice
//!     .draft(&input, &DraftSettings::default())
//!     .unwrap();
//! export::write_draft(&ctx, "bodice.svg", &ExportSettings::default()).unwrap();
//! ```

pub mod export;

mod error;
mod settings;

use std::path::Path;

pub use error::{ExportError, Result};
pub use settings::ExportSettings;

pub use tailor_draft::{
    render, DraftContext, DraftError, DraftPath, DraftRequest, DraftSettings, Garment, Notch,
    Orientation, PathSegment, Plan, Point2D, RecordingTarget, RenderTarget, SkippedStep,
    SolverSettings, Stroke,
};
pub use tailor_measure::{FitProfile, FitTable, FormInput, HeadlessInput, InputSurface};

pub use tailor_draft as draft;
pub use tailor_kernel_curve as curve;
pub use tailor_kernel_geom as geom;
pub use tailor_kernel_math as math;
pub use tailor_measure as measure;

/// Run a draft request and write the result to `path`.
///
/// Uses the built-in fit profile table. Returns the draft so callers can
/// report skipped steps.
pub fn draft_to_file(
    request: &DraftRequest,
    draft_settings: &DraftSettings,
    export_settings: &ExportSettings,
    path: impl AsRef<Path>,
) -> Result<DraftContext> {
    let ctx = request.run(&FitTable::default(), draft_settings)?;
    export::write_draft(&ctx, path, export_settings)?;
    Ok(ctx)
}
