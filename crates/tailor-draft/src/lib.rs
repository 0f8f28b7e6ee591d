#![warn(missing_docs)]

//! Step plans and garment drafts.
//!
//! A draft is a [`Plan`]: an ordered list of [`Step`]s, each declaring the
//! point labels it reads and writes. Plans are validated before they run,
//! and a step whose inputs are missing or degenerate is skipped and
//! recorded instead of aborting the draft. Everything a run produces lands
//! in a [`DraftContext`], which renders through any [`RenderTarget`].
//!
//! # Example
//!
//! ```
//! use tailor_draft::{DraftSettings, Garment};
//! use tailor_measure::HeadlessInput;
//!
//! let ctx = Garment::ShapingBodice
//!     .draft(&HeadlessInput::new(), &DraftSettings::default())
//!     .unwrap();
//! assert!(ctx.skipped().is_empty());
//! assert!(ctx.point("17b").is_some());
//! ```

mod aldrich;
mod armstrong;
mod bodice;
mod context;
mod darts;
mod error;
mod garment;
mod plan;
mod render;
mod settings;
mod shaping;
mod skirt;
mod sleeve;
mod types;

pub use aldrich::{aldrich_bodice_plan, draft_aldrich_bodice};
pub use armstrong::{armstrong_bodice_plan, draft_armstrong_bodice, ARMSTRONG_BACK_GAP};
pub use bodice::{casual_bodice_plan, draft_casual_bodice, HipBalance, CASUAL_SIDE_GAP};
pub use context::DraftContext;
pub use darts::{
    common_apex, dart_paths, fold_dart, line_ends, match_line_length, nearest_seam, place_dart,
    place_dart_on, DartLayout, DartLegs, DartPosition, FoldedDart, LineEnd, PageDirection,
    PlacedDart, SeamHit, APEX_TOLERANCE,
};
pub use error::{DraftError, Result};
pub use garment::{DraftRequest, Garment};
pub use plan::{Plan, Scope, Step, StepFn};
pub use render::{render, RecordingTarget, RenderTarget};
pub use settings::{DraftSettings, SolverSettings};
pub use shaping::{
    dart_swing, draft_shaping_bodice, shaping_bodice_plan, DEFAULT_BACK_SHOULDER_DART_INTAKE,
    DEFAULT_WAIST_SHAPING, SHAPING_SIDE_GAP,
};
pub use skirt::{basic_skirt_plan, draft_basic_skirt};
pub use sleeve::{
    back_cap_radius, cap_line_length, draft_tight_sleeve, front_cap_radius, tight_sleeve_plan,
};
pub use types::{
    BoundingBox2D, DraftPath, NamedPoint, Notch, Orientation, PathSegment, Point2D, SkippedStep,
    Stroke,
};
