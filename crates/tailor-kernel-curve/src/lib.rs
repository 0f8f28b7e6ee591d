#![warn(missing_docs)]

//! Curve fitting for the tailor drafting kernel.
//!
//! Every curved seam of a draft is a chain of cubic Bezier segments.
//! This crate builds them:
//!
//! - **Arcs**: single-cubic circular arcs with a bounded angular window
//!   that can be re-centered around a required point
//! - **Waypoint fits**: a Newton solve that slides one handle until the
//!   curve passes through a guide point
//! - **Bulges and smooth midpoints**: handle rules derived from chord length
//! - **Distance queries**: point and normal at a length along a path, used
//!   for notches
//!
//! # Example
//!
//! ```
//! use tailor_kernel_curve::{ArcFit, ArcLimits};
//! use tailor_kernel_math::Point2;
//!
//! let arc = ArcFit::build(Point2::origin(), 18.0, 20.0, ArcLimits::SLEEVE_CAP).unwrap();
//! assert!((arc.bezier.length() - 20.0).abs() < 0.2);
//! ```

mod arc;
mod bezier;
mod construct;
mod path;
mod solve;

pub use arc::{arc_handle_length, ArcFit, ArcLimits};
pub use bezier::CubicBezier;
pub use construct::{
    clamp_handle_length, ensure_right_facing, handle_for_midpoint, offset_toward,
    smooth_midpoint_path, Bow, BulgeCurve, HorizontalHandle, MidpointHandles, MIN_HANDLE_LENGTH,
};
pub use path::{path_length, point_at_distance, CurveSegment, PathSample, NOTCH_HALF_LENGTH};
pub use solve::{solve_waypoint, WaypointFit, WaypointParams};
