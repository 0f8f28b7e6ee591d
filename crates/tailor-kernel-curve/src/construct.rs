//! Handle construction helpers shared by the garment drafts.

use tailor_kernel_math::{perp, unit, Point2, Vec2};

use crate::bezier::CubicBezier;
use crate::path::CurveSegment;

/// Handle length used when a requested horizontal handle has no usable length.
pub const MIN_HANDLE_LENGTH: f64 = 0.5;

/// Handle length as a ratio of a chord, clamped to `[min, max]`.
///
/// Returns zero for a chord without length. A non-positive `max` means no upper bound.
pub fn clamp_handle_length(chord: f64, ratio: f64, min: f64, max: f64) -> f64 {
    if !chord.is_finite() || chord <= 0.0 || !ratio.is_finite() {
        return 0.0;
    }
    let mut len = chord * ratio;
    if min.is_finite() {
        len = len.max(min);
    }
    if max.is_finite() && max > 0.0 {
        len = len.min(max);
    }
    len
}

/// Flip `v` so it points to the right (or up when vertical).
pub fn ensure_right_facing(v: Vec2) -> Vec2 {
    if v.x < 0.0 || (v.x.abs() < 1e-5 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

/// Point `distance` from `from` toward `toward`.
///
/// A zero-length direction falls back to `+x`.
pub fn offset_toward(from: &Point2, toward: &Point2, distance: f64) -> Point2 {
    let dir = unit(&(toward - from)).unwrap_or_else(|| Vec2::new(1.0, 0.0));
    from + dir * distance
}

/// A horizontal handle override for one end of a [`BulgeCurve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalHandle {
    /// Handle length in cm; non-positive values fall back to [`MIN_HANDLE_LENGTH`].
    pub length: f64,
    /// `+1.0` points the handle toward `+x`, anything negative toward `-x`.
    pub sign: f64,
}

impl HorizontalHandle {
    fn offset(&self) -> Vec2 {
        let len = if self.length.is_finite() && self.length > 0.0 {
            self.length
        } else {
            MIN_HANDLE_LENGTH
        };
        Vec2::new(if self.sign >= 0.0 { len } else { -len }, 0.0)
    }
}

/// A two-anchor curve bowed off its chord.
///
/// Handles sit a third of the way along the chord, pushed sideways by
/// `bulge` along the chord normal `(dy, -dx) / len`. In a y-down draft
/// that normal points counter-clockwise as seen on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BulgeCurve {
    /// Sideways push of both handles in cm.
    pub bulge: f64,
    /// Collapse the start handle onto its anchor.
    pub flatten_start: bool,
    /// Collapse the end handle onto its anchor.
    pub flatten_end: bool,
    /// Replace the start handle with a horizontal one.
    pub start_horizontal: Option<HorizontalHandle>,
    /// Replace the end handle with a horizontal one.
    pub end_horizontal: Option<HorizontalHandle>,
}

impl BulgeCurve {
    /// A plain bulge with both handles free.
    pub fn new(bulge: f64) -> Self {
        Self {
            bulge,
            ..Default::default()
        }
    }

    /// Collapse the end handle.
    pub fn flatten_end(mut self) -> Self {
        self.flatten_end = true;
        self
    }

    /// Collapse the start handle.
    pub fn flatten_start(mut self) -> Self {
        self.flatten_start = true;
        self
    }

    /// Use a horizontal end handle.
    pub fn with_end_horizontal(mut self, length: f64, sign: f64) -> Self {
        self.end_horizontal = Some(HorizontalHandle { length, sign });
        self
    }

    /// Use a horizontal start handle.
    pub fn with_start_horizontal(mut self, length: f64, sign: f64) -> Self {
        self.start_horizontal = Some(HorizontalHandle { length, sign });
        self
    }

    /// Build the cubic from `start` to `end`.
    pub fn build(&self, start: Point2, end: Point2) -> CubicBezier {
        let d = end - start;
        let len = d.norm();
        let n = if len > 0.0 {
            Vec2::new(d.y / len, -d.x / len)
        } else {
            Vec2::zeros()
        };
        let push = n * self.bulge;

        let p1 = match (self.start_horizontal, self.flatten_start) {
            (Some(h), _) => start + h.offset(),
            (None, true) => start,
            (None, false) => start + d / 3.0 + push,
        };
        let p2 = match (self.end_horizontal, self.flatten_end) {
            (Some(h), _) => end + h.offset(),
            (None, true) => end,
            (None, false) => end - d / 3.0 + push,
        };
        CubicBezier::new(start, p1, p2, end)
    }
}

/// Handle `p2` that puts the cubic's midpoint (`t = 1/2`) on `target`.
pub fn handle_for_midpoint(p0: &Point2, p1: &Point2, p3: &Point2, target: &Point2) -> Point2 {
    let (f0, f1, f2, f3) = (0.125, 0.375, 0.375, 0.125);
    Point2::from((target.coords - p0.coords * f0 - p1.coords * f1 - p3.coords * f3) / f2)
}

/// Handle proportions for [`smooth_midpoint_path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidpointHandles {
    /// Along-path ratio, min and max for the handles at the mid anchor.
    pub mid: (f64, f64, f64),
    /// Sideways ratio, min and max for the handles at the mid anchor.
    pub perp: (f64, f64, f64),
    /// Ratio, min and max for the end handle.
    pub end: (f64, f64, f64),
    /// Fixed offset of the start handle from the start anchor.
    pub start_offset: Vec2,
}

impl MidpointHandles {
    /// Proportions used for sleeve side seams.
    pub const SLEEVE_SEAM: Self = Self {
        mid: (0.28, 1.2, 6.0),
        perp: (0.05, 0.2, 0.2),
        end: (0.24, 1.2, 5.0),
        start_offset: Vec2::new(0.0, 4.0),
    };
}

/// Which way the mid-anchor handles bow relative to the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bow {
    /// The upper handle leans left and the lower handle right.
    UpperLeft,
    /// The upper handle leans right and the lower handle left.
    UpperRight,
}

/// Two cubics from `start` through `mid` to `end`, smooth at `mid`.
pub fn smooth_midpoint_path(
    start: Point2,
    mid: Point2,
    end: Point2,
    handles: MidpointHandles,
    bow: Bow,
) -> [CurveSegment; 2] {
    let lower = (start - mid).norm();
    let upper = (mid - end).norm();
    let up_dir = unit(&(end - mid)).unwrap_or_else(|| Vec2::new(1.0, 0.0));
    let down_dir = unit(&(start - mid)).unwrap_or_else(|| Vec2::new(1.0, 0.0));
    let perp_right = ensure_right_facing(perp(&up_dir));
    let perp_left = -perp_right;
    let (upper_side, lower_side) = match bow {
        Bow::UpperLeft => (perp_left, perp_right),
        Bow::UpperRight => (perp_right, perp_left),
    };

    let (mr, mmin, mmax) = handles.mid;
    let (pr, pmin, pmax) = handles.perp;
    let (er, emin, emax) = handles.end;

    let mid_up = mid
        + up_dir * clamp_handle_length(upper, mr, mmin, mmax)
        + upper_side * clamp_handle_length(upper, pr, pmin, pmax);
    let mid_down = mid
        + down_dir * clamp_handle_length(lower, mr, mmin, mmax)
        + lower_side * clamp_handle_length(lower, pr, pmin, pmax);
    let end_dir = unit(&(mid - end)).unwrap_or_else(|| Vec2::new(1.0, 0.0));
    let end_handle = end + end_dir * clamp_handle_length(upper, er, emin, emax);
    let start_handle = start + handles.start_offset;

    [
        CurveSegment::cubic(start, start_handle, mid_down, mid),
        CurveSegment::cubic(mid, mid_up, end_handle, end),
    ]
}
