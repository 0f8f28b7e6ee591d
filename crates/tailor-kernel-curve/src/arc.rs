//! Circular arcs approximated by a single cubic.
//!
//! An arc is described by its center, radius and angular window. The
//! Bezier handles sit on the end tangents at `4/3 * r * tan(sweep / 4)`,
//! which keeps the cubic within a fraction of a millimeter of the true
//! circle for the sweeps used in sleeve caps.

use std::f64::consts::{FRAC_PI_2, PI};

use tailor_kernel_geom::polar_offset;
use tailor_kernel_math::{Point2, Vec2};

use crate::bezier::CubicBezier;

/// Window and sizing rules for an [`ArcFit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcLimits {
    /// Smallest allowed sweep in radians.
    pub min_sweep: f64,
    /// Lowest allowed start angle.
    pub min_start: f64,
    /// Fixed end angle of a freshly built arc, and the upper window limit.
    pub end: f64,
    /// Share of the sweep placed above a rebalancing anchor.
    pub up_ratio: f64,
    /// Share of the sweep placed below a rebalancing anchor.
    pub down_ratio: f64,
}

impl ArcLimits {
    /// Sleeve cap limits: a window of `[-PI/2, PI/2]` split 3:2 around the anchor.
    pub const SLEEVE_CAP: Self = Self {
        min_sweep: 0.01,
        min_start: -FRAC_PI_2,
        end: FRAC_PI_2,
        up_ratio: 3.0,
        down_ratio: 2.0,
    };

    /// Largest sweep that fits the window.
    pub fn max_sweep(&self) -> f64 {
        (self.end - self.min_start).min(PI)
    }

    fn clamp_sweep(&self, sweep: f64) -> f64 {
        sweep.max(self.min_sweep).min(self.max_sweep())
    }
}

impl Default for ArcLimits {
    fn default() -> Self {
        Self::SLEEVE_CAP
    }
}

/// A circular arc and its single-cubic approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcFit {
    /// Arc center.
    pub center: Point2,
    /// Radius in cm.
    pub radius: f64,
    /// Start angle in radians.
    pub start_angle: f64,
    /// End angle in radians.
    pub end_angle: f64,
    /// Length requested when the arc was built.
    pub target_length: f64,
    /// Current arc length (`sweep * radius`).
    pub total_length: f64,
    /// Cubic approximation of the arc.
    pub bezier: CubicBezier,
    limits: ArcLimits,
}

/// Handle length that makes a cubic follow a circular arc of `sweep` radians.
pub fn arc_handle_length(radius: f64, sweep: f64) -> f64 {
    let h = 4.0 / 3.0 * radius * (sweep / 4.0).tan();
    if h.is_finite() {
        h
    } else {
        0.0
    }
}

impl ArcFit {
    /// Build an arc of `target_length` ending at the limit's end angle.
    ///
    /// Returns `None` for a non-positive radius.
    pub fn build(center: Point2, radius: f64, target_length: f64, limits: ArcLimits) -> Option<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        let mut sweep = limits.clamp_sweep(target_length / radius);
        let mut start = limits.end - sweep;
        if start < limits.min_start {
            start = limits.min_start;
            sweep = limits.end - start;
        }
        let mut arc = Self {
            center,
            radius,
            start_angle: start,
            end_angle: start + sweep,
            target_length,
            total_length: sweep * radius,
            bezier: CubicBezier::line(center, center),
            limits,
        };
        arc.update_geometry(start, limits.end);
        Some(arc)
    }

    /// Re-center the arc window around `anchor_angle`, keeping its length.
    ///
    /// The sweep is split up:down by the limit ratios, shifted back inside
    /// the window, clamped, and widened to the minimum sweep if needed.
    pub fn rebalance(&mut self, anchor_angle: f64) {
        if !anchor_angle.is_finite() {
            return;
        }
        let limits = self.limits;
        let ratio_sum = limits.up_ratio + limits.down_ratio;
        if ratio_sum <= 0.0 {
            return;
        }
        let desired = if self.total_length > 0.0 {
            self.total_length
        } else {
            self.target_length
        };
        let sweep = limits.clamp_sweep(desired / self.radius);
        let up = sweep * limits.up_ratio / ratio_sum;
        let down = sweep - up;
        let mut start = anchor_angle - down;
        let mut end = anchor_angle + up;
        if start < limits.min_start {
            let shift = limits.min_start - start;
            start += shift;
            end += shift;
        }
        if end > limits.end {
            let shift = end - limits.end;
            start -= shift;
            end -= shift;
        }
        start = start.max(limits.min_start);
        end = end.min(limits.end);
        if end - start < limits.min_sweep {
            let mid = (start + end) / 2.0;
            start = mid - limits.min_sweep / 2.0;
            end = mid + limits.min_sweep / 2.0;
        }
        self.update_geometry(start, end);
    }

    /// Set the window to `[start, end]` and recompute anchors, handles and length.
    pub fn update_geometry(&mut self, start: f64, end: f64) {
        self.start_angle = start;
        self.end_angle = end;
        let sweep = (end - start).max(self.limits.min_sweep);
        let h = arc_handle_length(self.radius, sweep);
        let p0 = polar_offset(&self.center, start, self.radius);
        let p3 = polar_offset(&self.center, end, self.radius);
        let t0 = Vec2::new(-start.sin(), start.cos());
        let t1 = Vec2::new(-end.sin(), end.cos());
        self.bezier = CubicBezier::new(p0, p0 + t0 * h, p3 - t1 * h, p3);
        self.total_length = sweep * self.radius;
    }

    /// Start point of the arc.
    pub fn start_point(&self) -> Point2 {
        self.bezier.p0
    }

    /// End point of the arc.
    pub fn end_point(&self) -> Point2 {
        self.bezier.p3
    }

    /// Sweep in radians.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}
