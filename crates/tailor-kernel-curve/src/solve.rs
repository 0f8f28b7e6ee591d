//! Newton solve for a cubic that must pass through a waypoint.
//!
//! The start anchor, its handle and the end anchor are fixed. The end
//! handle slides along a fixed direction (`p3 + dir * L`). The solver
//! searches for the pair `(t, L)` such that `B(t) == waypoint`.

use tailor_kernel_math::{Point2, Vec2};

use crate::bezier::CubicBezier;

/// Iteration limits for [`solve_waypoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointParams {
    /// Maximum Newton iterations.
    pub max_iterations: usize,
    /// Per-axis distance that counts as a hit.
    pub tolerance: f64,
    /// Jacobian determinant below which the solve stops.
    pub det_eps: f64,
}

impl WaypointParams {
    /// Limits used for front armholes.
    pub const FRONT_ARMHOLE: Self = Self {
        max_iterations: 25,
        tolerance: 0.0005,
        det_eps: 1e-6,
    };

    /// Limits used for back armholes.
    pub const BACK_ARMHOLE: Self = Self {
        max_iterations: 30,
        tolerance: 0.0003,
        det_eps: 1e-8,
    };
}

/// Outcome of a waypoint solve. The last iterate is always returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointFit {
    /// The fitted cubic.
    pub curve: CubicBezier,
    /// Parameter at which the curve meets the waypoint.
    pub t: f64,
    /// Length of the sliding end handle.
    pub handle_length: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the waypoint was reached within tolerance.
    pub converged: bool,
    /// Remaining distance to the waypoint.
    pub residual: f64,
}

/// Fit the end handle of `p0, p1, ?, p3` so the curve passes through `waypoint`.
///
/// `dir` should be a unit vector; `initial_length` seeds the handle length.
/// `t` is kept in `[0.05, 0.95]` and the handle length at or above `0.05`.
pub fn solve_waypoint(
    p0: Point2,
    p1: Point2,
    p3: Point2,
    dir: Vec2,
    waypoint: Point2,
    initial_length: f64,
    params: WaypointParams,
) -> WaypointFit {
    let mut t = 0.5;
    let mut len = initial_length;
    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..params.max_iterations {
        let curve = CubicBezier::new(p0, p1, p3 + dir * len, p3);
        let diff = curve.eval(t) - waypoint;
        if diff.x.abs() < params.tolerance && diff.y.abs() < params.tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        let d_dt = curve.tangent(t);
        let d_dl = dir * (3.0 * (1.0 - t) * t * t);
        let det = d_dt.x * d_dl.y - d_dt.y * d_dl.x;
        if det.abs() < params.det_eps {
            break;
        }
        let delta_t = (-diff.x * d_dl.y + d_dl.x * diff.y) / det;
        let delta_l = (-d_dt.x * diff.y + d_dt.y * diff.x) / det;
        t = (t + delta_t).clamp(0.05, 0.95);
        len = (len + delta_l).max(0.05);
    }

    let curve = CubicBezier::new(p0, p1, p3 + dir * len, p3);
    let residual = (curve.eval(t) - waypoint).norm();
    if !converged {
        converged = residual < params.tolerance;
    }
    WaypointFit {
        curve,
        t,
        handle_length: len,
        iterations,
        converged,
        residual,
    }
}
