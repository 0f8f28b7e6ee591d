//! Cubic Bezier evaluation, length and crossing searches.

use tailor_kernel_math::{Point2, Vec2};

/// Bisection steps used by [`CubicBezier::parameter_for_length`].
pub const LENGTH_BISECTION_STEPS: usize = 20;

/// Coarse samples used by [`CubicBezier::horizontal_crossing`].
pub const CROSSING_SAMPLES: usize = 60;

/// Height difference treated as an exact hit by [`CubicBezier::horizontal_crossing`].
pub const CROSSING_EPS: f64 = 1e-5;

/// A cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    /// Start anchor.
    pub p0: Point2,
    /// Handle leaving the start anchor.
    pub p1: Point2,
    /// Handle entering the end anchor.
    pub p2: Point2,
    /// End anchor.
    pub p3: Point2,
}

impl CubicBezier {
    /// Create a new cubic from anchors and handles.
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// A cubic that traces the straight segment `a -> b`.
    pub fn line(a: Point2, b: Point2) -> Self {
        Self::new(a, a, b, b)
    }

    /// Point at parameter `t`.
    pub fn eval(&self, t: f64) -> Point2 {
        let u = 1.0 - t;
        let f0 = u * u * u;
        let f1 = 3.0 * u * u * t;
        let f2 = 3.0 * u * t * t;
        let f3 = t * t * t;
        Point2::from(
            self.p0.coords * f0 + self.p1.coords * f1 + self.p2.coords * f2 + self.p3.coords * f3,
        )
    }

    /// First derivative at parameter `t`.
    pub fn tangent(&self, t: f64) -> Vec2 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Polyline length from `t = 0` up to `upto`.
    ///
    /// Uses `max(5, round(40 * upto))` chords.
    pub fn length_to(&self, upto: f64) -> f64 {
        let span = if upto > 0.0 { upto } else { 1.0 };
        let steps = ((40.0 * span).round() as usize).max(5);
        let mut length = 0.0;
        let mut prev = self.p0;
        for i in 1..=steps {
            let pt = self.eval(span * i as f64 / steps as f64);
            length += (pt - prev).norm();
            prev = pt;
        }
        length
    }

    /// Full polyline length.
    pub fn length(&self) -> f64 {
        self.length_to(1.0)
    }

    /// Parameter at which the running length reaches `target`.
    pub fn parameter_for_length(&self, target: f64, total: f64) -> f64 {
        if target <= 0.0 {
            return 0.0;
        }
        if target >= total {
            return 1.0;
        }
        let mut low = 0.0;
        let mut high = 1.0;
        for _ in 0..LENGTH_BISECTION_STEPS {
            let mid = (low + high) / 2.0;
            if self.length_to(mid) < target {
                low = mid;
            } else {
                high = mid;
            }
        }
        (low + high) / 2.0
    }

    /// First point where the curve crosses height `y`, scanning from `t = 0`.
    ///
    /// Coarse sampling finds the bracket; bisection refines it.
    pub fn horizontal_crossing(&self, y: f64) -> Option<Point2> {
        let mut prev = self.eval(0.0);
        let mut prev_diff = prev.y - y;
        if !prev_diff.is_finite() {
            return None;
        }
        if prev_diff.abs() < CROSSING_EPS {
            return Some(prev);
        }
        for i in 1..=CROSSING_SAMPLES {
            let t = i as f64 / CROSSING_SAMPLES as f64;
            let point = self.eval(t);
            let diff = point.y - y;
            if diff.abs() < CROSSING_EPS {
                return Some(point);
            }
            if (diff > 0.0) != (prev_diff > 0.0) {
                let mut low = (i - 1) as f64 / CROSSING_SAMPLES as f64;
                let mut high = t;
                for _ in 0..LENGTH_BISECTION_STEPS {
                    let mid = (low + high) / 2.0;
                    let mid_point = self.eval(mid);
                    let mid_diff = mid_point.y - y;
                    if mid_diff.abs() < CROSSING_EPS {
                        return Some(mid_point);
                    }
                    if (mid_diff > 0.0) == (prev_diff > 0.0) {
                        prev = mid_point;
                        prev_diff = mid_diff;
                        low = mid;
                    } else {
                        high = mid;
                    }
                }
                return Some(prev);
            }
            prev = point;
            prev_diff = diff;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarter_circle(r: f64) -> CubicBezier {
        let k = 4.0 / 3.0 * (std::f64::consts::PI / 8.0).tan() * r;
        CubicBezier::new(
            Point2::new(r, 0.0),
            Point2::new(r, k),
            Point2::new(k, r),
            Point2::new(0.0, r),
        )
    }

    #[test]
    fn test_eval_endpoints() {
        let c = quarter_circle(10.0);
        assert_eq!(c.eval(0.0), c.p0);
        assert!((c.eval(1.0) - c.p3).norm() < 1e-12);
    }

    #[test]
    fn test_tangent_at_ends() {
        let c = quarter_circle(10.0);
        let t0 = c.tangent(0.0);
        assert_relative_eq!(t0.x, 0.0, epsilon = 1e-12);
        assert!(t0.y > 0.0);
        let t1 = c.tangent(1.0);
        assert!(t1.x < 0.0);
        assert_relative_eq!(t1.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_line_length() {
        let c = CubicBezier::line(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_relative_eq!(c.length(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quarter_circle_length() {
        let c = quarter_circle(10.0);
        let expected = std::f64::consts::FRAC_PI_2 * 10.0;
        assert!((c.length() - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn test_parameter_for_length_midpoint() {
        let c = CubicBezier::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let total = c.length();
        assert_eq!(c.parameter_for_length(0.0, total), 0.0);
        assert_eq!(c.parameter_for_length(20.0, total), 1.0);
        let t = c.parameter_for_length(5.0, total);
        assert!((c.eval(t).x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_crossing() {
        let c = quarter_circle(10.0);
        let hit = c.horizontal_crossing(5.0).unwrap();
        assert!((hit.y - 5.0).abs() < 1e-4);
        assert!((hit.coords.norm() - 10.0).abs() < 0.01);
        assert!(c.horizontal_crossing(12.0).is_none());
    }
}
