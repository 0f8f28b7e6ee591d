//! Curve segments, chained paths and distance-along-path queries.

use tailor_kernel_math::{unit, Point2, Tolerance, Vec2};

use crate::bezier::CubicBezier;

/// Half the length of a notch tick in cm.
pub const NOTCH_HALF_LENGTH: f64 = 0.25;

/// Slack allowed when a distance lands exactly on a segment joint.
const JOINT_SLACK: f64 = 1e-4;

/// One piece of a drafted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    /// A straight segment.
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// A cubic Bezier segment.
    Cubic(CubicBezier),
}

impl CurveSegment {
    /// Straight segment from `start` to `end`.
    pub fn line(start: Point2, end: Point2) -> Self {
        CurveSegment::Line { start, end }
    }

    /// Cubic segment from anchors and handles.
    pub fn cubic(start: Point2, start_handle: Point2, end_handle: Point2, end: Point2) -> Self {
        CurveSegment::Cubic(CubicBezier::new(start, start_handle, end_handle, end))
    }

    /// Get the start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            CurveSegment::Line { start, .. } => *start,
            CurveSegment::Cubic(c) => c.p0,
        }
    }

    /// Get the end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            CurveSegment::Line { end, .. } => *end,
            CurveSegment::Cubic(c) => c.p3,
        }
    }

    /// The segment as a cubic; lines become cubics with handles on their anchors.
    pub fn as_cubic(&self) -> CubicBezier {
        match self {
            CurveSegment::Line { start, end } => CubicBezier::line(*start, *end),
            CurveSegment::Cubic(c) => *c,
        }
    }

    /// Check if this segment is degenerate (zero length).
    pub fn is_degenerate(&self) -> bool {
        self.length() < Tolerance::DEFAULT.linear
    }

    /// Get the length of this segment.
    pub fn length(&self) -> f64 {
        match self {
            CurveSegment::Line { start, end } => (end - start).norm(),
            CurveSegment::Cubic(c) => c.length(),
        }
    }

    /// Sample `steps + 1` points along the segment.
    pub fn flatten(&self, steps: usize) -> Vec<Point2> {
        match self {
            CurveSegment::Line { start, end } => vec![*start, *end],
            CurveSegment::Cubic(c) => {
                let steps = steps.max(1);
                (0..=steps).map(|i| c.eval(i as f64 / steps as f64)).collect()
            }
        }
    }
}

/// Total polyline length of a chain of segments.
pub fn path_length(segments: &[CurveSegment]) -> f64 {
    segments.iter().map(CurveSegment::length).sum()
}

/// A point found at a distance along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Position on the path.
    pub point: Point2,
    /// Unit normal (tangent rotated a quarter turn counter-clockwise).
    pub normal: Vec2,
}

impl PathSample {
    /// End points of the notch tick centered on this sample.
    pub fn notch_tick(&self) -> (Point2, Point2) {
        (
            self.point - self.normal * NOTCH_HALF_LENGTH,
            self.point + self.normal * NOTCH_HALF_LENGTH,
        )
    }
}

/// Locate the point `distance` along a chained path.
///
/// With `from_end` the distance is measured back from the last anchor.
/// The distance is clamped to the path length. Returns `None` for a
/// non-positive distance or a path without length.
pub fn point_at_distance(
    segments: &[CurveSegment],
    distance: f64,
    from_end: bool,
) -> Option<PathSample> {
    if !distance.is_finite() || distance <= 0.0 {
        return None;
    }
    let cubics: Vec<CubicBezier> = segments.iter().map(CurveSegment::as_cubic).collect();
    let lengths: Vec<f64> = cubics.iter().map(CubicBezier::length).collect();
    let total: f64 = lengths.iter().filter(|l| l.is_finite() && **l > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let along = if from_end { total - distance } else { distance };
    let mut remaining = along.clamp(0.0, total);
    for (cubic, len) in cubics.iter().zip(&lengths) {
        if !len.is_finite() || *len <= 0.0 {
            continue;
        }
        if remaining <= len + JOINT_SLACK {
            let clamped = remaining.min(*len);
            let t = cubic.parameter_for_length(clamped, *len);
            let tangent = cubic.tangent(t);
            let normal = unit(&Vec2::new(-tangent.y, tangent.x)).unwrap_or_else(|| Vec2::new(1.0, 0.0));
            return Some(PathSample {
                point: cubic.eval(t),
                normal,
            });
        }
        remaining -= len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_path() -> Vec<CurveSegment> {
        vec![
            CurveSegment::line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
            CurveSegment::line(Point2::new(10.0, 0.0), Point2::new(10.0, 5.0)),
        ]
    }

    #[test]
    fn test_segment_accessors() {
        let seg = CurveSegment::cubic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(3.0, 0.0),
        );
        assert_eq!(seg.start(), Point2::new(0.0, 0.0));
        assert_eq!(seg.end(), Point2::new(3.0, 0.0));
        assert!(!seg.is_degenerate());
        assert_eq!(seg.flatten(8).len(), 9);
        assert!(CurveSegment::line(Point2::origin(), Point2::origin()).is_degenerate());
    }

    #[test]
    fn test_path_length() {
        assert_relative_eq!(path_length(&l_path()), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_at_distance_first_segment() {
        let sample = point_at_distance(&l_path(), 4.0, false).unwrap();
        assert!((sample.point.x - 4.0).abs() < 1e-3);
        assert_relative_eq!(sample.point.y, 0.0, epsilon = 1e-9);
        // Tangent +x, normal +y.
        assert_relative_eq!(sample.normal.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_at_distance_crosses_joint() {
        let sample = point_at_distance(&l_path(), 12.0, false).unwrap();
        assert!((sample.point.x - 10.0).abs() < 1e-9);
        assert!((sample.point.y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_at_distance_from_end() {
        let sample = point_at_distance(&l_path(), 1.0, true).unwrap();
        assert!((sample.point.y - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_at_distance_clamps() {
        let sample = point_at_distance(&l_path(), 100.0, false).unwrap();
        assert!((sample.point - Point2::new(10.0, 5.0)).norm() < 1e-6);
        assert!(point_at_distance(&l_path(), 0.0, false).is_none());
        assert!(point_at_distance(&l_path(), -2.0, false).is_none());
    }

    #[test]
    fn test_notch_tick_length() {
        let sample = point_at_distance(&l_path(), 4.0, false).unwrap();
        let (a, b) = sample.notch_tick();
        assert_relative_eq!((b - a).norm(), 0.5, epsilon = 1e-9);
    }
}
