#![warn(missing_docs)]

//! Point construction and intersection primitives for the tailor kernel.
//!
//! Every construction point of a draft is produced by one of the pure
//! functions in this crate: offsets along the drafting axes, projections
//! onto guide lines, line extensions to a target coordinate, line and
//! circle intersections, and rotations about a pivot.
//!
//! Degenerate inputs never panic. Functions that can fail return `None`
//! and the caller decides whether to skip the feature.

use tailor_kernel_math::{normalize_angle, polar_angle, Point2, Transform2, Vec2};

/// Squared length below which a guide line is considered degenerate.
pub const DEGENERATE_LEN_SQ: f64 = 1e-6;

/// Denominator below which two lines are treated as parallel.
pub const PARALLEL_EPS: f64 = 1e-6;

/// Delta below which a line counts as parallel to the axis it is extended along.
pub const EXTEND_EPS: f64 = 1e-4;

/// Slack accepted by [`circle_circle_intersection`] on the reach tests.
pub const CIRCLE_REACH_TOL: f64 = 0.01;

/// Slack used by [`is_angle_on_arc`].
pub const ARC_ANGLE_TOL: f64 = 1e-6;

// =============================================================================
// Offsets
// =============================================================================

/// A drafting axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Move `origin` by `distance` along `axis`.
pub fn offset_along_axis(origin: &Point2, distance: f64, axis: Axis) -> Point2 {
    match axis {
        Axis::X => Point2::new(origin.x + distance, origin.y),
        Axis::Y => Point2::new(origin.x, origin.y + distance),
    }
}

/// Point at `length` from `origin` in the direction `angle` (radians).
pub fn polar_offset(origin: &Point2, angle: f64, length: f64) -> Point2 {
    let (s, c) = angle.sin_cos();
    Point2::new(origin.x + c * length, origin.y + s * length)
}

// =============================================================================
// Projection and extension
// =============================================================================

fn projection_parameter(p: &Point2, a: &Point2, b: &Point2) -> Option<f64> {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < DEGENERATE_LEN_SQ {
        return None;
    }
    Some((p - a).dot(&d) / len_sq)
}

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`.
///
/// Returns `None` when the line is degenerate.
pub fn perpendicular_foot(p: &Point2, a: &Point2, b: &Point2) -> Option<Point2> {
    let t = projection_parameter(p, a, b)?;
    Some(a + (b - a) * t)
}

/// Orthogonal projection of `p` onto the segment `a..b`, clamped to its ends.
pub fn perpendicular_foot_clamped(p: &Point2, a: &Point2, b: &Point2) -> Option<Point2> {
    let t = projection_parameter(p, a, b)?.clamp(0.0, 1.0);
    Some(a + (b - a) * t)
}

/// Extend the line `a -> b` until it reaches height `y`.
///
/// A horizontal line cannot reach `y`; the result degenerates to `(b.x, y)`.
pub fn extend_line_to_y(a: &Point2, b: &Point2, y: f64) -> Point2 {
    let dy = b.y - a.y;
    if dy.abs() < EXTEND_EPS {
        return Point2::new(b.x, y);
    }
    let t = (y - a.y) / dy;
    Point2::new(a.x + (b.x - a.x) * t, y)
}

/// Extend the line `a -> b` until it reaches abscissa `x`.
///
/// A vertical line degenerates to `(x, b.y)`.
pub fn extend_line_to_x(a: &Point2, b: &Point2, x: f64) -> Point2 {
    let dx = b.x - a.x;
    if dx.abs() < EXTEND_EPS {
        return Point2::new(x, b.y);
    }
    let t = (x - a.x) / dx;
    Point2::new(x, a.y + (b.y - a.y) * t)
}

/// Where the line `a -> b` crosses height `y`, anchored on `a` when the line is flat.
pub fn horizontal_crossing(a: &Point2, b: &Point2, y: f64) -> Point2 {
    let dy = b.y - a.y;
    if dy.abs() < EXTEND_EPS {
        return Point2::new(a.x, y);
    }
    let t = (y - a.y) / dy;
    Point2::new(a.x + (b.x - a.x) * t, y)
}

// =============================================================================
// Line intersections
// =============================================================================

/// Intersection of the infinite lines `p1 -> p2` and `p3 -> p4`.
pub fn line_intersection(p1: &Point2, p2: &Point2, p3: &Point2, p4: &Point2) -> Option<Point2> {
    let denom = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let det1 = p1.x * p2.y - p1.y * p2.x;
    let det2 = p3.x * p4.y - p3.y * p4.x;
    let x = (det1 * (p3.x - p4.x) - (p1.x - p2.x) * det2) / denom;
    let y = (det1 * (p3.y - p4.y) - (p1.y - p2.y) * det2) / denom;
    Some(Point2::new(x, y))
}

/// Intersection of the segments `p1..p2` and `p3..p4`.
///
/// The crossing must lie on both segments within `tolerance`.
pub fn segment_intersection(
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    p4: &Point2,
    tolerance: f64,
) -> Option<Point2> {
    let hit = line_intersection(p1, p2, p3, p4)?;
    if point_on_segment(&hit, p1, p2, tolerance) && point_on_segment(&hit, p3, p4, tolerance) {
        Some(hit)
    } else {
        None
    }
}

/// Whether `p` lies on the segment `a..b` within `tolerance`.
///
/// The point must sit inside the padded bounding box of the segment and
/// within `tolerance` of its supporting line.
pub fn point_on_segment(p: &Point2, a: &Point2, b: &Point2, tolerance: f64) -> bool {
    let min_x = a.x.min(b.x) - tolerance;
    let max_x = a.x.max(b.x) + tolerance;
    let min_y = a.y.min(b.y) - tolerance;
    let max_y = a.y.max(b.y) + tolerance;
    if p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y {
        return false;
    }
    let seg = b - a;
    let len = seg.norm();
    if len < 1e-6 {
        return false;
    }
    let cross = (seg.x * (p.y - a.y) - seg.y * (p.x - a.x)).abs();
    cross / len <= tolerance
}

/// Intersection of the line through `origin` along `direction` with the segment `a..b`.
///
/// The segment parameter may overshoot either end by 1%.
pub fn line_segment_intersection(
    origin: &Point2,
    direction: &Vec2,
    a: &Point2,
    b: &Point2,
) -> Option<Point2> {
    let seg = b - a;
    let denom = direction.x * seg.y - direction.y * seg.x;
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let diff = a - origin;
    let t = (diff.x * seg.y - diff.y * seg.x) / denom;
    let u = (diff.x * direction.y - diff.y * direction.x) / denom;
    if !(-0.01..=1.01).contains(&u) {
        return None;
    }
    Some(origin + direction * t)
}

// =============================================================================
// Circles and arcs
// =============================================================================

/// Result of intersecting two circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleIntersection {
    /// The circles touch.
    Tangent(Point2),
    /// The circles cross at two points.
    Crossing(Point2, Point2),
}

impl CircleIntersection {
    /// The intersection points in construction order.
    pub fn points(&self) -> Vec<Point2> {
        match *self {
            CircleIntersection::Tangent(p) => vec![p],
            CircleIntersection::Crossing(a, b) => vec![a, b],
        }
    }
}

/// Intersect circle `(c1, r1)` with circle `(c2, r2)` via the radical line.
///
/// Returns `None` for concentric circles and for pairs that are too far
/// apart or nested, allowing [`CIRCLE_REACH_TOL`] of slack. Near-tangent
/// pairs inside the slack collapse to a single point.
pub fn circle_circle_intersection(
    c1: &Point2,
    r1: f64,
    c2: &Point2,
    r2: f64,
) -> Option<CircleIntersection> {
    let d = c2 - c1;
    let dist = d.norm();
    if !dist.is_finite() || dist == 0.0 {
        return None;
    }
    if dist > r1 + r2 + CIRCLE_REACH_TOL {
        return None;
    }
    if dist < (r1 - r2).abs() - CIRCLE_REACH_TOL {
        return None;
    }

    let a = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let mid = c1 + d * (a / dist);
    if h == 0.0 {
        return Some(CircleIntersection::Tangent(mid));
    }
    let offset = Vec2::new(-d.y, d.x) * (h / dist);
    Some(CircleIntersection::Crossing(mid + offset, mid - offset))
}

/// Whether `angle` lies within `[start, end]` (radians, `start <= end`).
pub fn is_angle_on_arc(angle: f64, start: f64, end: f64) -> bool {
    if start > end {
        return false;
    }
    angle + ARC_ANGLE_TOL >= start && angle - ARC_ANGLE_TOL <= end
}

/// A candidate chosen by [`select_point_on_arc`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPick {
    /// The chosen point.
    pub point: Point2,
    /// Its polar angle about the arc center.
    pub angle: f64,
    /// Whether the angle lies inside the arc window.
    pub on_arc: bool,
}

/// Pick one of `candidates` relative to the arc `center, [start, end]`.
///
/// Candidates whose polar angle lies on the arc win, and among those the
/// greatest angle wins. When none lies on the arc, the greatest angle
/// overall is taken.
pub fn select_point_on_arc(
    candidates: &[Point2],
    center: &Point2,
    start: f64,
    end: f64,
) -> Option<ArcPick> {
    let mut on_arc: Option<ArcPick> = None;
    let mut any: Option<ArcPick> = None;
    for p in candidates {
        let angle = polar_angle(center, p);
        if is_angle_on_arc(angle, start, end) && on_arc.map_or(true, |best| angle > best.angle) {
            on_arc = Some(ArcPick {
                point: *p,
                angle,
                on_arc: true,
            });
        }
        if any.map_or(true, |best| angle > best.angle) {
            any = Some(ArcPick {
                point: *p,
                angle,
                on_arc: false,
            });
        }
    }
    on_arc.or(any)
}

// =============================================================================
// Rotation
// =============================================================================

/// Signed rotation that swings ray `pivot -> from` onto ray `pivot -> to`, in `[-PI, PI]`.
pub fn rotation_between(pivot: &Point2, from: &Point2, to: &Point2) -> f64 {
    normalize_angle(polar_angle(pivot, to) - polar_angle(pivot, from))
}

/// Rotate `p` about `pivot` by `angle` radians.
pub fn rotate_about(p: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    Transform2::rotation_about(pivot, angle).apply_point(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sorted(mut pts: Vec<Point2>) -> Vec<Point2> {
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts
    }

    #[test]
    fn test_offsets() {
        let o = Point2::new(1.0, 2.0);
        assert_eq!(offset_along_axis(&o, 3.0, Axis::X), Point2::new(4.0, 2.0));
        assert_eq!(offset_along_axis(&o, -3.0, Axis::Y), Point2::new(1.0, -1.0));
        let p = polar_offset(&o, FRAC_PI_2, 2.0);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_foot() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let foot = perpendicular_foot(&Point2::new(3.0, 5.0), &a, &b).unwrap();
        assert_relative_eq!(foot.x, 3.0);
        assert_relative_eq!(foot.y, 0.0);

        let beyond = perpendicular_foot(&Point2::new(15.0, 5.0), &a, &b).unwrap();
        assert_relative_eq!(beyond.x, 15.0);
        let clamped = perpendicular_foot_clamped(&Point2::new(15.0, 5.0), &a, &b).unwrap();
        assert_relative_eq!(clamped.x, 10.0);
    }

    #[test]
    fn test_perpendicular_foot_degenerate_line() {
        let a = Point2::new(1.0, 1.0);
        let b = Point2::new(1.0 + 1e-4, 1.0);
        assert!(perpendicular_foot(&Point2::new(3.0, 5.0), &a, &b).is_none());
    }

    #[test]
    fn test_extend_line_to_y() {
        let p = extend_line_to_y(&Point2::new(0.0, 0.0), &Point2::new(-2.0, 10.0), 20.0);
        assert_relative_eq!(p.x, -4.0);
        assert_relative_eq!(p.y, 20.0);

        // Flat line degenerates to the end point's abscissa.
        let flat = extend_line_to_y(&Point2::new(0.0, 5.0), &Point2::new(3.0, 5.00001), 20.0);
        assert_eq!(flat, Point2::new(3.0, 20.0));
    }

    #[test]
    fn test_extend_line_to_x() {
        let p = extend_line_to_x(&Point2::new(0.0, 0.0), &Point2::new(2.0, 1.0), 6.0);
        assert_relative_eq!(p.y, 3.0);
        let vertical = extend_line_to_x(&Point2::new(1.0, 0.0), &Point2::new(1.0, 4.0), 6.0);
        assert_eq!(vertical, Point2::new(6.0, 4.0));
    }

    #[test]
    fn test_horizontal_crossing_anchors_on_start() {
        let flat = horizontal_crossing(&Point2::new(2.0, 5.0), &Point2::new(3.0, 5.0), 0.0);
        assert_eq!(flat, Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_line_intersection() {
        let hit = line_intersection(
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 10.0),
            &Point2::new(0.0, 10.0),
            &Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x, 5.0);
        assert_relative_eq!(hit.y, 5.0);

        assert!(line_intersection(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_segment_intersection_bounded() {
        let a1 = Point2::new(0.0, 0.0);
        let a2 = Point2::new(4.0, 0.0);
        assert!(segment_intersection(&a1, &a2, &Point2::new(2.0, -1.0), &Point2::new(2.0, 1.0), 0.01).is_some());
        assert!(segment_intersection(&a1, &a2, &Point2::new(6.0, -1.0), &Point2::new(6.0, 1.0), 0.01).is_none());
    }

    #[test]
    fn test_point_on_segment() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        assert!(point_on_segment(&Point2::new(5.0, 0.005), &a, &b, 0.01));
        assert!(!point_on_segment(&Point2::new(5.0, 0.05), &a, &b, 0.01));
        assert!(!point_on_segment(&Point2::new(10.5, 0.0), &a, &b, 0.01));
    }

    #[test]
    fn test_line_segment_intersection_overshoot() {
        let origin = Point2::new(0.0, 0.0);
        let dir = Vec2::new(0.0, 1.0);
        let hit = line_segment_intersection(&origin, &dir, &Point2::new(-1.0, 3.0), &Point2::new(1.0, 3.0)).unwrap();
        assert_relative_eq!(hit.y, 3.0);

        // Segment ends 0.5% short of the line: still accepted.
        let near = line_segment_intersection(&origin, &dir, &Point2::new(-2.0, 3.0), &Point2::new(-0.01, 3.0));
        assert!(near.is_some());
        let far = line_segment_intersection(&origin, &dir, &Point2::new(-2.0, 3.0), &Point2::new(-1.0, 3.0));
        assert!(far.is_none());
    }

    #[test]
    fn test_circle_intersection_two_points() {
        let hits = circle_circle_intersection(&Point2::new(0.0, 0.0), 5.0, &Point2::new(8.0, 0.0), 5.0)
            .unwrap()
            .points();
        assert_eq!(hits.len(), 2);
        for p in &hits {
            assert_relative_eq!(p.x, 4.0, epsilon = 1e-12);
            assert_relative_eq!(p.y.abs(), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_circle_intersection_symmetry() {
        let c1 = Point2::new(0.0, 0.0);
        let c2 = Point2::new(30.0, 0.0);
        let forward = sorted(circle_circle_intersection(&c1, 18.06, &c2, 21.3).unwrap().points());
        let swapped = sorted(circle_circle_intersection(&c2, 21.3, &c1, 18.06).unwrap().points());
        assert_eq!(forward.len(), swapped.len());
        for (a, b) in forward.iter().zip(&swapped) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_circle_intersection_tangent() {
        let hit = circle_circle_intersection(&Point2::new(0.0, 0.0), 2.0, &Point2::new(5.0, 0.0), 3.0).unwrap();
        match hit {
            CircleIntersection::Tangent(p) => assert_relative_eq!(p.x, 2.0),
            other => panic!("expected tangent, got {other:?}"),
        }
        // Inside the reach slack the pair still meets at one point.
        let slack = circle_circle_intersection(&Point2::new(0.0, 0.0), 2.0, &Point2::new(5.005, 0.0), 3.0);
        assert!(matches!(slack, Some(CircleIntersection::Tangent(_))));
    }

    #[test]
    fn test_circle_intersection_degenerate() {
        let o = Point2::new(0.0, 0.0);
        assert!(circle_circle_intersection(&o, 2.0, &o, 2.0).is_none());
        assert!(circle_circle_intersection(&o, 2.0, &Point2::new(5.02, 0.0), 3.0).is_none());
        assert!(circle_circle_intersection(&o, 10.0, &Point2::new(1.0, 0.0), 2.0).is_none());
    }

    #[test]
    fn test_is_angle_on_arc() {
        assert!(is_angle_on_arc(0.5, 0.0, 1.0));
        assert!(is_angle_on_arc(1.0 + 1e-7, 0.0, 1.0));
        assert!(!is_angle_on_arc(1.1, 0.0, 1.0));
        assert!(!is_angle_on_arc(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_select_point_prefers_greatest_on_arc() {
        let center = Point2::new(0.0, 0.0);
        let candidates = [
            Point2::new(1.0, 0.2),
            Point2::new(0.2, 1.0),
            Point2::new(-1.0, 0.1),
        ];
        let pick = select_point_on_arc(&candidates, &center, 0.0, FRAC_PI_2).unwrap();
        assert!(pick.on_arc);
        assert_eq!(pick.point, Point2::new(0.2, 1.0));
    }

    #[test]
    fn test_select_point_falls_back_to_greatest_angle() {
        let center = Point2::new(0.0, 0.0);
        let candidates = [Point2::new(0.0, -1.0), Point2::new(-1.0, 0.1)];
        let pick = select_point_on_arc(&candidates, &center, 0.0, FRAC_PI_2).unwrap();
        assert!(!pick.on_arc);
        assert_eq!(pick.point, Point2::new(-1.0, 0.1));
        assert!(select_point_on_arc(&[], &center, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_rotation_between_and_rotate() {
        let pivot = Point2::new(1.0, 1.0);
        let from = Point2::new(2.0, 1.0);
        let to = Point2::new(1.0, 2.0);
        let angle = rotation_between(&pivot, &from, &to);
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-12);
        let r = rotate_about(&from, &pivot, angle);
        assert!((r - to).norm() < 1e-12);

        // Wraps across the branch cut.
        let wrap = rotation_between(&pivot, &Point2::new(0.0, 1.1), &Point2::new(0.0, 0.9));
        assert!(wrap.abs() < PI / 4.0);
    }
}
