//! Serializable output types of a draft.

use serde::{Deserialize, Serialize};
use tailor_kernel_curve::{CubicBezier, CurveSegment};
use tailor_kernel_math::{Point2, Vec2};

/// A point in draft space, in cm.
///
/// Kept apart from nalgebra's `Point2` so drafts serialize as plain
/// `{ x, y }` objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2D {
    /// The draft origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Point at `(x, y)`.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<Point2> for Point2D {
    fn from(p: Point2) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point2D> for Point2 {
    fn from(p: Point2D) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point2D {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Axis-aligned extent of a draft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2D {
    /// Lower corner.
    pub min: Point2D,
    /// Upper corner.
    pub max: Point2D,
}

impl BoundingBox2D {
    /// A box that contains nothing; the first [`extend`](Self::extend) sets both corners.
    pub fn empty() -> Self {
        Self {
            min: Point2D::new(f64::INFINITY, f64::INFINITY),
            max: Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box holding every point.
    pub fn from_points(points: impl IntoIterator<Item = Point2D>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.extend(p);
        }
        bounds
    }

    /// Grow to contain `p`.
    pub fn extend(&mut self, p: Point2D) {
        self.min = Point2D::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point2D::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    /// True until a point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// The box grown by `margin` on every side.
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min: Point2D::new(self.min.x - margin, self.min.y - margin),
            max: Point2D::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point2D {
        Point2D::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
        )
    }
}

impl Default for BoundingBox2D {
    fn default() -> Self {
        Self::empty()
    }
}

/// Direction of the y axis in draft space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// y grows toward the hem (bodices, skirts).
    #[default]
    YDown,
    /// y grows toward the cap (sleeves).
    YUp,
}

/// Stroke class of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stroke {
    /// Outline and seam lines.
    #[default]
    Solid,
    /// Guides and construction lines.
    Dashed,
}

/// One segment of a drawn path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point2D,
        /// End point.
        end: Point2D,
    },
    /// Cubic Bezier segment.
    Cubic {
        /// Start anchor.
        start: Point2D,
        /// Start handle.
        c1: Point2D,
        /// End handle.
        c2: Point2D,
        /// End anchor.
        end: Point2D,
    },
}

impl PathSegment {
    /// Start anchor.
    pub fn start(&self) -> Point2D {
        match self {
            PathSegment::Line { start, .. } | PathSegment::Cubic { start, .. } => *start,
        }
    }

    /// End anchor.
    pub fn end(&self) -> Point2D {
        match self {
            PathSegment::Line { end, .. } | PathSegment::Cubic { end, .. } => *end,
        }
    }
}

impl From<CurveSegment> for PathSegment {
    fn from(seg: CurveSegment) -> Self {
        match seg {
            CurveSegment::Line { start, end } => PathSegment::Line {
                start: start.into(),
                end: end.into(),
            },
            CurveSegment::Cubic(c) => c.into(),
        }
    }
}

impl From<CubicBezier> for PathSegment {
    fn from(c: CubicBezier) -> Self {
        PathSegment::Cubic {
            start: c.p0.into(),
            c1: c.p1.into(),
            c2: c.p2.into(),
            end: c.p3.into(),
        }
    }
}

impl From<PathSegment> for CurveSegment {
    fn from(seg: PathSegment) -> Self {
        match seg {
            PathSegment::Line { start, end } => CurveSegment::line(start.into(), end.into()),
            PathSegment::Cubic { start, c1, c2, end } => {
                CurveSegment::cubic(start.into(), c1.into(), c2.into(), end.into())
            }
        }
    }
}

/// A named path of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPath {
    /// Stable name; drawing a path with the same name replaces it.
    pub name: String,
    /// Stroke class.
    pub stroke: Stroke,
    /// Whether the last anchor connects back to the first.
    pub closed: bool,
    /// Segments in drawing order.
    pub segments: Vec<PathSegment>,
}

impl DraftPath {
    /// Segments as kernel curve segments.
    pub fn curve_segments(&self) -> Vec<CurveSegment> {
        self.segments.iter().map(|s| CurveSegment::from(*s)).collect()
    }

    /// Total length of the path.
    pub fn length(&self) -> f64 {
        tailor_kernel_curve::path_length(&self.curve_segments())
    }
}

/// A notch tick on a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notch {
    /// Notch name.
    pub name: String,
    /// Path the notch sits on.
    pub path: String,
    /// Tick center.
    pub center: Point2D,
    /// Unit normal of the path at the center.
    pub normal: Point2D,
}

/// A labelled construction point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    /// Point label, such as `"17a"`.
    pub label: String,
    /// Position in cm.
    pub point: Point2D,
}

/// A step that produced nothing, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStep {
    /// Step name.
    pub step: String,
    /// Reason the step stopped.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut b = BoundingBox2D::empty();
        assert!(b.is_empty());
        b.extend(Point2D::new(-2.0, 1.0));
        b.extend(Point2D::new(4.0, 5.0));
        assert!(!b.is_empty());
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 4.0);
        assert_eq!(b.center(), Point2D::new(1.0, 3.0));
        assert_eq!(b.padded(1.0).width(), 8.0);
        assert_eq!(
            BoundingBox2D::from_points([Point2D::new(-2.0, 1.0), Point2D::new(4.0, 5.0)]),
            b
        );
        assert_eq!(Point2D::ORIGIN.distance(&Point2D::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_segment_conversion() {
        let seg = CurveSegment::cubic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(3.0, 2.0),
            Point2::new(4.0, 0.0),
        );
        let drawn = PathSegment::from(seg);
        assert_eq!(drawn.start(), Point2D::ORIGIN);
        assert_eq!(drawn.end(), Point2D::new(4.0, 0.0));
        assert_eq!(CurveSegment::from(drawn), seg);
    }

    #[test]
    fn test_path_segment_json_is_tagged() {
        let seg = PathSegment::Line {
            start: Point2D::ORIGIN,
            end: Point2D::new(1.0, 0.0),
        };
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains("\"kind\":\"line\""));
    }
}
