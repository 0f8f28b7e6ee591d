#![warn(missing_docs)]

//! Math types for the tailor drafting kernel.
//!
//! Thin wrappers around nalgebra providing the 2D types used by every
//! drafting construction: points, vectors, rigid transforms, angle
//! helpers and tolerance constants. All lengths are centimeters.

use nalgebra::{Matrix3, Vector2, Vector3};
use std::f64::consts::PI;

/// A point in 2D draft space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D draft space.
pub type Vec2 = Vector2<f64>;

/// A 3x3 homogeneous transform of the drafting plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2 {
    /// The underlying 3x3 matrix.
    pub matrix: Matrix3<f64>,
}

impl Transform2 {
    /// The transform that moves nothing.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Translation by `(dx, dy)`.
    pub fn translation(dx: f64, dy: f64) -> Self {
        let mut m = Matrix3::identity();
        m[(0, 2)] = dx;
        m[(1, 2)] = dy;
        Self { matrix: m }
    }

    /// Counter-clockwise rotation about the origin by `angle` radians.
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation by `angle` radians about `pivot`.
    pub fn rotation_about(pivot: &Point2, angle: f64) -> Self {
        Self::translation(pivot.x, pivot.y)
            .then(&Self::rotation(angle))
            .then(&Self::translation(-pivot.x, -pivot.y))
    }

    /// Mirror across the x axis (`y -> -y`).
    pub fn flip_y() -> Self {
        let mut m = Matrix3::identity();
        m[(1, 1)] = -1.0;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform2) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point through the transform.
    pub fn apply_point(&self, p: &Point2) -> Point2 {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec2) -> Vec2 {
        let r = self.matrix * Vector3::new(v.x, v.y, 0.0);
        Vec2::new(r.x, r.y)
    }

    /// Undo this transform; `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Comparison slack for drafted geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Distance slack in cm.
    pub linear: f64,
    /// Angle slack in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default drafting tolerances (1e-6 cm linear, 1e-6 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-6,
    };

    /// Whether `a` and `b` are the same point.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        nalgebra::distance(a, b) < self.linear
    }

    /// Whether a length is too small to matter.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Whether two angles in radians match.
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Round to two decimals, the precision of every tape measurement.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Wrap an angle into `[-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Polar angle of `p` around `center`.
pub fn polar_angle(center: &Point2, p: &Point2) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// Unit vector along `v`, or `None` when `v` has no usable length.
pub fn unit(v: &Vec2) -> Option<Vec2> {
    let len = v.norm();
    if len > Tolerance::DEFAULT.linear {
        Some(v / len)
    } else {
        None
    }
}

/// Left-hand normal of `v` (`(-y, x)`).
pub fn perp(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Midpoint of two points.
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    nalgebra::center(a, b)
}

/// Linear interpolation `a + (b - a) * t`.
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let t = Transform2::identity();
        let p = Point2::new(1.0, 2.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform2::translation(10.0, 20.0);
        let result = t.apply_point(&Point2::new(1.0, 2.0));
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_90() {
        let t = Transform2::rotation(FRAC_PI_2);
        let result = t.apply_point(&Point2::new(1.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_about_pivot_keeps_pivot() {
        let pivot = Point2::new(3.0, -2.0);
        let t = Transform2::rotation_about(&pivot, 1.234);
        let fixed = t.apply_point(&pivot);
        assert!((fixed - pivot).norm() < 1e-12);

        let p = Point2::new(5.0, -2.0);
        let r = t.apply_point(&p);
        assert_relative_eq!((r - pivot).norm(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(polar_angle(&pivot, &r), 1.234, epsilon = 1e-12);
    }

    #[test]
    fn test_flip_and_vec() {
        let t = Transform2::translation(5.0, 5.0).then(&Transform2::flip_y());
        let v = t.apply_vec(&Vec2::new(1.0, 2.0));
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, -2.0);
        let p = t.apply_point(&Point2::new(1.0, 2.0));
        assert_relative_eq!(p.y, 3.0);
    }

    #[test]
    fn test_inverse() {
        let t = Transform2::rotation_about(&Point2::new(1.0, 2.0), 0.7);
        let inv = t.inverse().unwrap();
        let p = Point2::new(5.0, 6.0);
        let result = t.then(&inv).apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(3.0 * PI / 2.0), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-3.0 * PI / 2.0), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(21.4), 21.4);
        assert_eq!(round2(20.1 + 1.3), 21.4);
        assert_eq!(round2(1.005 * 1000.0), 1005.0);
    }

    #[test]
    fn test_unit_degenerate() {
        assert!(unit(&Vec2::zeros()).is_none());
        let u = unit(&Vec2::new(3.0, 4.0)).unwrap();
        assert_relative_eq!(u.norm(), 1.0);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        assert!(tol.points_equal(&a, &Point2::new(1.0 + 1e-7, 2.0)));
        assert!(!tol.points_equal(&a, &Point2::new(1.001, 2.0)));
    }
}
