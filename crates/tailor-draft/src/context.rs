//! The result of one draft run.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use tailor_kernel_math::Point2;
use tailor_measure::MeasurementSheet;

use crate::error::Result;
use crate::types::{
    BoundingBox2D, DraftPath, NamedPoint, Notch, Orientation, PathSegment, Point2D, SkippedStep,
};

/// Everything a draft produced: points, paths, notches and derived values.
///
/// A context is built fresh by every run. Points keep their construction
/// order, and drawing a path or setting a point under an existing name
/// replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftContext {
    /// Variant name, such as `"casual-bodice"`.
    pub variant: String,
    /// Direction of the y axis.
    pub orientation: Orientation,
    points: Vec<NamedPoint>,
    markers: Vec<String>,
    paths: Vec<DraftPath>,
    notches: Vec<Notch>,
    values: BTreeMap<String, f64>,
    measurements: MeasurementSheet,
    skipped: Vec<SkippedStep>,
}

impl DraftContext {
    /// An empty context.
    pub fn new(variant: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            variant: variant.into(),
            orientation,
            ..Default::default()
        }
    }

    /// Position of a point.
    pub fn point(&self, label: &str) -> Option<Point2> {
        self.points
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.point.into())
    }

    /// Whether a point exists.
    pub fn contains(&self, label: &str) -> bool {
        self.points.iter().any(|p| p.label == label)
    }

    /// Set a point, replacing an existing one with the same label.
    pub fn set_point(&mut self, label: &str, point: Point2) {
        let point = Point2D::from(point);
        match self.points.iter_mut().find(|p| p.label == label) {
            Some(existing) => existing.point = point,
            None => self.points.push(NamedPoint {
                label: label.to_string(),
                point,
            }),
        }
    }

    /// Points in construction order.
    pub fn points(&self) -> &[NamedPoint] {
        &self.points
    }

    /// Request a numbered marker for a point.
    pub fn mark(&mut self, label: &str) {
        if !self.markers.iter().any(|m| m == label) {
            self.markers.push(label.to_string());
        }
    }

    /// Marked points that exist, in marking order.
    pub fn markers(&self) -> impl Iterator<Item = (&str, Point2D)> + '_ {
        self.markers.iter().filter_map(move |label| {
            self.points
                .iter()
                .find(|p| &p.label == label)
                .map(|p| (label.as_str(), p.point))
        })
    }

    /// Add a path, replacing any path with the same name.
    pub fn add_path(&mut self, path: DraftPath) {
        match self.paths.iter_mut().find(|p| p.name == path.name) {
            Some(existing) => *existing = path,
            None => self.paths.push(path),
        }
    }

    /// A path by name.
    pub fn path(&self, name: &str) -> Option<&DraftPath> {
        self.paths.iter().find(|p| p.name == name)
    }

    /// Paths in drawing order.
    pub fn paths(&self) -> &[DraftPath] {
        &self.paths
    }

    /// Add a notch, replacing any notch with the same name.
    pub fn add_notch(&mut self, notch: Notch) {
        match self.notches.iter_mut().find(|n| n.name == notch.name) {
            Some(existing) => *existing = notch,
            None => self.notches.push(notch),
        }
    }

    /// Notches in placement order.
    pub fn notches(&self) -> &[Notch] {
        &self.notches
    }

    /// Record a derived scalar. Non-finite values are dropped.
    pub fn set_value(&mut self, key: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(key.to_string(), value);
        }
    }

    /// A derived scalar.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// All derived scalars.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Store the measurement snapshot the draft was built from.
    pub fn set_measurements(&mut self, sheet: MeasurementSheet) {
        self.measurements = sheet;
    }

    /// Measurement snapshot.
    pub fn measurements(&self) -> &MeasurementSheet {
        &self.measurements
    }

    /// Record a step that produced nothing.
    pub fn skip(&mut self, step: &str, reason: impl Into<String>) {
        let reason = reason.into();
        debug!("{}: skipped '{step}': {reason}", self.variant);
        self.skipped.push(SkippedStep {
            step: step.to_string(),
            reason,
        });
    }

    /// Skipped steps in run order.
    pub fn skipped(&self) -> &[SkippedStep] {
        &self.skipped
    }

    /// Bounds of every point and path anchor or handle.
    pub fn bounds(&self) -> BoundingBox2D {
        let mut bounds = BoundingBox2D::empty();
        for p in &self.points {
            bounds.extend(p.point);
        }
        for path in &self.paths {
            for seg in &path.segments {
                match *seg {
                    PathSegment::Line { start, end } => {
                        bounds.extend(start);
                        bounds.extend(end);
                    }
                    PathSegment::Cubic { start, c1, c2, end } => {
                        for p in [start, c1, c2, end] {
                            bounds.extend(p);
                        }
                    }
                }
            }
        }
        bounds
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a context written by [`DraftContext::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stroke;

    fn line(name: &str, x: f64) -> DraftPath {
        DraftPath {
            name: name.to_string(),
            stroke: Stroke::Solid,
            closed: false,
            segments: vec![PathSegment::Line {
                start: Point2D::ORIGIN,
                end: Point2D::new(x, 0.0),
            }],
        }
    }

    #[test]
    fn test_points_replace_in_place() {
        let mut ctx = DraftContext::new("test", Orientation::YDown);
        ctx.set_point("1", Point2::new(0.0, 0.0));
        ctx.set_point("2", Point2::new(0.0, 3.0));
        ctx.set_point("1", Point2::new(1.0, 1.0));
        let labels: Vec<_> = ctx.points().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["1", "2"]);
        assert_eq!(ctx.point("1"), Some(Point2::new(1.0, 1.0)));
        assert_eq!(ctx.point("3"), None);
    }

    #[test]
    fn test_paths_replace_by_name() {
        let mut ctx = DraftContext::new("test", Orientation::YDown);
        ctx.add_path(line("Hem Line", 1.0));
        ctx.add_path(line("Waist Line", 2.0));
        ctx.add_path(line("Hem Line", 3.0));
        assert_eq!(ctx.paths().len(), 2);
        assert_eq!(ctx.path("Hem Line").map(|p| p.length()), Some(3.0));
    }

    #[test]
    fn test_markers_skip_missing_points() {
        let mut ctx = DraftContext::new("test", Orientation::YDown);
        ctx.set_point("1", Point2::new(0.0, 0.0));
        ctx.mark("1");
        ctx.mark("1");
        ctx.mark("16");
        let markers: Vec<_> = ctx.markers().collect();
        assert_eq!(markers, [("1", Point2D::ORIGIN)]);
    }

    #[test]
    fn test_values_drop_non_finite() {
        let mut ctx = DraftContext::new("test", Orientation::YDown);
        ctx.set_value("hiw", 51.0);
        ctx.set_value("broken", f64::NAN);
        assert_eq!(ctx.value("hiw"), Some(51.0));
        assert_eq!(ctx.value("broken"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut ctx = DraftContext::new("test", Orientation::YUp);
        ctx.set_point("4", Point2::new(2.5, 12.0));
        ctx.mark("4");
        ctx.add_path(line("Cap Line", 30.0));
        ctx.skip("elbow", "missing point 6");
        let json = ctx.to_json().unwrap();
        let back = DraftContext::from_json(&json).unwrap();
        assert_eq!(back, ctx);
        assert_eq!(back.skipped()[0].step, "elbow");
    }

    #[test]
    fn test_bounds_include_handles() {
        let mut ctx = DraftContext::new("test", Orientation::YDown);
        ctx.add_path(DraftPath {
            name: "Curve".to_string(),
            stroke: Stroke::Solid,
            closed: false,
            segments: vec![PathSegment::Cubic {
                start: Point2D::ORIGIN,
                c1: Point2D::new(1.0, -2.0),
                c2: Point2D::new(3.0, -2.0),
                end: Point2D::new(4.0, 0.0),
            }],
        });
        let b = ctx.bounds();
        assert_eq!(b.min.y, -2.0);
        assert_eq!(b.max.x, 4.0);
    }
}
