//! Rendering surface for finished drafts.

use crate::context::DraftContext;
use crate::types::{PathSegment, Point2D, Stroke};

/// A surface that receives draw calls in cm.
///
/// Names are stable between runs, so a target that keeps state can
/// replace geometry by name instead of accumulating it.
pub trait RenderTarget {
    /// Draw a straight segment.
    fn draw_line(&mut self, a: Point2D, b: Point2D, name: &str, stroke: Stroke);

    /// Draw a cubic Bezier segment.
    fn draw_curve(
        &mut self,
        start: Point2D,
        c1: Point2D,
        c2: Point2D,
        end: Point2D,
        name: &str,
        stroke: Stroke,
    );

    /// Place a numbered marker.
    fn place_marker(&mut self, point: Point2D, label: &str);

    /// Draw a notch tick centered on `center` along `normal`.
    fn draw_notch(&mut self, center: Point2D, normal: Point2D, name: &str);

    /// Called once per path before its segments. Targets that group
    /// segments into one element can start a new element here.
    fn begin_path(&mut self, _name: &str, _stroke: Stroke, _closed: bool) {}

    /// Called once per path after its segments.
    fn end_path(&mut self, _name: &str) {}
}

/// Replay a draft onto a target: paths, then notches, then markers.
pub fn render(ctx: &DraftContext, target: &mut dyn RenderTarget) {
    for path in ctx.paths() {
        target.begin_path(&path.name, path.stroke, path.closed);
        for seg in &path.segments {
            match *seg {
                PathSegment::Line { start, end } => {
                    target.draw_line(start, end, &path.name, path.stroke)
                }
                PathSegment::Cubic { start, c1, c2, end } => {
                    target.draw_curve(start, c1, c2, end, &path.name, path.stroke)
                }
            }
        }
        if path.closed {
            if let (Some(first), Some(last)) = (path.segments.first(), path.segments.last()) {
                if first.start() != last.end() {
                    target.draw_line(last.end(), first.start(), &path.name, path.stroke);
                }
            }
        }
        target.end_path(&path.name);
    }
    for notch in ctx.notches() {
        target.draw_notch(notch.center, notch.normal, &notch.name);
    }
    for (label, point) in ctx.markers() {
        target.place_marker(point, label);
    }
}

/// A target that records every call, for tests and debugging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingTarget {
    /// Recorded calls, one line each.
    pub calls: Vec<String>,
}

impl RecordingTarget {
    /// Number of calls whose text starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl RenderTarget for RecordingTarget {
    fn draw_line(&mut self, a: Point2D, b: Point2D, name: &str, stroke: Stroke) {
        self.calls.push(format!(
            "line {name} {stroke:?} ({:.2}, {:.2}) ({:.2}, {:.2})",
            a.x, a.y, b.x, b.y
        ));
    }

    fn draw_curve(
        &mut self,
        start: Point2D,
        _c1: Point2D,
        _c2: Point2D,
        end: Point2D,
        name: &str,
        stroke: Stroke,
    ) {
        self.calls.push(format!(
            "curve {name} {stroke:?} ({:.2}, {:.2}) ({:.2}, {:.2})",
            start.x, start.y, end.x, end.y
        ));
    }

    fn place_marker(&mut self, point: Point2D, label: &str) {
        self.calls
            .push(format!("marker {label} ({:.2}, {:.2})", point.x, point.y));
    }

    fn draw_notch(&mut self, center: Point2D, _normal: Point2D, name: &str) {
        self.calls
            .push(format!("notch {name} ({:.2}, {:.2})", center.x, center.y));
    }
}
