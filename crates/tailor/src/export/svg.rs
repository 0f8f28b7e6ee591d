//! SVG export of finished drafts.
//!
//! Coordinates stay in cm; the root element carries a viewBox over the
//! draft bounds plus a margin and a physical size in cm, so the file
//! prints at 1:1. Sleeves are drafted y-up and are flipped on the way out.

use std::path::Path as FsPath;

use log::debug;
use ::svg::node::element::path::Data;
use ::svg::node::element::{Circle, Group, Line, Path, Text};
use ::svg::Document;
use tailor_draft::{
    render, BoundingBox2D, DraftContext, Orientation, PathSegment, Point2D, RenderTarget, Stroke,
};
use tailor_kernel_curve::NOTCH_HALF_LENGTH;

use crate::error::{ExportError, Result};
use crate::settings::ExportSettings;

struct PendingPath {
    name: String,
    stroke: Stroke,
    closed: bool,
    segments: Vec<PathSegment>,
}

/// SVG document builder.
///
/// Collects draw calls as a [`RenderTarget`]. Paths, notches and markers are
/// keyed by name, so drawing the same name twice replaces the first one.
pub struct SvgDocument {
    settings: ExportSettings,
    flip_y: bool,
    paths: Vec<(String, Path)>,
    notches: Vec<(String, Line)>,
    markers: Vec<(String, Group)>,
    current: Option<PendingPath>,
    bounds: BoundingBox2D,
}

fn num(v: f64) -> f32 {
    v as f32
}

fn upsert<T>(items: &mut Vec<(String, T)>, name: &str, item: T) {
    match items.iter_mut().find(|(n, _)| n == name) {
        Some(slot) => slot.1 = item,
        None => items.push((name.to_string(), item)),
    }
}

impl SvgDocument {
    /// Create an empty document for a draft with the given axis direction.
    pub fn new(settings: ExportSettings, orientation: Orientation) -> Self {
        Self {
            settings,
            flip_y: orientation == Orientation::YUp,
            paths: Vec::new(),
            notches: Vec::new(),
            markers: Vec::new(),
            current: None,
            bounds: BoundingBox2D::empty(),
        }
    }

    /// Render a whole draft.
    pub fn from_draft(ctx: &DraftContext, settings: &ExportSettings) -> Result<Self> {
        settings.validate()?;
        if ctx.paths().is_empty() && ctx.markers().next().is_none() {
            return Err(ExportError::EmptyDraft(ctx.variant.clone()));
        }
        let mut doc = Self::new(settings.clone(), ctx.orientation);
        render(ctx, &mut doc);
        doc.flush();
        debug!(
            "svg: {} paths, {} notches, {} markers for {}",
            doc.paths.len(),
            doc.notches.len(),
            doc.markers.len(),
            ctx.variant
        );
        Ok(doc)
    }

    /// Number of distinct paths drawn so far.
    pub fn path_count(&self) -> usize {
        self.paths.len() + usize::from(self.current.is_some())
    }

    /// Bounds of everything drawn, in output coordinates.
    pub fn bounds(&self) -> BoundingBox2D {
        self.bounds
    }

    fn map(&self, p: Point2D) -> Point2D {
        if self.flip_y {
            Point2D::new(p.x, 0.0 - p.y)
        } else {
            p
        }
    }

    fn include(&mut self, p: Point2D) {
        self.bounds.extend(p);
    }

    fn flush(&mut self) {
        if let Some(pending) = self.current.take() {
            if let Some(path) = self.build_path(&pending) {
                upsert(&mut self.paths, &pending.name, path);
            }
        }
    }

    fn build_path(&self, pending: &PendingPath) -> Option<Path> {
        let first = pending.segments.first()?;
        let start = first.start();
        let mut data = Data::new().move_to((num(start.x), num(start.y)));
        let mut cursor = start;
        for seg in &pending.segments {
            if seg.start() != cursor {
                data = data.move_to((num(seg.start().x), num(seg.start().y)));
            }
            data = match *seg {
                PathSegment::Line { end, .. } => data.line_to((num(end.x), num(end.y))),
                PathSegment::Cubic { c1, c2, end, .. } => data.cubic_curve_to(vec![
                    num(c1.x),
                    num(c1.y),
                    num(c2.x),
                    num(c2.y),
                    num(end.x),
                    num(end.y),
                ]),
            };
            cursor = seg.end();
        }
        if pending.closed {
            data = data.close();
        }

        let mut path = Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", num(self.settings.stroke_width))
            .set("data-name", pending.name.as_str());
        if pending.stroke == Stroke::Dashed && !self.settings.dash_pattern.is_empty() {
            path = path.set("stroke-dasharray", self.settings.dash_array());
        }
        Some(path)
    }

    fn push_segment(&mut self, seg: PathSegment, name: &str, stroke: Stroke) {
        let open = matches!(&self.current, Some(p) if p.name == name);
        if !open {
            self.flush();
            self.current = Some(PendingPath {
                name: name.to_string(),
                stroke,
                closed: false,
                segments: Vec::new(),
            });
        }
        match seg {
            PathSegment::Line { start, end } => {
                self.include(start);
                self.include(end);
            }
            PathSegment::Cubic { start, c1, c2, end } => {
                for p in [start, c1, c2, end] {
                    self.include(p);
                }
            }
        }
        if let Some(pending) = self.current.as_mut() {
            pending.segments.push(seg);
        }
    }

    /// Build the SVG document.
    pub fn document(&self) -> Document {
        let view = if self.bounds.is_empty() {
            BoundingBox2D::from_points([Point2D::ORIGIN])
        } else {
            self.bounds
        }
        .padded(self.settings.margin);
        let mut doc = Document::new()
            .set(
                "viewBox",
                (
                    num(view.min.x),
                    num(view.min.y),
                    num(view.width()),
                    num(view.height()),
                ),
            )
            .set("width", format!("{}cm", num(view.width())))
            .set("height", format!("{}cm", num(view.height())));

        for (_, path) in &self.paths {
            doc = doc.add(path.clone());
        }
        if let Some(path) = self.current.as_ref().and_then(|p| self.build_path(p)) {
            doc = doc.add(path);
        }
        for (_, line) in &self.notches {
            doc = doc.add(line.clone());
        }
        for (_, marker) in &self.markers {
            doc = doc.add(marker.clone());
        }
        doc
    }

    /// Serialize the document to a string.
    pub fn to_svg_string(&self) -> String {
        self.document().to_string()
    }

    /// Write the document to `path`.
    pub fn save(&self, path: impl AsRef<FsPath>) -> Result<()> {
        ::svg::save(path, &self.document())?;
        Ok(())
    }
}

impl RenderTarget for SvgDocument {
    fn draw_line(&mut self, a: Point2D, b: Point2D, name: &str, stroke: Stroke) {
        let seg = PathSegment::Line {
            start: self.map(a),
            end: self.map(b),
        };
        self.push_segment(seg, name, stroke);
    }

    fn draw_curve(
        &mut self,
        start: Point2D,
        c1: Point2D,
        c2: Point2D,
        end: Point2D,
        name: &str,
        stroke: Stroke,
    ) {
        let seg = PathSegment::Cubic {
            start: self.map(start),
            c1: self.map(c1),
            c2: self.map(c2),
            end: self.map(end),
        };
        self.push_segment(seg, name, stroke);
    }

    fn place_marker(&mut self, point: Point2D, label: &str) {
        let p = self.map(point);
        let r = self.settings.marker_radius;
        self.include(p);
        let mut group = Group::new().set("data-name", label).add(
            Circle::new()
                .set("cx", num(p.x))
                .set("cy", num(p.y))
                .set("r", num(r))
                .set("fill", "black"),
        );
        if self.settings.label_font_size > 0.0 {
            group = group.add(
                Text::new(label)
                    .set("x", num(p.x + r))
                    .set("y", num(p.y - r))
                    .set("font-size", num(self.settings.label_font_size))
                    .set("font-family", "sans-serif"),
            );
        }
        upsert(&mut self.markers, label, group);
    }

    fn draw_notch(&mut self, center: Point2D, normal: Point2D, name: &str) {
        let c = self.map(center);
        let n = if self.flip_y {
            Point2D::new(normal.x, -normal.y)
        } else {
            normal
        };
        let a = Point2D::new(c.x - n.x * NOTCH_HALF_LENGTH, c.y - n.y * NOTCH_HALF_LENGTH);
        let b = Point2D::new(c.x + n.x * NOTCH_HALF_LENGTH, c.y + n.y * NOTCH_HALF_LENGTH);
        self.include(a);
        self.include(b);
        let line = Line::new()
            .set("x1", num(a.x))
            .set("y1", num(a.y))
            .set("x2", num(b.x))
            .set("y2", num(b.y))
            .set("stroke", "black")
            .set("stroke-width", num(self.settings.stroke_width))
            .set("data-name", name);
        upsert(&mut self.notches, name, line);
    }

    fn begin_path(&mut self, name: &str, stroke: Stroke, closed: bool) {
        self.flush();
        self.current = Some(PendingPath {
            name: name.to_string(),
            stroke,
            closed,
            segments: Vec::new(),
        });
    }

    fn end_path(&mut self, _name: &str) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailor_draft::{DraftPath, DraftSettings, Garment};
    use tailor_kernel_math::Point2;
    use tailor_measure::HeadlessInput;

    fn wedge(orientation: Orientation) -> DraftContext {
        let mut ctx = DraftContext::new("wedge", orientation);
        ctx.set_point("1", Point2::new(0.0, 0.0));
        ctx.mark("1");
        ctx.add_path(DraftPath {
            name: "Wedge".into(),
            stroke: Stroke::Solid,
            closed: false,
            segments: vec![PathSegment::Line {
                start: Point2D::ORIGIN,
                end: Point2D::new(2.0, 3.0),
            }],
        });
        ctx
    }

    #[test]
    fn test_y_up_is_flipped() {
        let settings = ExportSettings::default();
        let up = SvgDocument::from_draft(&wedge(Orientation::YUp), &settings).unwrap();
        assert_eq!(up.bounds().min.y, -3.0);
        assert_eq!(up.bounds().max.y, 0.0);

        let down = SvgDocument::from_draft(&wedge(Orientation::YDown), &settings).unwrap();
        assert_eq!(down.bounds().min.y, 0.0);
        assert_eq!(down.bounds().max.y, 3.0);
    }

    #[test]
    fn test_same_name_replaces() {
        let mut doc = SvgDocument::new(ExportSettings::default(), Orientation::YDown);
        for x in [1.0, 2.0] {
            doc.begin_path("Hem Line", Stroke::Solid, false);
            doc.draw_line(Point2D::ORIGIN, Point2D::new(x, 0.0), "Hem Line", Stroke::Solid);
            doc.end_path("Hem Line");
        }
        doc.place_marker(Point2D::ORIGIN, "1");
        doc.place_marker(Point2D::new(1.0, 1.0), "1");
        assert_eq!(doc.path_count(), 1);
        let text = doc.to_svg_string();
        assert_eq!(text.matches("<path").count(), 1);
        assert_eq!(text.matches("<circle").count(), 1);
    }

    #[test]
    fn test_loose_draw_calls_group_by_name() {
        let mut doc = SvgDocument::new(ExportSettings::default(), Orientation::YDown);
        doc.draw_line(Point2D::ORIGIN, Point2D::new(1.0, 0.0), "A", Stroke::Solid);
        doc.draw_line(Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0), "A", Stroke::Solid);
        doc.draw_line(Point2D::ORIGIN, Point2D::new(0.0, 1.0), "B", Stroke::Dashed);
        assert_eq!(doc.path_count(), 2);
        let text = doc.to_svg_string();
        assert_eq!(text.matches("<path").count(), 2);
        assert_eq!(text.matches("stroke-dasharray").count(), 1);
    }

    #[test]
    fn test_sleeve_document() {
        let ctx = Garment::TightSleeve
            .draft(&HeadlessInput::new(), &DraftSettings::default())
            .unwrap();
        let doc = SvgDocument::from_draft(&ctx, &ExportSettings::default()).unwrap();
        let text = doc.to_svg_string();
        assert_eq!(text.matches("<path").count(), ctx.paths().len());
        let dashed = ctx
            .paths()
            .iter()
            .filter(|p| p.stroke == Stroke::Dashed)
            .count();
        assert_eq!(text.matches("stroke-dasharray").count(), dashed);
        assert_eq!(text.matches("<circle").count(), ctx.markers().count());
        assert!(text.contains("viewBox"));
        assert!(!doc.bounds().is_empty());
    }

    #[test]
    fn test_empty_draft_is_rejected() {
        let ctx = DraftContext::new("nothing", Orientation::YDown);
        assert!(matches!(
            SvgDocument::from_draft(&ctx, &ExportSettings::default()),
            Err(ExportError::EmptyDraft(_))
        ));
    }
}
