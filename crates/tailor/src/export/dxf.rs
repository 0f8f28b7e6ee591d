//! DXF export of finished drafts.
//!
//! Writes DXF R12 in centimeters for plotters and pattern CAD tools:
//! - Seam and outline paths (layer "OUTLINE")
//! - Guides and construction lines (layer "GUIDE", dashed)
//! - Notch ticks (layer "NOTCH")
//! - Point markers and labels (layer "MARKER")
//!
//! DXF is y-up, so y-down drafts are mirrored on the way out.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use tailor_draft::{render, DraftContext, Orientation, Point2D, RenderTarget, Stroke};
use tailor_kernel_curve::{CurveSegment, NOTCH_HALF_LENGTH};

use crate::error::{ExportError, Result};
use crate::settings::ExportSettings;

/// Layer of solid paths.
pub const LAYER_OUTLINE: &str = "OUTLINE";
/// Layer of dashed paths.
pub const LAYER_GUIDE: &str = "GUIDE";
/// Layer of notch ticks.
pub const LAYER_NOTCH: &str = "NOTCH";
/// Layer of point markers.
pub const LAYER_MARKER: &str = "MARKER";

#[derive(Debug, Clone, PartialEq)]
enum Entity {
    Line {
        start: Point2D,
        end: Point2D,
        layer: &'static str,
    },
    Polyline {
        points: Vec<Point2D>,
        layer: &'static str,
    },
    Circle {
        center: Point2D,
        radius: f64,
    },
    Text {
        at: Point2D,
        height: f64,
        text: String,
    },
}

fn layer_for(stroke: Stroke) -> &'static str {
    match stroke {
        Stroke::Solid => LAYER_OUTLINE,
        Stroke::Dashed => LAYER_GUIDE,
    }
}

fn group(w: &mut impl Write, code: i32, value: impl Display) -> std::io::Result<()> {
    writeln!(w, "{code}")?;
    writeln!(w, "{value}")
}

fn coords(w: &mut impl Write, p: Point2D) -> std::io::Result<()> {
    group(w, 10, format_args!("{:.6}", p.x))?;
    group(w, 20, format_args!("{:.6}", p.y))
}

/// DXF document builder.
///
/// Collects draw calls as a [`RenderTarget`]. Entities are grouped by the
/// name they were drawn under, and starting a path with a name already in
/// the document replaces the earlier entities.
pub struct DxfDocument {
    settings: ExportSettings,
    flip_y: bool,
    groups: Vec<(String, Vec<Entity>)>,
}

impl DxfDocument {
    /// Create an empty document for a draft with the given axis direction.
    pub fn new(settings: ExportSettings, orientation: Orientation) -> Self {
        Self {
            settings,
            flip_y: orientation == Orientation::YDown,
            groups: Vec::new(),
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
        debug!(
            "dxf: {} entities in {} groups for {}",
            doc.entity_count(),
            doc.groups.len(),
            ctx.variant
        );
        Ok(doc)
    }

    /// Total number of entities.
    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(|(_, e)| e.len()).sum()
    }

    fn map(&self, p: Point2D) -> Point2D {
        if self.flip_y {
            Point2D::new(p.x, 0.0 - p.y)
        } else {
            p
        }
    }

    fn group_mut(&mut self, key: &str) -> &mut Vec<Entity> {
        let index = match self.groups.iter().position(|(k, _)| k == key) {
            Some(i) => i,
            None => {
                self.groups.push((key.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index].1
    }

    fn replace(&mut self, key: &str, entities: Vec<Entity>) {
        *self.group_mut(key) = entities;
    }

    /// Write the document as DXF R12.
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        // Header
        group(writer, 0, "SECTION")?;
        group(writer, 2, "HEADER")?;
        group(writer, 9, "$ACADVER")?;
        group(writer, 1, "AC1009")?; // DXF R12
        group(writer, 9, "$INSUNITS")?;
        group(writer, 70, 5)?; // Centimeters
        group(writer, 0, "ENDSEC")?;

        group(writer, 0, "SECTION")?;
        group(writer, 2, "TABLES")?;
        self.write_linetype_table(writer)?;
        self.write_layer_table(writer)?;
        group(writer, 0, "ENDSEC")?;

        group(writer, 0, "SECTION")?;
        group(writer, 2, "ENTITIES")?;
        for (_, entities) in &self.groups {
            for entity in entities {
                self.write_entity(writer, entity)?;
            }
        }
        group(writer, 0, "ENDSEC")?;

        group(writer, 0, "EOF")?;
        Ok(())
    }

    /// Serialize the document to a string.
    pub fn to_dxf_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Export to a DXF file.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_linetype_table(&self, writer: &mut impl Write) -> std::io::Result<()> {
        group(writer, 0, "TABLE")?;
        group(writer, 2, "LTYPE")?;
        group(writer, 70, 2)?;

        group(writer, 0, "LTYPE")?;
        group(writer, 2, "CONTINUOUS")?;
        group(writer, 70, 0)?;
        group(writer, 3, "Solid line")?;
        group(writer, 72, 65)?;
        group(writer, 73, 0)?;
        group(writer, 40, "0.0")?;

        // DXF dashes are positive, gaps negative.
        let pattern = &self.settings.dash_pattern;
        group(writer, 0, "LTYPE")?;
        group(writer, 2, "DASHED")?;
        group(writer, 70, 0)?;
        group(writer, 3, "Dashed")?;
        group(writer, 72, 65)?;
        group(writer, 73, pattern.len())?;
        group(writer, 40, format_args!("{:.6}", pattern.iter().sum::<f64>()))?;
        for (i, d) in pattern.iter().enumerate() {
            let signed = if i % 2 == 0 { *d } else { -*d };
            group(writer, 49, format_args!("{signed:.6}"))?;
        }

        group(writer, 0, "ENDTAB")
    }

    fn write_layer_table(&self, writer: &mut impl Write) -> std::io::Result<()> {
        const LAYERS: [(&str, i32, &str); 4] = [
            (LAYER_OUTLINE, 7, "CONTINUOUS"),
            (LAYER_GUIDE, 8, "DASHED"),
            (LAYER_NOTCH, 1, "CONTINUOUS"),
            (LAYER_MARKER, 5, "CONTINUOUS"),
        ];
        group(writer, 0, "TABLE")?;
        group(writer, 2, "LAYER")?;
        group(writer, 70, LAYERS.len())?;
        for (name, color, linetype) in LAYERS {
            group(writer, 0, "LAYER")?;
            group(writer, 2, name)?;
            group(writer, 70, 0)?;
            group(writer, 62, color)?;
            group(writer, 6, linetype)?;
        }
        group(writer, 0, "ENDTAB")
    }

    fn write_entity(&self, writer: &mut impl Write, entity: &Entity) -> std::io::Result<()> {
        match entity {
            Entity::Line { start, end, layer } => {
                group(writer, 0, "LINE")?;
                group(writer, 8, layer)?;
                coords(writer, *start)?;
                group(writer, 11, format_args!("{:.6}", end.x))?;
                group(writer, 21, format_args!("{:.6}", end.y))?;
            }
            Entity::Polyline { points, layer } => {
                group(writer, 0, "POLYLINE")?;
                group(writer, 8, layer)?;
                group(writer, 66, 1)?; // Vertices follow
                group(writer, 70, 0)?;
                coords(writer, Point2D::ORIGIN)?;
                for p in points {
                    group(writer, 0, "VERTEX")?;
                    group(writer, 8, layer)?;
                    coords(writer, *p)?;
                }
                group(writer, 0, "SEQEND")?;
                group(writer, 8, layer)?;
            }
            Entity::Circle { center, radius } => {
                group(writer, 0, "CIRCLE")?;
                group(writer, 8, LAYER_MARKER)?;
                coords(writer, *center)?;
                group(writer, 40, format_args!("{radius:.6}"))?;
            }
            Entity::Text { at, height, text } => {
                group(writer, 0, "TEXT")?;
                group(writer, 8, LAYER_MARKER)?;
                coords(writer, *at)?;
                group(writer, 40, format_args!("{height:.6}"))?;
                group(writer, 1, text)?;
            }
        }
        Ok(())
    }
}

impl RenderTarget for DxfDocument {
    fn draw_line(&mut self, a: Point2D, b: Point2D, name: &str, stroke: Stroke) {
        let entity = Entity::Line {
            start: self.map(a),
            end: self.map(b),
            layer: layer_for(stroke),
        };
        self.group_mut(name).push(entity);
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
        let cubic = CurveSegment::cubic(start.into(), c1.into(), c2.into(), end.into());
        let points = cubic
            .flatten(self.settings.flatten_steps)
            .into_iter()
            .map(|p| self.map(p.into()))
            .collect();
        let entity = Entity::Polyline {
            points,
            layer: layer_for(stroke),
        };
        self.group_mut(name).push(entity);
    }

    fn place_marker(&mut self, point: Point2D, label: &str) {
        let p = self.map(point);
        let r = self.settings.marker_radius;
        let mut entities = vec![Entity::Circle {
            center: p,
            radius: r,
        }];
        if self.settings.label_font_size > 0.0 {
            entities.push(Entity::Text {
                at: Point2D::new(p.x + r, p.y + r),
                height: self.settings.label_font_size,
                text: label.to_string(),
            });
        }
        self.replace(&format!("marker:{label}"), entities);
    }

    fn draw_notch(&mut self, center: Point2D, normal: Point2D, name: &str) {
        let c = self.map(center);
        let n = if self.flip_y {
            Point2D::new(normal.x, -normal.y)
        } else {
            normal
        };
        let entity = Entity::Line {
            start: Point2D::new(c.x - n.x * NOTCH_HALF_LENGTH, c.y - n.y * NOTCH_HALF_LENGTH),
            end: Point2D::new(c.x + n.x * NOTCH_HALF_LENGTH, c.y + n.y * NOTCH_HALF_LENGTH),
            layer: LAYER_NOTCH,
        };
        self.replace(&format!("notch:{name}"), vec![entity]);
    }

    fn begin_path(&mut self, name: &str, _stroke: Stroke, _closed: bool) {
        self.replace(name, Vec::new());
    }
}
