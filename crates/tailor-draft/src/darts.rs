//! Dart tools over drafted paths.
//!
//! These work on a finished [`DraftContext`] the way a cutter works on a
//! paper block: fold a dart closed to true its legs against the seam,
//! copy one line's length onto another, or lay out a new dart on a base
//! line. Every tool reads paths and returns new geometry. Nothing is
//! written back until the caller adds the returned paths.

use log::debug;
use serde::{Deserialize, Serialize};
use tailor_kernel_geom::{
    line_intersection, perpendicular_foot_clamped, rotate_about, rotation_between,
};
use tailor_kernel_math::{midpoint, perp, unit, Point2, Vec2};

use crate::context::DraftContext;
use crate::error::{DraftError, Result};
use crate::types::{DraftPath, Orientation, PathSegment, Stroke};

/// Leg ends closer than this are one apex (cm).
pub const APEX_TOLERANCE: f64 = 0.01;

/// Open ends this close along the fold direction leave the choice of fixed leg to the seams.
const FOLD_AXIS_TOLERANCE: f64 = 0.5;

/// Seam distances this close are a tie.
const SEAM_TIE: f64 = 0.01;

/// Shortest base line a dart can sit on: one typographic point, in cm.
const MIN_BASE: f64 = 2.54 / 72.0;

/// A direction on the printed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageDirection {
    /// Toward the top of the page.
    #[default]
    Up,
    /// Toward the bottom of the page.
    Down,
    /// Toward the left edge.
    Left,
    /// Toward the right edge.
    Right,
}

impl PageDirection {
    /// Unit vector in draft space.
    pub fn vector(self, orientation: Orientation) -> Vec2 {
        let up = match orientation {
            Orientation::YDown => -1.0,
            Orientation::YUp => 1.0,
        };
        match self {
            PageDirection::Up => Vec2::new(0.0, up),
            PageDirection::Down => Vec2::new(0.0, -up),
            PageDirection::Left => Vec2::new(-1.0, 0.0),
            PageDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}

fn straight(name: &str, stroke: Stroke, points: &[Point2], closed: bool) -> DraftPath {
    DraftPath {
        name: name.to_string(),
        stroke,
        closed,
        segments: points
            .windows(2)
            .map(|w| PathSegment::Line {
                start: w[0].into(),
                end: w[1].into(),
            })
            .collect(),
    }
}

/// End points of a path drawn as one straight segment.
pub fn line_ends(ctx: &DraftContext, name: &str) -> Result<(Point2, Point2)> {
    let path = ctx
        .path(name)
        .ok_or_else(|| DraftError::MissingPath(name.to_string()))?;
    match path.segments.as_slice() {
        [PathSegment::Line { start, end }] => Ok(((*start).into(), (*end).into())),
        _ => Err(DraftError::NotALine(name.to_string())),
    }
}

// =============================================================================
// Folding
// =============================================================================

/// Two dart legs meeting at an apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DartLegs {
    /// Shared end.
    pub apex: Point2,
    /// Open end of the first leg.
    pub first_open: Point2,
    /// Open end of the second leg.
    pub second_open: Point2,
}

/// The apex two legs share, if any pair of their ends lies within `tolerance`.
pub fn common_apex(
    first: (Point2, Point2),
    second: (Point2, Point2),
    tolerance: f64,
) -> Option<DartLegs> {
    let a = [first.0, first.1];
    let b = [second.0, second.1];
    for i in 0..2 {
        for j in 0..2 {
            if (a[i] - b[j]).norm() <= tolerance {
                return Some(DartLegs {
                    apex: a[i],
                    first_open: a[1 - i],
                    second_open: b[1 - j],
                });
            }
        }
    }
    None
}

/// Closest solid segment to a point.
#[derive(Debug, Clone, PartialEq)]
pub struct SeamHit {
    /// Path the segment belongs to.
    pub path: String,
    /// Closest point on the segment.
    pub point: Point2,
    /// Segment start.
    pub start: Point2,
    /// Segment end.
    pub end: Point2,
    /// Distance from the reference point.
    pub distance: f64,
}

/// Anchor-to-anchor chords of a path. Curves count by their chord.
fn chords(path: &DraftPath) -> Vec<(Point2, Point2)> {
    let mut chords: Vec<(Point2, Point2)> = path
        .segments
        .iter()
        .map(|s| (s.start().into(), s.end().into()))
        .collect();
    if path.closed {
        if let (Some(first), Some(last)) = (path.segments.first(), path.segments.last()) {
            chords.push((last.end().into(), first.start().into()));
        }
    }
    chords
}

/// The solid path segment nearest to `reference`, ignoring the paths in `skip`.
pub fn nearest_seam(ctx: &DraftContext, reference: &Point2, skip: &[&str]) -> Option<SeamHit> {
    let mut best: Option<SeamHit> = None;
    for path in ctx.paths() {
        if path.stroke == Stroke::Dashed || skip.contains(&path.name.as_str()) {
            continue;
        }
        for (start, end) in chords(path) {
            let point = perpendicular_foot_clamped(reference, &start, &end).unwrap_or(start);
            let distance = (point - reference).norm();
            if best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(SeamHit {
                    path: path.name.clone(),
                    point,
                    start,
                    end,
                    distance,
                });
            }
        }
    }
    best
}

/// A dart folded closed and trued against its seam.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedDart {
    /// Leg that stays put.
    pub fixed_leg: String,
    /// Leg that swings onto the fixed one.
    pub rotating_leg: String,
    /// Shared apex.
    pub apex: Point2,
    /// Open end of the fixed leg.
    pub fixed_open: Point2,
    /// Fold peak: where the folded intake meets the seam, laid back open.
    pub center: Point2,
    /// Open end of the rotating leg, moved along the leg so the closed
    /// dart lands on the seam.
    pub rotating_open: Point2,
    /// Seam the fold was trued against.
    pub seam: SeamHit,
}

impl FoldedDart {
    /// Apex, fixed open end, fold peak and rotating open end.
    pub fn outline(&self) -> [Point2; 4] {
        [self.apex, self.fixed_open, self.center, self.rotating_open]
    }

    /// The fold as one closed solid path.
    pub fn path(&self, name: &str) -> DraftPath {
        straight(name, Stroke::Solid, &self.outline(), true)
    }

    /// Dashed line from the apex to the fold peak.
    pub fn center_line(&self, name: &str) -> DraftPath {
        straight(name, Stroke::Dashed, &[self.apex, self.center], false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixedLeg {
    First,
    Second,
    Nearest,
}

/// The leg farther along `fold` stays put, so the intake presses that way.
fn fixed_leg_for(legs: &DartLegs, fold: PageDirection, orientation: Orientation) -> FixedLeg {
    let v = fold.vector(orientation);
    let a = legs.first_open.coords.dot(&v);
    let b = legs.second_open.coords.dot(&v);
    if (a - b).abs() <= FOLD_AXIS_TOLERANCE {
        FixedLeg::Nearest
    } else if a > b {
        FixedLeg::First
    } else {
        FixedLeg::Second
    }
}

/// Fold the dart between two straight legs closed and true the rotating
/// leg against the seam.
///
/// The legs must share an apex. Without a `fold` direction, or when the
/// open ends sit level along it, the leg nearer a solid seam stays fixed
/// (the first leg on a tie). The rotating leg and the midpoint of the
/// dart opening are swung onto the fixed side, slid along their rays
/// onto the seam line and swung back.
pub fn fold_dart(
    ctx: &DraftContext,
    first: &str,
    second: &str,
    fold: Option<PageDirection>,
) -> Result<FoldedDart> {
    let legs = common_apex(line_ends(ctx, first)?, line_ends(ctx, second)?, APEX_TOLERANCE)
        .ok_or_else(|| DraftError::Dart(format!("'{first}' and '{second}' share no apex")))?;
    let skip = [first, second];
    let seam_first = nearest_seam(ctx, &legs.first_open, &skip);
    let seam_second = nearest_seam(ctx, &legs.second_open, &skip);

    let choice = fold.map_or(FixedLeg::Nearest, |d| fixed_leg_for(&legs, d, ctx.orientation));
    let second_fixed = match choice {
        FixedLeg::First => false,
        FixedLeg::Second => true,
        FixedLeg::Nearest => match (&seam_first, &seam_second) {
            (Some(a), Some(b)) => b.distance < a.distance - SEAM_TIE,
            (None, Some(_)) => true,
            _ => false,
        },
    };
    let (fixed_leg, rotating_leg, fixed_open, rotating_open, seam) = if second_fixed {
        (second, first, legs.second_open, legs.first_open, seam_second)
    } else {
        (first, second, legs.first_open, legs.second_open, seam_first)
    };
    let seam = seam.ok_or_else(|| DraftError::Dart(format!("no seam near '{fixed_leg}'")))?;

    let apex = legs.apex;
    if (fixed_open - apex).norm() < APEX_TOLERANCE || (rotating_open - apex).norm() < APEX_TOLERANCE
    {
        return Err(DraftError::Dart(format!(
            "'{first}' and '{second}' need open ends away from the apex"
        )));
    }

    let rotation = rotation_between(&apex, &rotating_open, &fixed_open);
    let opening_mid = midpoint(&seam.point, &rotating_open);
    let true_up = |p: &Point2| {
        let closed = rotate_about(p, &apex, rotation);
        let on_seam = line_intersection(&apex, &closed, &seam.start, &seam.end)
            .or_else(|| perpendicular_foot_clamped(&closed, &seam.start, &seam.end))
            .unwrap_or(closed);
        rotate_about(&on_seam, &apex, -rotation)
    };
    let center = true_up(&opening_mid);
    let trued = true_up(&rotating_open);
    debug!(
        "folded '{rotating_leg}' onto '{fixed_leg}' against '{}' ({:.3} rad)",
        seam.path, rotation
    );

    Ok(FoldedDart {
        fixed_leg: fixed_leg.to_string(),
        rotating_leg: rotating_leg.to_string(),
        apex,
        fixed_open,
        center,
        rotating_open: trued,
        seam,
    })
}

// =============================================================================
// Equal lengths
// =============================================================================

/// One end of a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineEnd {
    /// The first anchor.
    Start,
    /// The last anchor.
    End,
}

/// `target` redrawn along its own direction with the length of `reference`.
///
/// `moving` names the end that slides. Left out, the end that does not
/// touch `reference` slides, and the end anchor when neither touches.
/// Returns `None` when both ends of `target` already sit on `reference`'s
/// ends.
pub fn match_line_length(
    ctx: &DraftContext,
    reference: &str,
    target: &str,
    moving: Option<LineEnd>,
) -> Result<Option<DraftPath>> {
    let (rs, re) = line_ends(ctx, reference)?;
    let (ts, te) = line_ends(ctx, target)?;
    let length = (re - rs).norm();
    let (Some(dir), Some(_)) = (unit(&(te - ts)), unit(&(re - rs))) else {
        return Err(DraftError::Dart(format!(
            "'{reference}' and '{target}' need a non-zero length"
        )));
    };

    let moving = match moving {
        Some(end) => end,
        None => {
            let touches =
                |p: &Point2| (p - rs).norm() <= APEX_TOLERANCE || (p - re).norm() <= APEX_TOLERANCE;
            match (touches(&ts), touches(&te)) {
                (true, true) => return Ok(None),
                (false, true) => LineEnd::Start,
                _ => LineEnd::End,
            }
        }
    };
    let (start, end) = match moving {
        LineEnd::End => (ts, ts + dir * length),
        LineEnd::Start => (te - dir * length, te),
    };
    let stroke = ctx.path(target).map_or(Stroke::Solid, |p| p.stroke);
    debug!("'{target}' now matches '{reference}' at {length:.3}");
    Ok(Some(straight(target, stroke, &[start, end], false)))
}

// =============================================================================
// Placing a dart
// =============================================================================

/// Where along its base line a dart sits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DartPosition {
    /// Halfway along the base.
    #[default]
    Center,
    /// Distance of the dart centre from the left end of a horizontal base
    /// or the top end of a vertical one. Negative values measure from the
    /// other end.
    Offset(f64),
}

/// Size, position and direction of a dart to place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DartLayout {
    /// Opening on the base line (cm).
    pub width: f64,
    /// Distance from the base line to the apex (cm).
    pub length: f64,
    /// Where the opening sits.
    pub position: DartPosition,
    /// Side of the base line the apex lies on.
    pub direction: PageDirection,
}

impl Default for DartLayout {
    fn default() -> Self {
        Self {
            width: 2.0,
            length: 10.0,
            position: DartPosition::Center,
            direction: PageDirection::Up,
        }
    }
}

/// A dart laid out on a base line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedDart {
    /// Opening end toward the start of the base.
    pub left: Point2,
    /// Opening end toward the end of the base.
    pub right: Point2,
    /// Apex.
    pub apex: Point2,
    /// Centre of the opening.
    pub center: Point2,
}

impl PlacedDart {
    /// Paths for this dart, see [`dart_paths`].
    pub fn paths(&self, name: &str, join_legs: bool, center_line: bool) -> Vec<DraftPath> {
        dart_paths(
            name,
            self.left,
            self.right,
            self.apex,
            join_legs,
            center_line.then_some(self.center),
        )
    }
}

/// Lay a dart out on the straight line `base`.
///
/// A base running more across than down is read left to right, any other
/// base top to bottom.
pub fn place_dart(
    base: (Point2, Point2),
    layout: &DartLayout,
    orientation: Orientation,
) -> Result<PlacedDart> {
    let (a, b) = base;
    let horizontal = (b.x - a.x).abs() >= (b.y - a.y).abs();
    let up = PageDirection::Up.vector(orientation);
    let (start, end) = if horizontal {
        if a.x <= b.x {
            (a, b)
        } else {
            (b, a)
        }
    } else if a.coords.dot(&up) >= b.coords.dot(&up) {
        (a, b)
    } else {
        (b, a)
    };

    let length = (end - start).norm();
    if length < MIN_BASE {
        return Err(DraftError::Dart("base line is too short to place a dart".into()));
    }
    if !(layout.width > 0.0 && layout.length > 0.0) {
        return Err(DraftError::Dart("dart width and length must be positive".into()));
    }
    if layout.width > length {
        return Err(DraftError::Dart(format!(
            "dart width {:.2} exceeds the base line ({length:.2})",
            layout.width
        )));
    }
    let half = layout.width / 2.0;
    let along = match layout.position {
        DartPosition::Center => length / 2.0,
        DartPosition::Offset(o) if o.abs() > length => {
            return Err(DraftError::Dart(format!(
                "offset {o:.2} exceeds the base line ({length:.2})"
            )));
        }
        DartPosition::Offset(o) if o >= 0.0 => o,
        DartPosition::Offset(o) => length + o,
    };
    if along < half || along > length - half {
        return Err(DraftError::Dart("dart runs off the end of its base line".into()));
    }

    let dir = unit(&(end - start))
        .ok_or_else(|| DraftError::Dart("base line has no direction".into()))?;
    let normal = perp(&dir);
    let facing = normal.dot(&layout.direction.vector(orientation));
    if facing.abs() < 1e-6 {
        return Err(DraftError::Dart(format!(
            "cannot point {:?} off a base running that way",
            layout.direction
        )));
    }
    let out = if facing > 0.0 { normal } else { -normal };
    let center = start + dir * along;
    Ok(PlacedDart {
        left: center - dir * half,
        right: center + dir * half,
        apex: center + out * layout.length,
        center,
    })
}

/// [`place_dart`] on a straight path of `ctx`.
pub fn place_dart_on(ctx: &DraftContext, base: &str, layout: &DartLayout) -> Result<PlacedDart> {
    place_dart(line_ends(ctx, base)?, layout, ctx.orientation)
}

/// Paths for a dart with its opening at `left`..`right`.
///
/// Joined legs draw as one path `left -> apex -> right` named `name`;
/// otherwise `"{name} Left Leg"` and `"{name} Right Leg"` run from the
/// opening to the apex. A `center` adds a dashed `"{name} Center Line"`.
pub fn dart_paths(
    name: &str,
    left: Point2,
    right: Point2,
    apex: Point2,
    join_legs: bool,
    center: Option<Point2>,
) -> Vec<DraftPath> {
    let mut paths = if join_legs {
        vec![straight(name, Stroke::Solid, &[left, apex, right], false)]
    } else {
        vec![
            straight(&format!("{name} Left Leg"), Stroke::Solid, &[left, apex], false),
            straight(&format!("{name} Right Leg"), Stroke::Solid, &[right, apex], false),
        ]
    };
    if let Some(c) = center {
        paths.push(straight(
            &format!("{name} Center Line"),
            Stroke::Dashed,
            &[c, apex],
            false,
        ));
    }
    paths
}
