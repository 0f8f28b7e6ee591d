//! Tight basic sleeve.
//!
//! Drafted in a y-up frame with mark 1 at the origin. The cap line runs
//! from 1 to 2. The cap height comes from two circles: one about 1 sized
//! from the front armhole and one about 2 sized from the back armhole.
//! Where they cross is mark 4, the top of the cap. The sleeve hangs below
//! 4, and the cap arcs are shaped through guide marks 11 to 14.

use log::{debug, warn};
use tailor_kernel_curve::{
    offset_toward, smooth_midpoint_path, ArcFit, ArcLimits, Bow, CurveSegment, MidpointHandles,
};
use tailor_kernel_geom::{
    circle_circle_intersection, horizontal_crossing, perpendicular_foot_clamped,
    select_point_on_arc, ArcPick,
};
use tailor_kernel_math::{midpoint, unit, Point2, Vec2};
use tailor_measure::{InputSurface, SleeveDerived, SleeveMeasurements};

use crate::context::DraftContext;
use crate::error::Result;
use crate::plan::{Plan, Scope, Step};
use crate::settings::DraftSettings;
use crate::types::{Orientation, Stroke};

type SleeveScope<'a> = Scope<'a, SleeveDerived>;

/// Share of the sleeve length from 4 down to the elbow line.
const ELBOW_RATIO: f64 = 0.6;

/// Bezier weights of the four control points at `t = 1/2`.
const HALF_WEIGHTS: (f64, f64, f64, f64) = (0.125, 0.375, 0.375, 0.125);

/// Radius of the circle about 1 that carries mark 3.
pub fn front_cap_radius(d: &SleeveDerived) -> f64 {
    (0.95 * d.f_ah + 0.25 * d.cap_ease_cm).max(0.0)
}

/// Radius of the circle about 2 that locates mark 4.
pub fn back_cap_radius(d: &SleeveDerived) -> f64 {
    (0.95 * d.b_ah + 0.75 * d.cap_ease_cm).max(0.0)
}

/// Length of the cap line, at least 1 cm.
pub fn cap_line_length(d: &SleeveDerived) -> f64 {
    let len = d.sl_w + 1.0 + d.cap_line_ease;
    if len.is_finite() {
        len.max(1.0)
    } else {
        1.0
    }
}

// =============================================================================
// Cap frame
// =============================================================================

fn cap_line(s: &mut SleeveScope<'_>) -> Option<()> {
    let d = *s.data();
    let o = s.settings().origin;
    let cap = cap_line_length(&d);
    let p1 = s.set_marked("1", Point2::new(o.x, o.y))?;
    let p2 = s.set_marked("2", p1 + Vec2::new(cap, 0.0))?;
    s.line("Cap Line", Stroke::Dashed, p1, p2);
    s.value("CapLine", cap);
    s.value("CapC", d.cap_c);
    s.value("CapEaseCm", d.cap_ease_cm);
    Some(())
}

/// Build the arc about 1 at `length` and intersect it with the back circle.
fn locate_cap_top(
    p1: Point2,
    p2: Point2,
    r3: f64,
    r4: f64,
    length: f64,
) -> Option<(ArcFit, Option<ArcPick>)> {
    let arc = ArcFit::build(p1, r3, length, ArcLimits::SLEEVE_CAP)?;
    let pick = if r4 > 0.0 {
        circle_circle_intersection(&p1, r3, &p2, r4).and_then(|hit| {
            select_point_on_arc(&hit.points(), &arc.center, arc.start_angle, arc.end_angle)
        })
    } else {
        None
    };
    Some((arc, pick))
}

/// Mark 3 on the front circle and mark 4 where the back circle crosses it.
///
/// The first arc uses the target length. When neither crossing lies on it,
/// a longer arc is tried, and if that misses as well the first arc is kept
/// with its fallback crossing. The arc is then re-centered about 4 and 3
/// is its upper end.
fn cap_arc(s: &mut SleeveScope<'_>) -> Option<()> {
    let d = *s.data();
    let settings = *s.settings();
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let r3 = front_cap_radius(&d);
    let r4 = back_cap_radius(&d);

    let (mut arc, mut pick) = locate_cap_top(p1, p2, r3, r4, settings.arc_target_length)?;
    if !pick.map_or(false, |p| p.on_arc) {
        if let Some((longer, Some(hit))) =
            locate_cap_top(p1, p2, r3, r4, settings.arc_retry_length)
        {
            if hit.on_arc {
                debug!(
                    "cap arc: mark 4 found on the {:.1} cm arc",
                    settings.arc_retry_length
                );
                arc = longer;
                pick = Some(hit);
            }
        }
    }

    match pick {
        Some(hit) => {
            arc.rebalance(hit.angle);
            s.set_marked("4", hit.point)?;
            s.value("CapHeight", hit.point.y - p1.y);
        }
        None => warn!("cap arc: circles about 1 and 2 do not meet, mark 4 not placed"),
    }
    s.set_marked("3", arc.end_point())?;
    s.curve("Arc", Stroke::Solid, [CurveSegment::Cubic(arc.bezier)]);
    s.value("ArcLength", arc.target_length);
    s.value("ArcRadius", r3);
    s.value("BackRadius", r4);
    Some(())
}

fn cap_frame(s: &mut SleeveScope<'_>) -> Option<()> {
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;
    s.line("Back Line", Stroke::Dashed, p2, p4);
    s.line("Front Line", Stroke::Dashed, p1, p4);
    Some(())
}

// =============================================================================
// Sleeve body
// =============================================================================

fn sleeve_length(s: &mut SleeveScope<'_>) -> Option<()> {
    let d = *s.data();
    if !(d.sl_l > 0.0) {
        return None;
    }
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;

    let p5 = s.set_marked("5", p4 - Vec2::new(0.0, d.sl_l))?;
    s.set_marked("6", p4 - Vec2::new(0.0, d.sl_l * ELBOW_RATIO))?;
    s.line("Sleeve Length", Stroke::Dashed, p4, p5);

    let hem_y = p5.y;
    let elbow_y = p4.y - d.sl_l * ELBOW_RATIO;
    let p7 = s.set_marked("7", Point2::new(p1.x, hem_y))?;
    let p8 = s.set_marked("8", Point2::new(p2.x, hem_y))?;
    let p9 = s.set_marked("9", Point2::new(p1.x, elbow_y))?;
    let p10 = s.set_marked("10", Point2::new(p2.x, elbow_y))?;
    s.line("1-7", Stroke::Dashed, p1, p7);
    s.line("2-8", Stroke::Dashed, p2, p8);
    s.line("7-8", Stroke::Dashed, p7, p8);
    s.line("9-10", Stroke::Dashed, p9, p10);
    s.set_marked("15", midpoint(&p7, &p8))?;
    Some(())
}

fn hem_width(s: &mut SleeveScope<'_>) -> Option<()> {
    let d = *s.data();
    let half = d.he_w / 2.0;
    if !(half > 0.0) {
        return None;
    }
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p15 = s.p("15")?;
    let elbow_y = s.p("6")?.y;

    let p16 = s.set_marked("16", p15 - Vec2::new(half, 0.0))?;
    let p17 = s.set_marked("17", p15 + Vec2::new(half, 0.0))?;
    s.line("Hem Line", Stroke::Solid, p16, p17);
    s.line("Left Sleeve Length", Stroke::Dashed, p16, p1);
    s.line("Right Sleeve Length", Stroke::Dashed, p17, p2);
    s.set("elbowLeft", horizontal_crossing(&p16, &p1, elbow_y))?;
    s.set("elbowRight", horizontal_crossing(&p17, &p2, elbow_y))?;
    Some(())
}

/// First crossing of height `y` along a chain of segments.
fn crossing_on(segments: &[CurveSegment], y: f64) -> Option<Point2> {
    segments
        .iter()
        .find_map(|seg| seg.as_cubic().horizontal_crossing(y))
}

fn sleeve_seams(s: &mut SleeveScope<'_>) -> Option<()> {
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;
    let p6 = s.p("6")?;
    let p16 = s.p("16")?;
    let p17 = s.p("17")?;
    let elbow_left = s.p("elbowLeft")?;
    let elbow_right = s.p("elbowRight")?;

    let left = smooth_midpoint_path(
        p16,
        elbow_left,
        p1,
        MidpointHandles::SLEEVE_SEAM,
        Bow::UpperLeft,
    );
    let right = smooth_midpoint_path(
        p17,
        elbow_right,
        p2,
        MidpointHandles::SLEEVE_SEAM,
        Bow::UpperRight,
    );
    s.curve("Left Sleeve Curve", Stroke::Solid, left);
    s.curve("Right Sleeve Curve", Stroke::Solid, right);
    s.line("Elbow Line", Stroke::Dashed, elbow_left, elbow_right);

    let width_y = midpoint(&p6, &p4).y;
    let width_left = crossing_on(&left, width_y)
        .unwrap_or_else(|| horizontal_crossing(&p16, &p1, width_y));
    let width_right = crossing_on(&right, width_y)
        .unwrap_or_else(|| horizontal_crossing(&p17, &p2, width_y));
    let width_left = s.set("widthLeft", width_left)?;
    let width_right = s.set("widthRight", width_right)?;
    s.line("Sleeve Width", Stroke::Dashed, width_left, width_right);
    s.value("SleeveWidth", (width_right - width_left).norm());
    Some(())
}

// =============================================================================
// Cap shaping
// =============================================================================

fn cap_marks(s: &mut SleeveScope<'_>) -> Option<()> {
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;
    let cap = p2.x - p1.x;

    let p11 = s.set_marked("11", p4 - Vec2::new(cap / 8.0, 0.0))?;
    let p12 = s.set_marked("12", p4 + Vec2::new(cap / 5.0, 0.0))?;
    let p13 = s.set_marked("13", p2 - Vec2::new(cap / 9.0, 0.0))?;
    let p14 = s.set_marked("14", p1 + Vec2::new(cap / 12.0, 0.0))?;
    s.line("4-11", Stroke::Dashed, p4, p11);
    s.line("4-12", Stroke::Dashed, p4, p12);
    s.line("11-14", Stroke::Dashed, p11, p14);
    s.line("12-13", Stroke::Dashed, p12, p13);

    let pa = s.set_marked("a", perpendicular_foot_clamped(&p11, &p1, &p4)?)?;
    let pb = s.set_marked("b", perpendicular_foot_clamped(&p12, &p2, &p4)?)?;
    s.line("a-11", Stroke::Dashed, pa, p11);
    s.line("12-b", Stroke::Dashed, p12, pb);
    Some(())
}

fn front_cap(s: &mut SleeveScope<'_>) -> Option<()> {
    let f_ap = s.data().f_ap;
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;
    let p11 = s.p("11")?;
    let p12 = s.p("12")?;
    let p14 = s.p("14")?;

    let mid = midpoint(&p11, &p14);
    let segments = [
        CurveSegment::cubic(
            p1,
            offset_toward(&p1, &p2, 3.0),
            offset_toward(&mid, &p14, 4.0),
            mid,
        ),
        CurveSegment::cubic(
            mid,
            offset_toward(&mid, &p11, 3.0),
            p4 + unit(&(p4 - p12))? * 3.3,
            p4,
        ),
    ];
    s.curve("Front Cap Arc", Stroke::Solid, segments);
    s.value("FrontCapLength", segments.iter().map(CurveSegment::length).sum());
    if s.notch("Front Cap Notch", "Front Cap Arc", f_ap, false).is_none() {
        debug!("front cap notch not placed at {f_ap:.2} cm");
    }
    Some(())
}

/// Length along `dir` of the start handle that puts the cubic's midpoint on `target`.
fn start_handle_length(p0: Point2, dir: Vec2, p2: Point2, p3: Point2, target: Point2) -> f64 {
    let (f0, f1, f2, f3) = HALF_WEIGHTS;
    let rest = target.coords - p0.coords * (f0 + f1) - p2.coords * f2 - p3.coords * f3;
    rest.dot(&dir) / f1
}

fn back_cap(s: &mut SleeveScope<'_>) -> Option<()> {
    let b_ap = s.data().b_ap;
    let p1 = s.p("1")?;
    let p2 = s.p("2")?;
    let p4 = s.p("4")?;
    let p12 = s.p("12")?;
    let p13 = s.p("13")?;
    let pb = s.p("b")?;

    let mid = midpoint(&p12, &p13);
    let end_handle = p4 + unit(&(p12 - p4))? * 3.3;
    let dir = unit(&(p12 - mid))?;
    let length = start_handle_length(mid, dir, end_handle, p4, midpoint(&p12, &pb));
    let length = if length.is_finite() && length > 0.0 {
        length
    } else {
        3.0
    };
    let segments = [
        CurveSegment::cubic(
            p2,
            offset_toward(&p2, &p1, 4.3),
            offset_toward(&mid, &p13, 4.0),
            mid,
        ),
        CurveSegment::cubic(mid, mid + dir * length, end_handle, p4),
    ];
    s.curve("Back Cap Arc", Stroke::Solid, segments);
    let back = segments.iter().map(CurveSegment::length).sum::<f64>();
    s.value("BackCapLength", back);
    if let Some(front) = s.segments_of("Front Cap Arc") {
        let total = front.iter().map(CurveSegment::length).sum::<f64>() + back;
        s.value("CapLength", total);
    }

    // Notches count from the lower end of the arc.
    let from_end = p2.y > p4.y;
    for (name, distance) in [
        ("Back Cap Notch", b_ap),
        ("Back Cap Notch Upper", b_ap + 1.0),
    ] {
        if s.notch(name, "Back Cap Arc", distance, from_end).is_none() {
            debug!("{name} not placed at {distance:.2} cm");
        }
    }
    Some(())
}

// =============================================================================
// Variant
// =============================================================================

/// Step plan of the tight basic sleeve.
pub fn tight_sleeve_plan() -> Plan<SleeveDerived> {
    Plan::new("tight-sleeve", Orientation::YUp)
        .step(
            Step::new("cap line", cap_line)
                .writes(&["1", "2"])
                .draws(&["Cap Line"]),
        )
        .step(
            Step::new("cap arc", cap_arc)
                .reads(&["1", "2"])
                .writes(&["3", "4"])
                .draws(&["Arc"]),
        )
        .step(
            Step::new("cap frame", cap_frame)
                .reads(&["1", "2", "4"])
                .draws(&["Back Line", "Front Line"]),
        )
        .step(
            Step::new("sleeve length", sleeve_length)
                .reads(&["1", "2", "4"])
                .writes(&["5", "6", "7", "8", "9", "10", "15"])
                .draws(&["Sleeve Length", "1-7", "2-8", "7-8", "9-10"]),
        )
        .step(
            Step::new("hem width", hem_width)
                .reads(&["1", "2", "15", "6"])
                .writes(&["16", "17", "elbowLeft", "elbowRight"])
                .draws(&["Hem Line", "Left Sleeve Length", "Right Sleeve Length"]),
        )
        .step(
            Step::new("sleeve seams", sleeve_seams)
                .reads(&["1", "2", "4", "6", "16", "17", "elbowLeft", "elbowRight"])
                .writes(&["widthLeft", "widthRight"])
                .draws(&[
                    "Left Sleeve Curve",
                    "Right Sleeve Curve",
                    "Elbow Line",
                    "Sleeve Width",
                ]),
        )
        .step(
            Step::new("cap marks", cap_marks)
                .reads(&["1", "2", "4"])
                .writes(&["11", "12", "13", "14", "a", "b"])
                .draws(&["4-11", "4-12", "11-14", "12-13", "a-11", "12-b"]),
        )
        .step(
            Step::new("front cap", front_cap)
                .reads(&["1", "2", "4", "11", "12", "14"])
                .draws(&["Front Cap Arc"])
                .uses_paths(&["Front Cap Arc"]),
        )
        .step(
            Step::new("back cap", back_cap)
                .reads(&["1", "2", "4", "12", "13", "b"])
                .draws(&["Back Cap Arc"])
                .uses_paths(&["Back Cap Arc", "Front Cap Arc"]),
        )
}

/// Draft a tight basic sleeve from the measurements behind `input`.
pub fn draft_tight_sleeve(input: &dyn InputSurface, settings: &DraftSettings) -> Result<DraftContext> {
    let measurements = SleeveMeasurements::read(input);
    let mut ctx = tight_sleeve_plan().run(&measurements.derive(), settings)?;
    ctx.set_measurements(measurements.sheet);
    Ok(ctx)
}
