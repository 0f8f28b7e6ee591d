//! Casual bodice.
//!
//! The draft is laid out in a y-down frame with centre back on the line
//! through point 1 and the front to its left (negative x). The back is
//! built first, from the neck down to the hip line, then the hip width is
//! balanced between back and front before the front neck, shoulder, bust
//! point and both armholes are placed.
//!
//! The step functions here are shared with the shaping bodice, which
//! reuses most of the frame and swaps in its own dart and armhole steps.

use log::{debug, warn};
use tailor_kernel_curve::{
    clamp_handle_length, solve_waypoint, BulgeCurve, CurveSegment, WaypointFit, WaypointParams,
    MIN_HANDLE_LENGTH,
};
use tailor_kernel_geom::{extend_line_to_y, perpendicular_foot, polar_offset};
use tailor_kernel_math::{midpoint, perp, unit, Point2, Vec2};
use tailor_measure::{BodiceDerived, BodiceMeasurements, InputSurface};

use crate::context::DraftContext;
use crate::error::Result;
use crate::plan::{Plan, Scope, Step, StepFn};
use crate::settings::DraftSettings;
use crate::types::{Orientation, Stroke};

/// Distance between the back and front side lines on the bust line (cm).
pub const CASUAL_SIDE_GAP: f64 = 15.0;

/// Below this a direction component counts as zero.
const AXIS_EPS: f64 = 1e-4;

pub(crate) type BodiceScope<'a> = Scope<'a, BodiceDerived>;

// =============================================================================
// Frame
// =============================================================================

fn derived_values(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    s.value("BrW", d.brw);
    s.value("WaW", d.waw);
    s.value("HiW", d.hiw);
    s.value("IndividualBalance", d.individual_balance);
    s.value("FinalBalance", d.final_balance);
    s.value("OptimalBalance", d.optimal_balance);
    s.value("BalanceDelta", d.balance_delta);
    if let Some(recommended) = d.recommended_balance {
        s.value("RecommendedBalance", recommended);
    }
    if !d.balance_within_tolerance {
        debug!(
            "balance {:.2} is {:.2} away from the optimal {:.2}",
            d.final_balance, d.balance_delta, d.optimal_balance
        );
    }
    Some(())
}

pub(crate) fn derived_values_step() -> Step<BodiceDerived> {
    Step::new("derived values", derived_values)
}

fn neck_frame(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    let origin = s.settings().origin;
    let p1 = s.set_marked("1", Point2::new(origin.x, origin.y))?;
    let p1a = s.set_marked("1a", p1 - Vec2::new(d.neg + 0.5, 0.0))?;
    let p1a_ext = s.set("1aExt", p1a - Vec2::new(10.0, 0.0))?;
    let p2 = s.set_marked("2", p1 + Vec2::new(0.0, d.neg / 3.0 + 1.0))?;

    s.line("1 - 1a", Stroke::Dashed, p1, p1a);
    s.line("1a - Extension", Stroke::Dashed, p1a, p1a_ext);

    let neck = BulgeCurve::new(-MIN_HANDLE_LENGTH.max((d.neg + 0.5) / 3.0))
        .with_end_horizontal(MIN_HANDLE_LENGTH.max(d.neg / 2.0), -1.0)
        .build(p1a, p2);
    s.curve("Back Neck Curve", Stroke::Solid, [CurveSegment::Cubic(neck)]);
    Some(())
}

pub(crate) fn neck_frame_step() -> Step<BodiceDerived> {
    Step::new("neck frame", neck_frame)
        .writes(&["1", "1a", "1aExt", "2"])
        .draws(&["1 - 1a", "1a - Extension", "Back Neck Curve"])
}

fn centre_back_frame(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    let p2 = s.p("2")?;
    s.set_marked("3", p2 + Vec2::new(0.0, d.mol))?;
    let p4 = s.set_marked("4", p2 + Vec2::new(0.0, d.ahd))?;
    let p5 = s.set_marked("5", p2 + Vec2::new(0.0, d.bl_final))?;
    let p6 = s.set_marked("6", p5 + Vec2::new(0.0, d.hid))?;
    let p6a = s.set_marked("6a", p6 - Vec2::new(2.0, 0.0))?;
    s.set_marked("9", extend_line_to_y(&p2, &p6a, p4.y))?;
    s.set_marked("7", extend_line_to_y(&p2, &p6a, p5.y))?;
    Some(())
}

pub(crate) fn centre_back_frame_step() -> Step<BodiceDerived> {
    Step::new("centre back frame", centre_back_frame)
        .reads(&["2"])
        .writes(&["3", "4", "5", "6", "6a", "9", "7"])
}

/// Points 10 to 14 across the bust line, with `gap` between the side lines.
pub(crate) fn widths(s: &mut BodiceScope<'_>, gap: f64) -> Option<()> {
    let d = *s.data();
    let p9 = s.p("9")?;
    let p4 = s.p("4")?;
    let p10 = s.set_marked("10", Point2::new(p9.x - d.bg, p4.y))?;
    let p11 = s.set_marked("11", p10 - Vec2::new(d.ag * 2.0 / 3.0, 0.0))?;
    let p12 = s.set_marked("12", p11 - Vec2::new(gap, 0.0))?;
    let p13 = s.set_marked("13", p12 - Vec2::new(d.ag / 3.0, 0.0))?;
    s.set_marked("14", p13 - Vec2::new(d.brg, 0.0))?;
    s.set_marked("13a", p13 - Vec2::new(0.0, d.ag / 4.0))?;
    Some(())
}

fn casual_widths(s: &mut BodiceScope<'_>) -> Option<()> {
    widths(s, CASUAL_SIDE_GAP)
}

pub(crate) fn widths_step(run: StepFn<BodiceDerived>) -> Step<BodiceDerived> {
    Step::new("widths", run)
        .reads(&["9", "4"])
        .writes(&["10", "11", "12", "13", "14", "13a"])
}

/// Back shoulder seam from 1a at the back shoulder angle, drawn as `path`.
///
/// Point 16 is where the seam crosses the back arm line at 10.x. The seam
/// runs at least that far, so its end never stops short of the arm line.
pub(crate) fn back_shoulder(s: &mut BodiceScope<'_>, path: &str) -> Option<()> {
    let d = *s.data();
    if !(d.b_sh_s > 0.0) {
        return None;
    }
    let p1a = s.p("1a")?;
    let p10 = s.p("10")?;
    let theta = d.back_shoulder_angle.to_radians();
    let dir = Vec2::new(-theta.cos(), theta.sin());

    let dx = p10.x - p1a.x;
    let t_hit = if dir.x.abs() > AXIS_EPS {
        Some(dx / dir.x).filter(|t| *t >= 0.0)
    } else if dx.abs() < AXIS_EPS {
        Some(0.0)
    } else {
        None
    };
    let reach = t_hit.map_or(d.b_sh_s, |t| t.max(d.b_sh_s));
    let end = s.set("backShoulderEnd", p1a + dir * reach)?;
    if let Some(t) = t_hit {
        s.set_marked("16", Point2::new(p10.x, p1a.y + dir.y * t))?;
    }
    s.line(path, Stroke::Solid, p1a, end);
    Some(())
}

fn casual_back_shoulder(s: &mut BodiceScope<'_>) -> Option<()> {
    back_shoulder(s, "Back Shoulder Line")
}

pub(crate) fn back_shoulder_step(
    run: StepFn<BodiceDerived>,
    draws: &'static [&'static str],
) -> Step<BodiceDerived> {
    Step::new("back shoulder", run)
        .reads(&["1a", "10"])
        .writes(&["backShoulderEnd", "16"])
        .draws(draws)
}

fn shoulder_blade(s: &mut BodiceScope<'_>) -> Option<()> {
    let p16 = s.p("16")?;
    let p10 = s.p("10")?;
    let p2 = s.p("2")?;
    let p17 = s.set_marked("17", midpoint(&p16, &p10) - Vec2::new(1.0, 0.0))?;
    let blade_end = s.set("shoulderBladeEnd", Point2::new(p2.x, p17.y))?;
    s.line("Shoulder Blade Line", Stroke::Dashed, p17, blade_end);
    Some(())
}

pub(crate) fn shoulder_blade_step() -> Step<BodiceDerived> {
    Step::new("shoulder blade", shoulder_blade)
        .reads(&["16", "10", "2"])
        .writes(&["17", "shoulderBladeEnd"])
        .draws(&["Shoulder Blade Line"])
}

fn armhole_guide(s: &mut BodiceScope<'_>) -> Option<()> {
    let p17 = s.p("17")?;
    let p10 = s.p("10")?;
    let p13 = s.p("13")?;
    let p17a = s.set_marked("17a", midpoint(&p17, &p10) - Vec2::new(1.5, 0.0))?;
    let p18 = s.set_marked("18", Point2::new(p13.x, p17a.y))?;
    s.line("17a - 18", Stroke::Dashed, p17a, p18);
    Some(())
}

fn frame_ends(s: &mut BodiceScope<'_>) -> Option<()> {
    let x = s.p("14")?.x;
    for (label, end) in [("3", "hemEnd"), ("4", "bustEnd"), ("5", "waistEnd"), ("6", "hipEnd")] {
        let y = s.p(label)?.y;
        s.set(end, Point2::new(x, y))?;
    }
    Some(())
}

pub(crate) fn frame_ends_step() -> Step<BodiceDerived> {
    Step::new("frame ends", frame_ends)
        .reads(&["14", "3", "4", "5", "6"])
        .writes(&["hemEnd", "bustEnd", "waistEnd", "hipEnd"])
}

// =============================================================================
// Hip balance and side seams
// =============================================================================

/// Direction of the centre back line (2 -> 6a), if it has one.
fn back_diagonal(p2: Point2, p6a: Point2) -> Option<Vec2> {
    let diag = p6a - p2;
    (diag.x.abs() > AXIS_EPS || diag.y.abs() > AXIS_EPS).then_some(diag)
}

fn back_side(s: &mut BodiceScope<'_>) -> Option<()> {
    let p2 = s.p("2")?;
    let p6a = s.p("6a")?;
    let p11 = s.p("11")?;
    let hem_y = s.p("3")?.y;
    let diag = back_diagonal(p2, p6a)?;
    let p25 = s.set_marked("25", extend_line_to_y(&p11, &(p11 + diag), hem_y))?;
    s.line("Back Side Straightening Line", Stroke::Dashed, p11, p25);
    Some(())
}

pub(crate) fn back_side_step() -> Step<BodiceDerived> {
    Step::new("back side", back_side)
        .reads(&["2", "6a", "11", "3"])
        .writes(&["25"])
        .draws(&["Back Side Straightening Line"])
}

fn hip_line(s: &mut BodiceScope<'_>) -> Option<()> {
    let p2 = s.p("2")?;
    let p6a = s.p("6a")?;
    let p11 = s.p("11")?;
    let p12 = s.p("12")?;
    let p14 = s.p("14")?;
    let hip_y = s.p("6")?.y;
    let waist_y = s.p("5")?.y;
    s.set_marked("26", Point2::new(p11.x, hip_y))?;
    s.set_marked("27", Point2::new(p12.x, hip_y))?;
    let p28 = match back_diagonal(p2, p6a) {
        Some(diag) => extend_line_to_y(&p11, &(p11 + diag), hip_y),
        None => Point2::new(p11.x, hip_y),
    };
    s.set_marked("28", p28)?;
    s.set_marked("19a", Point2::new(p14.x, hip_y))?;
    s.set_marked("19", Point2::new(p14.x, waist_y))?;
    Some(())
}

pub(crate) fn hip_line_step() -> Step<BodiceDerived> {
    Step::new("hip line", hip_line)
        .reads(&["2", "6a", "11", "12", "14", "6", "5"])
        .writes(&["26", "27", "28", "19a", "19"])
}

/// Hip width measured on the draft and the shift that balances it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HipBalance {
    /// Back hip span, 6a to 26.
    pub span_back: f64,
    /// Front hip span, 19a to 27.
    pub span_front: f64,
    /// Hip width on the draft (`span_back + span_front`).
    pub girth: f64,
    /// `girth - hiw`; negative when the draft is too narrow.
    pub shortage: f64,
    /// Shift applied to each side seam at the hip line.
    pub half_shift: f64,
}

impl HipBalance {
    /// Balance the two spans against the half hip width.
    ///
    /// Each side seam moves outward by half the shortage magnitude, so the
    /// shifts at 29 and 30 are always equal and opposite.
    pub fn new(span_back: f64, span_front: f64, hiw: f64) -> Self {
        let girth = span_back + span_front;
        let shortage = girth - hiw;
        Self {
            span_back,
            span_front,
            girth,
            shortage,
            half_shift: shortage.abs() / 2.0,
        }
    }
}

fn hip_balance(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    let p6a = s.p("6a")?;
    let p26 = s.p("26")?;
    let p19a = s.p("19a")?;
    let p27 = s.p("27")?;
    let p28 = s.p("28")?;
    let hip = HipBalance::new((p6a - p26).norm(), (p19a - p27).norm(), d.hiw);

    s.value("HipSpanBack", hip.span_back);
    s.value("HipSpanFront", hip.span_front);
    s.value("HiG", hip.girth);
    s.value("HipShortage", hip.shortage);
    s.value("HalfHipShortage", hip.half_shift);

    s.set_marked("29", p27 + Vec2::new(hip.half_shift, 0.0))?;
    s.set_marked("30", p28 - Vec2::new(hip.half_shift, 0.0))?;
    Some(())
}

pub(crate) fn hip_balance_step() -> Step<BodiceDerived> {
    Step::new("hip balance", hip_balance)
        .reads(&["6a", "26", "19a", "27", "28"])
        .writes(&["29", "30"])
}

fn back_side_seam(s: &mut BodiceScope<'_>) -> Option<()> {
    let p11 = s.p("11")?;
    let p30 = s.p("30")?;
    let p2 = s.p("2")?;
    let p6a = s.p("6a")?;
    let hem_y = s.p("3")?.y;
    let waist_y = s.p("5")?.y;

    let hem = s.set("30Hem", extend_line_to_y(&p11, &p30, hem_y))?;
    let waist = s.set("30Waist", extend_line_to_y(&p11, &p30, waist_y))?;
    s.line("Back Side Line 1", Stroke::Solid, p11, hem);

    let hip_end = perpendicular_foot(&p30, &p2, &p6a).unwrap_or(Point2::new(p6a.x, p30.y));
    let hip_end = s.set("hipLine6a", hip_end)?;
    s.line("Back Hip Line", Stroke::Dashed, p30, hip_end);

    if let Some(foot) = perpendicular_foot(&hem, &p2, &p6a) {
        let foot = s.set("hemConnector", foot)?;
        s.line("Back Hem Line", Stroke::Solid, hem, foot);
    }
    if let Some(foot) = perpendicular_foot(&waist, &p2, &p6a) {
        let foot = s.set("waistConnector", foot)?;
        s.line("Back Waist Line", Stroke::Dashed, waist, foot);
    }
    Some(())
}

pub(crate) fn back_side_seam_step() -> Step<BodiceDerived> {
    Step::new("back side seam", back_side_seam)
        .reads(&["11", "30", "2", "6a", "3", "5"])
        .writes(&["30Hem", "30Waist", "hipLine6a", "hemConnector", "waistConnector"])
        .draws(&["Back Side Line 1", "Back Hip Line", "Back Hem Line", "Back Waist Line"])
}

fn centre_back(s: &mut BodiceScope<'_>) -> Option<()> {
    let p2 = s.p("2")?;
    let p7 = s.p("7")?;
    let p6a = s.p("6a")?;
    let hem_y = s.p("3")?.y;
    let p8 = s
        .maybe("hemConnector")
        .unwrap_or_else(|| extend_line_to_y(&p2, &p6a, hem_y));
    let p8 = s.set_marked("8", p8)?;
    s.polyline("Centre Back (CB)", Stroke::Solid, &[p2, p7, p8], false);
    Some(())
}

pub(crate) fn centre_back_step() -> Step<BodiceDerived> {
    Step::new("centre back", centre_back)
        .reads(&["2", "7", "6a", "3", "hemConnector"])
        .writes(&["8"])
        .draws(&["Centre Back (CB)"])
}

fn front_side_seam(s: &mut BodiceScope<'_>) -> Option<()> {
    let p12 = s.p("12")?;
    let p29 = s.p("29")?;
    let hem_y = s.p("3")?.y;
    let hem = s.set("29Hem", extend_line_to_y(&p12, &p29, hem_y))?;
    s.line("New Front Side Line", Stroke::Solid, p12, hem);
    Some(())
}

pub(crate) fn front_side_seam_step() -> Step<BodiceDerived> {
    Step::new("front side seam", front_side_seam)
        .reads(&["12", "29", "3"])
        .writes(&["29Hem"])
        .draws(&["New Front Side Line"])
}

// =============================================================================
// Front
// =============================================================================

fn front_neck(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    let p19 = s.p("19")?;
    let p20 = s.set_marked("20", p19 - Vec2::new(0.0, (d.fl_final - 1.0).max(0.0)))?;
    let guide = s.set("20Guide", p20 + Vec2::new(20.0, 0.0))?;
    let p20a = s.set_marked("20a", p20 + Vec2::new(d.neg, 0.0))?;
    let p23 = s.set_marked("23", p20 + Vec2::new(0.0, d.neg + 0.5))?;
    s.line("20 Guideline", Stroke::Dashed, p20, guide);

    let neck = BulgeCurve::new(MIN_HANDLE_LENGTH.max(d.neg / 2.0))
        .with_end_horizontal(MIN_HANDLE_LENGTH.max(d.neg / 2.0), 1.0)
        .build(p20a, p23);
    s.curve("Front Neck Curve", Stroke::Solid, [CurveSegment::Cubic(neck)]);
    Some(())
}

pub(crate) fn front_neck_step() -> Step<BodiceDerived> {
    Step::new("front neck", front_neck)
        .reads(&["19"])
        .writes(&["20", "20Guide", "20a", "23"])
        .draws(&["20 Guideline", "Front Neck Curve"])
}

fn front_shoulder(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    if !(d.f_sh_s > 0.0) {
        return None;
    }
    let p20a = s.p("20a")?;
    let p24 = s.set_marked(
        "24",
        polar_offset(&p20a, d.front_shoulder_angle.to_radians(), d.f_sh_s),
    )?;
    s.line("Front Shoulder Line", Stroke::Solid, p20a, p24);
    Some(())
}

pub(crate) fn front_shoulder_step() -> Step<BodiceDerived> {
    Step::new("front shoulder", front_shoulder)
        .reads(&["20a"])
        .writes(&["24"])
        .draws(&["Front Shoulder Line"])
}

/// Height where the front dart meets the shoulder seam `20a -> 24`.
///
/// Falls back to `default_y` when the dart misses the seam.
pub(crate) fn dart_top_y(p20a: Point2, p24: Option<Point2>, dart_x: f64, default_y: f64) -> f64 {
    let Some(p24) = p24 else {
        return default_y;
    };
    let dx = p24.x - p20a.x;
    let y = if dx.abs() > AXIS_EPS {
        let t = (dart_x - p20a.x) / dx;
        if (0.0..=1.0).contains(&t) {
            p20a.y + (p24.y - p20a.y) * t
        } else {
            default_y
        }
    } else if (dart_x - p20a.x).abs() < AXIS_EPS {
        default_y.clamp(p20a.y.min(p24.y), p20a.y.max(p24.y))
    } else {
        default_y
    };
    if y.is_finite() {
        y
    } else {
        default_y
    }
}

fn bust_point(s: &mut BodiceScope<'_>) -> Option<()> {
    let d = *s.data();
    let p20 = s.p("20")?;
    let p20a = s.p("20a")?;
    let hem_y = s.p("3")?.y;
    let p24 = s.maybe("24");

    let p21 = s.set_marked("21", p20 + Vec2::new(0.0, (d.brd - 1.0).max(0.0)))?;
    let p22 = s.set_marked("22", p21 + Vec2::new((d.brg / 2.0 - 0.3).max(0.0), 0.0))?;
    s.line("Bust Distance", Stroke::Dashed, p21, p22);

    let top = s.set("frontDartTop", Point2::new(p22.x, dart_top_y(p20a, p24, p22.x, p20.y)))?;
    let bottom = s.set("frontDartBottom", Point2::new(p22.x, hem_y))?;
    s.line("Front Dart Line", Stroke::Dashed, top, bottom);
    Some(())
}

pub(crate) fn bust_point_step() -> Step<BodiceDerived> {
    Step::new("bust point", bust_point)
        .reads(&["20", "20a", "3", "24"])
        .writes(&["21", "22", "frontDartTop", "frontDartBottom"])
        .draws(&["Bust Distance", "Front Dart Line"])
}

fn frame_lines(s: &mut BodiceScope<'_>) -> Option<()> {
    let top_y = s.p("1")?.y;
    let p2 = s.p("2")?;
    let hem_y = s.p("3")?.y;
    let waist_y = s.p("5")?.y;
    let p10 = s.p("10")?;
    let p11 = s.p("11")?;
    let p12 = s.p("12")?;
    let p13 = s.p("13")?;
    let p14 = s.p("14")?;
    let p20 = s.p("20")?;
    let hip_y = s.p("6")?.y;

    s.line(
        "Centre Back Guide",
        Stroke::Solid,
        Point2::new(p2.x, top_y),
        Point2::new(p2.x, hem_y),
    );
    let arm_top = s.maybe("16").map_or(top_y, |p| p.y);
    s.line(
        "Back Arm Line",
        Stroke::Dashed,
        Point2::new(p10.x, arm_top),
        Point2::new(p10.x, hip_y),
    );
    s.line(
        "Back Side Line 2",
        Stroke::Solid,
        Point2::new(p11.x, p10.y),
        Point2::new(p11.x, hem_y),
    );
    s.line("Front Side Line", Stroke::Dashed, p12, Point2::new(p12.x, hem_y));
    s.line(
        "Front Arm Line",
        Stroke::Dashed,
        Point2::new(p13.x, (top_y + 8.0).min(waist_y)),
        Point2::new(p13.x, waist_y),
    );
    s.line(
        "Centre Front (CF)",
        Stroke::Solid,
        Point2::new(p14.x, p20.y),
        Point2::new(p14.x, hem_y),
    );
    let hem_side = s.maybe("29Hem").unwrap_or(Point2::new(p12.x, hem_y));
    s.line("Front Hem Line", Stroke::Solid, Point2::new(p14.x, hem_y), hem_side);

    for (name, start, end) in [
        ("Hem Line", "3", "hemEnd"),
        ("Front Bust Line", "4", "bustEnd"),
        ("Front Waist Line", "5", "waistEnd"),
        ("Front Hip Line", "6", "hipEnd"),
    ] {
        let a = s.p(start)?;
        let b = s.p(end)?;
        s.line(name, Stroke::Dashed, a, b);
    }
    Some(())
}

pub(crate) fn frame_lines_step() -> Step<BodiceDerived> {
    Step::new("frame lines", frame_lines)
        .reads(&[
            "1", "2", "3", "4", "5", "6", "10", "11", "12", "13", "14", "16", "20", "29Hem",
            "hemEnd", "bustEnd", "waistEnd", "hipEnd",
        ])
        .draws(&[
            "Centre Back Guide",
            "Back Arm Line",
            "Back Side Line 2",
            "Front Side Line",
            "Front Arm Line",
            "Centre Front (CF)",
            "Front Hem Line",
            "Hem Line",
            "Front Bust Line",
            "Front Waist Line",
            "Front Hip Line",
        ])
}

// =============================================================================
// Armholes
// =============================================================================

/// Log the outcome of an armhole solve.
pub(crate) fn report_fit(name: &str, fit: &WaypointFit) {
    if fit.converged {
        debug!(
            "{name}: converged after {} iterations (t = {:.3}, handle {:.2} cm)",
            fit.iterations, fit.t, fit.handle_length
        );
    } else {
        warn!(
            "{name}: guide point missed by {:.4} cm after {} iterations",
            fit.residual, fit.iterations
        );
    }
}

fn front_armhole(s: &mut BodiceScope<'_>) -> Option<()> {
    let p24 = s.p("24")?;
    let p20a = s.p("20a")?;
    let p12 = s.p("12")?;
    let guide = s.p("13a")?;
    let p14 = s.p("14")?;

    let across = p14 - p12;
    let dir = unit(&across)?;
    let body = p12 - p24;
    let mut normal = unit(&perp(&(p24 - p20a))).or_else(|| unit(&perp(&body)))?;
    if normal.dot(&(guide - p24)) < 0.0 {
        normal = -normal;
    }
    let start_handle = p24 + normal * (body.norm() * 0.45).max(1.2);

    let params: WaypointParams = s.settings().front_armhole.into();
    let fit = solve_waypoint(
        p24,
        start_handle,
        p12,
        dir,
        guide,
        (across.norm() * 0.5).max(0.5),
        params,
    );
    report_fit("Front Armhole Curve", &fit);
    s.curve("Front Armhole Curve", Stroke::Solid, [CurveSegment::Cubic(fit.curve)]);
    s.value("FrontArmholeLength", fit.curve.length());
    Some(())
}

/// Two-segment back armhole: `start -> mid -> end`, passing `guide`.
///
/// The first segment leaves `start` toward `mid`. At `mid` the handles
/// hang below the anchor, level with `guide`. The second segment ends
/// on `end` with its handle toward `line_point`, and that handle's length
/// is solved so the curve passes through `guide`.
pub(crate) fn back_armhole_segments(
    start: Point2,
    mid: Point2,
    guide: Point2,
    end: Point2,
    line_point: Point2,
    params: WaypointParams,
) -> Option<([CurveSegment; 2], WaypointFit)> {
    let start_to_mid = mid - start;
    let start_dir = unit(&start_to_mid)?;
    let start_handle = start + start_dir * clamp_handle_length(start_to_mid.norm(), 0.35, 0.5, 5.0);

    let drop = (guide.y - mid.y).abs().max(0.5);
    let mid_out = Point2::new(guide.x + 1.0, mid.y + drop);
    let mid_in = mid - (mid_out - mid);

    let line_dir = unit(&(line_point - end)).or_else(|| unit(&(mid - end)))?;
    let fit = solve_waypoint(
        mid,
        mid_out,
        end,
        line_dir,
        guide,
        (end - guide).norm().max(0.5),
        params,
    );
    Some((
        [
            CurveSegment::cubic(start, start_handle, mid_in, mid),
            CurveSegment::Cubic(fit.curve),
        ],
        fit,
    ))
}

fn back_armhole(s: &mut BodiceScope<'_>) -> Option<()> {
    let start = s.p("backShoulderEnd")?;
    let p17 = s.p("17")?;
    let p17a = s.p("17a")?;
    let p11 = s.p("11")?;
    let p4 = s.p("4")?;
    let params = s.settings().back_armhole.into();
    let (segments, fit) = back_armhole_segments(start, p17, p17a, p11, p4, params)?;
    report_fit("Back Armhole Curve", &fit);
    s.curve("Back Armhole Curve", Stroke::Solid, segments);
    s.value(
        "BackArmholeLength",
        segments.iter().map(CurveSegment::length).sum(),
    );
    Some(())
}

// =============================================================================
// Variant
// =============================================================================

/// Step plan of the casual bodice.
pub fn casual_bodice_plan() -> Plan<BodiceDerived> {
    Plan::new("casual-bodice", Orientation::YDown)
        .step(derived_values_step())
        .step(neck_frame_step())
        .step(centre_back_frame_step())
        .step(widths_step(casual_widths))
        .step(back_shoulder_step(casual_back_shoulder, &["Back Shoulder Line"]))
        .step(shoulder_blade_step())
        .step(
            Step::new("armhole guide", armhole_guide)
                .reads(&["17", "10", "13"])
                .writes(&["17a", "18"])
                .draws(&["17a - 18"]),
        )
        .step(frame_ends_step())
        .step(back_side_step())
        .step(hip_line_step())
        .step(hip_balance_step())
        .step(back_side_seam_step())
        .step(centre_back_step())
        .step(front_side_seam_step())
        .step(front_neck_step())
        .step(front_shoulder_step())
        .step(bust_point_step())
        .step(frame_lines_step())
        .step(
            Step::new("front armhole", front_armhole)
                .reads(&["24", "20a", "12", "13a", "14"])
                .draws(&["Front Armhole Curve"]),
        )
        .step(
            Step::new("back armhole", back_armhole)
                .reads(&["backShoulderEnd", "17", "17a", "11", "4"])
                .draws(&["Back Armhole Curve"]),
        )
}

/// Draft a casual bodice from the measurements behind `input`.
pub fn draft_casual_bodice(
    input: &dyn InputSurface,
    settings: &DraftSettings,
) -> Result<DraftContext> {
    let measurements = BodiceMeasurements::read(input);
    let mut ctx = casual_bodice_plan().run(&measurements.derive(), settings)?;
    ctx.set_measurements(measurements.sheet);
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tailor_measure::HeadlessInput;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn default_draft() -> DraftContext {
        init_logging();
        draft_casual_bodice(&HeadlessInput::new(), &DraftSettings::default()).unwrap()
    }

    fn point(ctx: &DraftContext, label: &str) -> Point2 {
        ctx.point(label)
            .unwrap_or_else(|| panic!("missing point {label}"))
    }

    #[test]
    fn test_plan_is_valid() {
        let plan = casual_bodice_plan();
        plan.validate().unwrap();
        assert_eq!(plan.outputs().len(), 51);
    }

    #[test]
    fn test_default_scenario() {
        let ctx = default_draft();
        assert!(ctx.skipped().is_empty(), "skipped: {:?}", ctx.skipped());
        assert_eq!(ctx.points().len(), 51);
        assert!(ctx.points().len() >= 40);
        assert_eq!(ctx.value("RecommendedBalance"), Some(3.5));
        assert_eq!(ctx.value("BrW"), Some(47.0));
        assert_eq!(ctx.measurements().raw("BrC"), 88.0);
        for p in ctx.points() {
            assert!(p.point.x.is_finite() && p.point.y.is_finite(), "{}", p.label);
        }
    }

    #[test]
    fn test_frame_points() {
        let ctx = default_draft();
        assert_eq!(point(&ctx, "1a"), Point2::new(-7.0, 0.0));
        assert_relative_eq!(point(&ctx, "2").y, 6.5 / 3.0 + 1.0, epsilon = 1e-12);
        assert_relative_eq!(point(&ctx, "4").y, 24.5667, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "9").x, -0.6948, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "10").x, -17.6948, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "12").x, -39.8948, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "14").x, -62.6948, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "13a").y, 21.8667, epsilon = 1e-4);
    }

    #[test]
    fn test_back_shoulder_reaches_arm_line() {
        let ctx = default_draft();
        let p16 = point(&ctx, "16");
        assert_relative_eq!(p16.x, point(&ctx, "10").x, epsilon = 1e-12);
        assert_relative_eq!(p16.y, 3.4750, epsilon = 1e-4);
        let end = point(&ctx, "backShoulderEnd");
        assert_relative_eq!((end - point(&ctx, "1a")).norm(), 13.2, epsilon = 1e-9);
        let p17a = point(&ctx, "17a");
        assert_relative_eq!(p17a.x, -19.6948, epsilon = 1e-4);
        assert_relative_eq!(p17a.y, 19.2937, epsilon = 1e-4);
        assert_relative_eq!(point(&ctx, "18").y, p17a.y);
    }

    #[test]
    fn test_hip_shortage_symmetry() {
        let ctx = default_draft();
        let shift29 = point(&ctx, "29").x - point(&ctx, "27").x;
        let shift30 = point(&ctx, "30").x - point(&ctx, "28").x;
        assert_relative_eq!(shift29, -shift30, epsilon = 1e-12);
        assert!(shift29 > 0.0);

        let hig = ctx.value("HiG").unwrap();
        let half = ctx.value("HalfHipShortage").unwrap();
        assert!(hig < 51.0);
        assert_relative_eq!(hig + 2.0 * half, 51.0, epsilon = 1e-9);
        assert_relative_eq!(half, 2.6526, epsilon = 1e-4);
    }

    #[test]
    fn test_hip_balance_uses_magnitude() {
        let wide = HipBalance::new(30.0, 25.0, 51.0);
        assert_relative_eq!(wide.shortage, 4.0);
        assert_relative_eq!(wide.half_shift, 2.0);
        let narrow = HipBalance::new(20.0, 25.0, 51.0);
        assert_relative_eq!(narrow.half_shift, 3.0);
    }

    #[test]
    fn test_centre_back_ends_on_hem_connector() {
        let ctx = default_draft();
        assert_eq!(point(&ctx, "8"), point(&ctx, "hemConnector"));
        let cb = ctx.path("Centre Back (CB)").unwrap();
        assert_eq!(cb.segments.len(), 2);
        assert_relative_eq!(point(&ctx, "8").x, -2.4643, epsilon = 1e-4);
    }

    #[test]
    fn test_front_points() {
        let ctx = default_draft();
        assert_relative_eq!(point(&ctx, "20").y, 0.4667, epsilon = 1e-4);
        let p24 = point(&ctx, "24");
        assert_relative_eq!(p24.x, -44.6050, epsilon = 1e-4);
        assert_relative_eq!(p24.y, 5.1492, epsilon = 1e-4);
        let top = point(&ctx, "frontDartTop");
        assert_relative_eq!(top.x, -53.3948, epsilon = 1e-4);
        assert_relative_eq!(top.y, 1.5979, epsilon = 1e-4);
    }

    #[test]
    fn test_dart_top_fallbacks() {
        let a = Point2::new(0.0, 0.0);
        assert_eq!(dart_top_y(a, None, 1.0, 7.0), 7.0);
        assert_eq!(dart_top_y(a, Some(Point2::new(4.0, 2.0)), 2.0, 7.0), 1.0);
        assert_eq!(dart_top_y(a, Some(Point2::new(4.0, 2.0)), 5.0, 7.0), 7.0);
        assert_eq!(dart_top_y(a, Some(Point2::new(0.0, 3.0)), 0.0, 7.0), 3.0);
    }

    #[test]
    fn test_armholes_pass_their_guides() {
        let ctx = default_draft();
        let front = ctx.path("Front Armhole Curve").unwrap().curve_segments();
        assert_eq!(front.len(), 1);
        assert_eq!(front[0].start(), point(&ctx, "24"));
        assert_eq!(front[0].end(), point(&ctx, "12"));

        let guide = point(&ctx, "13a");
        let hit = front[0]
            .flatten(2000)
            .into_iter()
            .map(|p| (p - guide).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(hit < 0.01, "front armhole misses 13a by {hit}");

        let back = ctx.path("Back Armhole Curve").unwrap().curve_segments();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].end(), point(&ctx, "17"));
        assert_eq!(back[1].end(), point(&ctx, "11"));
        let guide = point(&ctx, "17a");
        let hit = back[1]
            .flatten(2000)
            .into_iter()
            .map(|p| (p - guide).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(hit < 0.01, "back armhole misses 17a by {hit}");
        assert!(ctx.value("BackArmholeLength").unwrap() > 0.0);
    }

    #[test]
    fn test_zero_back_shoulder_skips_dependents() {
        init_logging();
        let input = HeadlessInput::new().with_number("ShG", -1.0).with_number("ShGEase", 0.0);
        let ctx = draft_casual_bodice(&input, &DraftSettings::default()).unwrap();
        let skipped: Vec<_> = ctx.skipped().iter().map(|s| s.step.as_str()).collect();
        assert!(skipped.contains(&"back shoulder"));
        assert!(skipped.contains(&"front shoulder"));
        assert!(skipped.contains(&"shoulder blade"));
        assert!(ctx.point("16").is_none());
        assert!(ctx.point("30").is_some());
    }

    #[test]
    fn test_origin_moves_every_point() {
        init_logging();
        let mut settings = DraftSettings::default();
        settings.origin = crate::types::Point2D::new(10.0, 5.0);
        let moved = draft_casual_bodice(&HeadlessInput::new(), &settings).unwrap();
        let base = default_draft();
        for p in base.points() {
            let q = moved.point(&p.label).unwrap();
            assert_relative_eq!(q.x, p.point.x + 10.0, epsilon = 1e-9);
            assert_relative_eq!(q.y, p.point.y + 5.0, epsilon = 1e-9);
        }
    }
}
