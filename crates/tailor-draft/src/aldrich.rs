//! Close-fitting bodice block.
//!
//! One y-down rectangle from the back nape (point 0) to the front neck
//! (point 4), half the bust plus ease wide, with the back on the left and
//! the front on the right. The bust-waist difference is taken in by a
//! front waist dart, a back waist dart and a side dart shared by both
//! pieces. A back shoulder dart and a front neck dart shape the top.

use tailor_kernel_curve::{path_length, CurveSegment};
use tailor_kernel_math::{midpoint, unit, Point2, Vec2};
use tailor_measure::{AldrichDerived, AldrichMeasurements, InputSurface};

use crate::context::DraftContext;
use crate::error::Result;
use crate::plan::{Plan, Scope, Step};
use crate::settings::DraftSettings;
use crate::types::{Orientation, Stroke};

type AldrichScope<'a> = Scope<'a, AldrichDerived>;

/// Longest handle, as a share of its curve's chord.
const HANDLE_RATIO_CAP: f64 = 1.6;

/// Nape drop from point 0 to point 1 (cm).
const NAPE_DROP: f64 = 1.5;

/// Half width of the back shoulder dart on the shoulder line (cm).
const SHOULDER_DART_HALF: f64 = 0.5;

/// Darts narrower than this are not drawn.
const MIN_DART: f64 = 1e-4;

/// Slack on the waist line parameter when finding the dart centres.
const WAIST_T_SLACK: f64 = 1e-4;

/// `v` shortened to at most `HANDLE_RATIO_CAP` chords.
fn clamp_handle(v: Vec2, chord: f64) -> Vec2 {
    if !(chord > 0.0) {
        return Vec2::zeros();
    }
    let len = v.norm();
    let max = chord * HANDLE_RATIO_CAP;
    if len < 1e-4 || max >= len {
        v
    } else {
        v * (max / len)
    }
}

/// Cubic with handles `v1` at the start and `v2` at the end, both clamped.
fn capped_curve(start: Point2, end: Point2, v1: Vec2, v2: Vec2) -> CurveSegment {
    let chord = (end - start).norm();
    CurveSegment::cubic(
        start,
        start + clamp_handle(v1, chord),
        end + clamp_handle(v2, chord),
        end,
    )
}

/// Where the segment `a -> b` crosses the vertical `x`, within slack.
fn crossing_at_x(a: Point2, b: Point2, x: f64) -> Option<Point2> {
    let dx = b.x - a.x;
    if dx.abs() < 1e-6 {
        return None;
    }
    let t = (x - a.x) / dx;
    if !(-WAIST_T_SLACK..=1.0 + WAIST_T_SLACK).contains(&t) {
        return None;
    }
    Some(Point2::new(x, a.y + t * (b.y - a.y)))
}

fn frame(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    if !(d.half_bust_width > 0.0) {
        return None;
    }
    s.value("FrontNeckDart", d.front_neck_dart);
    s.value("FrontWaistDart", d.darts.front);
    s.value("BackWaistDart", d.darts.back);
    s.value("SideWaistDart", d.darts.side);
    s.value("BustWaistDiff", d.bust_waist_difference);
    s.value("MeasuredBustWaistDiff", d.measured_difference);

    let o = s.settings().origin;
    let at = |x: f64, y: f64| Point2::new(o.x + x, o.y + y);
    let w = d.half_bust_width;
    let bust_y = NAPE_DROP + d.armscye_depth + 0.5;
    let waist_y = NAPE_DROP + d.nape_to_waist;

    let p0 = s.set_marked("0", at(0.0, 0.0))?;
    let p1 = s.set_marked("1", at(0.0, NAPE_DROP))?;
    let p2 = s.set_marked("2", at(0.0, bust_y))?;
    let p3 = s.set_marked("3", at(w, bust_y))?;
    let p4 = s.set_marked("4", at(w, 0.0))?;
    let p5 = s.set_marked("5", at(0.0, waist_y))?;
    let p6 = s.set_marked("6", at(w, waist_y))?;
    let c = s.set("c", p6 + Vec2::new(0.0, 1.0))?;

    s.line("Waist Drop Guide", Stroke::Solid, p5, c);
    s.line("Bust Line", Stroke::Dashed, p2, p3);
    s.line("0 - 4", Stroke::Solid, p4, p0);
    s.line("Foundation Centre Back", Stroke::Solid, p0, p5);
    s.line("Waistline", Stroke::Dashed, p5, p6);
    s.line("Centre Back (CB)", Stroke::Solid, p1, p5);
    Some(())
}

fn necks(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p0 = s.p("0")?;
    let p1 = s.p("1")?;
    let p4 = s.p("4")?;
    let c = s.p("c")?;
    let fifth = d.neck_size / 5.0;

    let p9 = s.set_marked("9", Point2::new(p0.x + fifth - 0.2, p0.y))?;
    s.set_marked("10", Point2::new(p1.x, p1.y + d.armscye_depth / 5.0 - 0.7))?;
    let p20 = s.set_marked("20", Point2::new(p4.x - (fifth - 0.7), p4.y))?;
    let p21 = s.set_marked("21", Point2::new(p4.x, p4.y + fifth - 0.2))?;
    s.set_marked("27", Point2::new(p20.x - d.front_neck_dart, p20.y))?;

    s.curve(
        "Back Neck Curve",
        Stroke::Solid,
        [capped_curve(p1, p9, Vec2::new(4.3, 0.0), Vec2::new(-1.0, 1.0))],
    );
    s.curve(
        "Front Neck Curve",
        Stroke::Solid,
        [capped_curve(p20, p21, Vec2::new(0.0, 4.0), Vec2::new(-4.0, 0.0))],
    );
    s.line("Centre Front (CF)", Stroke::Solid, p21, c);
    s.line("CF Line", Stroke::Solid, p4, c);
    Some(())
}

/// Chest point 22 and the front neck dart, pivoting on 26 below the bust
/// line midway between 22 and the centre front.
fn bust(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p3 = s.p("3")?;
    let p20 = s.p("20")?;
    let p21 = s.p("21")?;
    let p27 = s.p("27")?;
    let p5 = s.p("5")?;

    let p22 = s.set_marked(
        "22",
        Point2::new(p3.x - d.chest / 2.0 - d.front_neck_dart / 2.0, p3.y),
    )?;
    if d.front_armhole_guide > 0.0 {
        let diag = d.front_armhole_guide / std::f64::consts::SQRT_2;
        let b = s.set("b", p22 - Vec2::new(diag, diag))?;
        s.line("Front Armhole Guideline", Stroke::Dashed, p22, b);
    }
    let p23 = s.set_marked("23", midpoint(&p3, &p22))?;
    s.set_marked("24", Point2::new(p23.x, p5.y))?;
    let p26 = s.set_marked("26", p23 + Vec2::new(0.0, 2.5))?;
    let p31 = s.set_marked("31", p22 + Vec2::new(0.0, (p21.y - p3.y) / 3.0))?;

    s.line("Front Neck Dart Left Leg", Stroke::Solid, p20, p26);
    s.line("Front Neck Dart Right Leg", Stroke::Solid, p27, p26);
    s.line("Chest Line", Stroke::Dashed, p22, p31);
    Some(())
}

/// Back shoulder from 9 at shoulder + 1 cm, with a 1 cm dart at its
/// midpoint whose legs meet at 13, 5 cm below.
fn back_shoulder(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p9 = s.p("9")?;
    let p10 = s.p("10")?;

    let reach = d.shoulder + 1.0;
    let rise = (p10.y - p9.y).abs();
    let run = if reach > rise {
        (reach * reach - rise * rise).max(0.0).sqrt()
    } else {
        0.0
    };
    let p11 = s.set_marked("11", Point2::new(p9.x + run, p10.y))?;
    let p12 = s.set_marked("12", midpoint(&p9, &p11))?;
    let corner = p12 + Vec2::new(0.0, 5.0);
    let p13 = s.set_marked("13", corner - Vec2::new(1.0, 0.0))?;
    s.polyline("Back Shoulder Dart Guide", Stroke::Dashed, &[p12, corner, p13], false);

    let along = unit(&(p11 - p9))?;
    let left = s.set("ShoulderDartLeft", p12 - along * SHOULDER_DART_HALF)?;
    let right = p12 + along * SHOULDER_DART_HALF;
    let leg = (left - p13).norm();
    let right = match unit(&(right - p13)) {
        Some(dir) if leg > 1e-4 => p13 + dir * leg,
        _ => right,
    };
    let right = s.set("ShoulderDartRight", right)?;

    s.polyline("Back Shoulder Dart", Stroke::Solid, &[left, p13, right], false);
    s.line("Back Shoulder Line", Stroke::Solid, p9, left);
    s.line("Back Shoulder Dart Right to 11", Stroke::Solid, right, p11);
    Some(())
}

/// Front shoulder from 27 at shoulder length down to the balance line
/// 1.5 cm below 11, kept within the 10 cm balance guide.
fn front_shoulder(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p11 = s.p("11")?;
    let p27 = s.p("27")?;

    let p28 = s.set_marked("28", p11 + Vec2::new(0.0, 1.5))?;
    let p29 = s.set_marked("29", p28 + Vec2::new(10.0, 0.0))?;
    let rise = (p28.y - p27.y).abs();
    let run = (d.shoulder.powi(2) - rise * rise).max(0.0).sqrt();
    let x = (p27.x - run).clamp(p28.x.min(p29.x), p28.x.max(p29.x));
    let p30 = s.set_marked("30", Point2::new(x, p28.y))?;

    s.line("Back Shoulder Drop", Stroke::Dashed, p11, p28);
    s.line("Shoulder Balance Line", Stroke::Dashed, p28, p29);
    s.line("Front Shoulder Line", Stroke::Solid, p27, p30);
    Some(())
}

fn back_width(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p2 = s.p("2")?;
    let p10 = s.p("10")?;
    let p22 = s.p("22")?;

    let p14 = s.set_marked("14", p2 + Vec2::new(d.back_width / 2.0 + 0.5, 0.0))?;
    if d.back_armhole_guide > 0.0 {
        let diag = d.back_armhole_guide / std::f64::consts::SQRT_2;
        let a = s.set("a", p14 + Vec2::new(diag, -diag))?;
        s.line("Back Armhole Guideline", Stroke::Dashed, p14, a);
    }
    let p15 = s.set_marked("15", Point2::new(p14.x, p10.y))?;
    s.set_marked("16", midpoint(&p14, &p15))?;
    s.set_marked("17", midpoint(&p2, &p14))?;
    s.set_marked("32", midpoint(&p14, &p22))?;
    s.line("Back Width Line", Stroke::Dashed, p14, p15);
    Some(())
}

fn armholes(s: &mut AldrichScope<'_>) -> Option<()> {
    let p11 = s.p("11")?;
    let p30 = s.p("30")?;
    let p32 = s.p("32")?;

    let back = capped_curve(p11, p32, Vec2::new(-3.2, 9.79), Vec2::new(-6.15, 0.0));
    let front = capped_curve(p30, p32, Vec2::new(7.0, 11.25), Vec2::new(6.47, 0.0));
    s.value("BackArmholeLength", path_length(&[back]));
    s.value("FrontArmholeLength", path_length(&[front]));
    s.curve("Back Armhole Curve", Stroke::Solid, [back]);
    s.curve("Front Armhole Curve", Stroke::Solid, [front]);
    Some(())
}

/// Dart centres d, e and f where the dropped waist line 5-c passes below
/// 17, 23 and 32.
fn waist_points(s: &mut AldrichScope<'_>) -> Option<()> {
    let p5 = s.p("5")?;
    let c = s.p("c")?;
    let p17 = s.p("17")?;
    let p23 = s.p("23")?;
    let p32 = s.p("32")?;

    s.set_marked("33", Point2::new(p32.x, p5.y))?;
    s.set_marked("18", Point2::new(p17.x, p5.y))?;
    for (label, top) in [("d", p17), ("e", p23), ("f", p32)] {
        let Some(hit) = crossing_at_x(p5, c, top.x) else {
            continue;
        };
        let (lo, hi) = (top.y.min(c.y) - 1e-3, top.y.max(c.y) + 1e-3);
        if (lo..=hi).contains(&hit.y) {
            s.set(label, hit)?;
        }
    }
    Some(())
}

fn front_waist_dart(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let e = s.p("e")?;
    let p26 = s.p("26")?;
    if !(d.darts.front > MIN_DART) {
        return Some(());
    }
    let half = d.darts.front / 2.0;
    let left = s.set("FrontDartLeft", e - Vec2::new(half, 0.0))?;
    let right = s.set("FrontDartRight", e + Vec2::new(half, 0.0))?;
    let apex = s.set("FrontDartApex", Point2::new(e.x, p26.y + d.dart_apex_offset))?;
    s.line("Front Waist Dart Left Leg", Stroke::Solid, left, apex);
    s.line("Front Waist Dart Right Leg", Stroke::Solid, right, apex);
    s.line("Front Waist Dart Bisector", Stroke::Dashed, apex, e);
    Some(())
}

/// Side dart from 32 down to f. One centimetre of the intake stays in the
/// seam, so each base sits `(w - 1) / 2` either side of f.
fn side_dart(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p5 = s.p("5")?;
    let c = s.p("c")?;
    let p32 = s.p("32")?;
    let f = s.p("f")?;
    s.line("Side", Stroke::Dashed, p32, f);
    if !(d.darts.side > MIN_DART) {
        return Some(());
    }
    let mut offset = (d.darts.side - 1.0) / 2.0;
    if !(offset >= 0.0) {
        offset = d.darts.side / 2.0;
    }
    let back = s.set("SideDartBack", f - Vec2::new(offset, 0.0))?;
    let front = s.set("SideDartFront", f + Vec2::new(offset, 0.0))?;
    s.line("Back Side Waist Dart", Stroke::Solid, back, p32);
    s.line("Front Side Waist Dart", Stroke::Solid, front, p32);
    s.line("Front Waist Line", Stroke::Solid, c, front);
    s.line("Back Waist Line", Stroke::Solid, p5, back);
    Some(())
}

fn back_waist_dart(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p17 = s.p("17")?;
    let dd = s.p("d")?;
    s.line("Back Waist Dart Bisector", Stroke::Dashed, p17, dd);
    if !(d.darts.back > MIN_DART) {
        return Some(());
    }
    let half = d.darts.back / 2.0;
    let left = s.set("BackDartLeft", dd - Vec2::new(half, 0.0))?;
    let right = s.set("BackDartRight", dd + Vec2::new(half, 0.0))?;
    s.line("Back Waist Dart Left Leg", Stroke::Solid, left, p17);
    s.line("Back Waist Dart Right Leg", Stroke::Solid, right, p17);
    Some(())
}

fn back_blade(s: &mut AldrichScope<'_>) -> Option<()> {
    let d = *s.data();
    let p1 = s.p("1")?;
    let p10 = s.p("10")?;
    s.line("Back Blade", Stroke::Solid, p10, p1);
    s.line(
        "Back Blade Guide",
        Stroke::Dashed,
        p10,
        p10 + Vec2::new(d.half_bust_width / 2.0, 0.0),
    );
    Some(())
}

/// Step plan of the close-fitting bodice.
pub fn aldrich_bodice_plan() -> Plan<AldrichDerived> {
    Plan::new("aldrich-bodice", Orientation::YDown)
        .step(
            Step::new("frame", frame)
                .writes(&["0", "1", "2", "3", "4", "5", "6", "c"])
                .draws(&[
                    "Waist Drop Guide",
                    "Bust Line",
                    "0 - 4",
                    "Foundation Centre Back",
                    "Waistline",
                    "Centre Back (CB)",
                ]),
        )
        .step(
            Step::new("necks", necks)
                .reads(&["0", "1", "4", "c"])
                .writes(&["9", "10", "20", "21", "27"])
                .draws(&[
                    "Back Neck Curve",
                    "Front Neck Curve",
                    "Centre Front (CF)",
                    "CF Line",
                ]),
        )
        .step(
            Step::new("bust", bust)
                .reads(&["3", "5", "20", "21", "27"])
                .writes(&["22", "b", "23", "24", "26", "31"])
                .draws(&[
                    "Front Armhole Guideline",
                    "Front Neck Dart Left Leg",
                    "Front Neck Dart Right Leg",
                    "Chest Line",
                ]),
        )
        .step(
            Step::new("back shoulder", back_shoulder)
                .reads(&["9", "10"])
                .writes(&["11", "12", "13", "ShoulderDartLeft", "ShoulderDartRight"])
                .draws(&[
                    "Back Shoulder Dart Guide",
                    "Back Shoulder Dart",
                    "Back Shoulder Line",
                    "Back Shoulder Dart Right to 11",
                ]),
        )
        .step(
            Step::new("front shoulder", front_shoulder)
                .reads(&["11", "27"])
                .writes(&["28", "29", "30"])
                .draws(&["Back Shoulder Drop", "Shoulder Balance Line", "Front Shoulder Line"]),
        )
        .step(
            Step::new("back width", back_width)
                .reads(&["2", "10", "22"])
                .writes(&["14", "a", "15", "16", "17", "32"])
                .draws(&["Back Armhole Guideline", "Back Width Line"]),
        )
        .step(
            Step::new("armholes", armholes)
                .reads(&["11", "30", "32"])
                .draws(&["Back Armhole Curve", "Front Armhole Curve"]),
        )
        .step(
            Step::new("waist points", waist_points)
                .reads(&["5", "c", "17", "23", "32"])
                .writes(&["33", "18", "d", "e", "f"]),
        )
        .step(
            Step::new("front waist dart", front_waist_dart)
                .reads(&["e", "26"])
                .writes(&["FrontDartLeft", "FrontDartRight", "FrontDartApex"])
                .draws(&[
                    "Front Waist Dart Left Leg",
                    "Front Waist Dart Right Leg",
                    "Front Waist Dart Bisector",
                ]),
        )
        .step(
            Step::new("side dart", side_dart)
                .reads(&["5", "c", "32", "f"])
                .writes(&["SideDartBack", "SideDartFront"])
                .draws(&[
                    "Side",
                    "Back Side Waist Dart",
                    "Front Side Waist Dart",
                    "Front Waist Line",
                    "Back Waist Line",
                ]),
        )
        .step(
            Step::new("back waist dart", back_waist_dart)
                .reads(&["17", "d"])
                .writes(&["BackDartLeft", "BackDartRight"])
                .draws(&[
                    "Back Waist Dart Bisector",
                    "Back Waist Dart Left Leg",
                    "Back Waist Dart Right Leg",
                ]),
        )
        .step(
            Step::new("back blade", back_blade)
                .reads(&["1", "10"])
                .draws(&["Back Blade", "Back Blade Guide"]),
        )
}

/// Draft the close-fitting bodice from the measurements behind `input`.
pub fn draft_aldrich_bodice(
    input: &dyn InputSurface,
    settings: &DraftSettings,
) -> Result<DraftContext> {
    let measurements = AldrichMeasurements::read(input);
    let mut ctx = aldrich_bodice_plan().run(&measurements.derive(), settings)?;
    ctx.set_measurements(measurements.sheet);
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tailor_measure::HeadlessInput;

    fn draft(input: &HeadlessInput) -> DraftContext {
        let _ = env_logger::builder().is_test(true).try_init();
        draft_aldrich_bodice(input, &DraftSettings::default()).unwrap()
    }

    fn point(ctx: &DraftContext, label: &str) -> Point2 {
        ctx.point(label)
            .unwrap_or_else(|| panic!("missing point {label}"))
    }

    fn assert_at(ctx: &DraftContext, label: &str, x: f64, y: f64) {
        let p = point(ctx, label);
        assert_relative_eq!(p.x, x, epsilon = 1e-5);
        assert_relative_eq!(p.y, y, epsilon = 1e-5);
    }

    #[test]
    fn test_plan_is_valid() {
        aldrich_bodice_plan().validate().unwrap();
    }

    #[test]
    fn test_default_frame() {
        let ctx = draft(&HeadlessInput::new());
        assert!(ctx.skipped().is_empty(), "skipped: {:?}", ctx.skipped());
        assert_at(&ctx, "2", 0.0, 23.0);
        assert_at(&ctx, "3", 49.0, 23.0);
        assert_at(&ctx, "5", 0.0, 42.5);
        assert_at(&ctx, "9", 7.2, 0.0);
        assert_at(&ctx, "10", 0.0, 5.0);
        assert_at(&ctx, "21", 49.0, 7.2);
        assert_at(&ctx, "22", 29.3, 23.0);
        assert_at(&ctx, "27", 35.3, 0.0);
        assert_at(&ctx, "31", 29.3, 17.733333);
        // Letter points carry no marker.
        assert!(ctx.markers().all(|(label, _)| label != "c" && label != "b"));
    }

    #[test]
    fn test_shoulders() {
        let ctx = draft(&HeadlessInput::new());
        assert_at(&ctx, "11", 19.470391, 5.0);
        assert_at(&ctx, "13", 12.335196, 7.5);
        assert_at(&ctx, "30", 24.91672, 6.5);
        assert_at(&ctx, "ShoulderDartRight", 13.852792, 2.509246);
        let p13 = point(&ctx, "13");
        let left = (point(&ctx, "ShoulderDartLeft") - p13).norm();
        let right = (point(&ctx, "ShoulderDartRight") - p13).norm();
        assert_relative_eq!(left, right, epsilon = 1e-9);
        let front = (point(&ctx, "30") - point(&ctx, "27")).norm();
        assert_relative_eq!(front, 12.25, epsilon = 1e-9);
    }

    #[test]
    fn test_waist_darts() {
        let ctx = draft(&HeadlessInput::new());
        assert_at(&ctx, "d", 8.85, 42.680612);
        assert_at(&ctx, "e", 39.15, 43.29898);
        assert_at(&ctx, "f", 23.5, 42.979592);
        let front = point(&ctx, "FrontDartRight").x - point(&ctx, "FrontDartLeft").x;
        assert_relative_eq!(front, 4.5, epsilon = 1e-9);
        assert_at(&ctx, "FrontDartApex", 39.15, 28.0);
        let back = point(&ctx, "BackDartRight").x - point(&ctx, "BackDartLeft").x;
        assert_relative_eq!(back, 3.5, epsilon = 1e-9);
        // One centimetre of the side intake stays in the seam.
        let side = point(&ctx, "SideDartFront").x - point(&ctx, "SideDartBack").x;
        assert_relative_eq!(side, 3.0, epsilon = 1e-9);
        assert_eq!(ctx.value("BustWaistDiff"), Some(12.0));
    }

    #[test]
    fn test_handles_are_capped_by_chord() {
        let long = clamp_handle(Vec2::new(30.0, 40.0), 10.0);
        assert_relative_eq!(long.norm(), 16.0, epsilon = 1e-12);
        assert_eq!(clamp_handle(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
        assert_eq!(clamp_handle(Vec2::new(3.0, 4.0), 0.0), Vec2::zeros());

        let ctx = draft(&HeadlessInput::new());
        let neck = ctx.path("Back Neck Curve").unwrap().curve_segments()[0].as_cubic();
        assert_relative_eq!(neck.p1.x, 4.3, epsilon = 1e-9);
        assert_relative_eq!(neck.p1.y, 1.5, epsilon = 1e-9);
        assert_relative_eq!(neck.p2.x, 6.2, epsilon = 1e-9);
        assert_relative_eq!(neck.p2.y, 1.0, epsilon = 1e-9);
        let chord = (point(&ctx, "32") - point(&ctx, "11")).norm();
        assert!(ctx.value("BackArmholeLength").unwrap() > chord);
    }

    #[test]
    fn test_reduced_darting_narrows_darts() {
        let ctx = draft(&HeadlessInput::new().with_flag("ReducedDarting"));
        assert!(ctx.skipped().is_empty());
        let width = point(&ctx, "FrontDartRight").x - point(&ctx, "FrontDartLeft").x;
        assert_relative_eq!(width, 3.375, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_back_dart_keeps_bisector() {
        let ctx = draft(
            &HeadlessInput::new()
                .with_number("BackWaistDart", 0.0)
                .with_flag("BackWaistDartOverride"),
        );
        assert!(ctx.path("Back Waist Dart Bisector").is_some());
        assert!(ctx.path("Back Waist Dart Left Leg").is_none());
        assert!(!ctx.contains("BackDartLeft"));
    }
}
