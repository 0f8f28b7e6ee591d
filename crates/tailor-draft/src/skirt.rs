//! Basic straight skirt.
//!
//! A y-down rectangle from centre front (x = 0) to centre back (x = HiW),
//! split by the side line at half the hip width. The waist difference is
//! taken in by a side dart at the raised side point 10, one front dart and
//! one or two back darts.

use tailor_kernel_curve::CurveSegment;
use tailor_kernel_geom::extend_line_to_y;
use tailor_kernel_math::{lerp, Point2, Vec2};
use tailor_measure::{HipProfile, InputSurface, SkirtDerived, SkirtMeasurements};

use crate::context::DraftContext;
use crate::error::Result;
use crate::plan::{Plan, Scope, Step};
use crate::settings::DraftSettings;
use crate::types::{Orientation, Stroke};

type SkirtScope<'a> = Scope<'a, SkirtDerived>;

/// Height of the shared hip curve handle above the hip line (cm).
const HIP_CURVE_HANDLE: f64 = 10.5;

/// Half width of the dashed dart guides (cm).
const DART_GUIDE_HALF: f64 = 2.5;

/// Half width of the upper waist shaping guide (cm).
const WAIST_GUIDE_HALF: f64 = 6.0;

/// Shortest front dart (cm).
const MIN_FRONT_DART_LENGTH: f64 = 10.0;

/// Rise of the front dart top above the waist line.
fn front_dart_rise(profile: HipProfile) -> f64 {
    match profile {
        HipProfile::Curvy => 0.7,
        _ => 0.5,
    }
}

/// Rise of the back dart guides above the waist line.
fn back_dart_rise(profile: HipProfile) -> f64 {
    match profile {
        HipProfile::Curvy => 0.5,
        _ => 0.3,
    }
}

fn frame(s: &mut SkirtScope<'_>) -> Option<()> {
    let d = *s.data();
    if !(d.hiw > 0.0) {
        return None;
    }
    s.value("HiW", d.hiw);
    s.value("WaW", d.waw);
    s.value("WaistDiff", d.waist_diff);
    s.value("SideDart", d.darts.side);
    s.value("FrontDart", d.darts.front);
    s.value("BackDart1", d.darts.back1);
    s.value("BackDart2", d.darts.back2);
    s.value("DartSum", d.dart_sum);
    s.value("ManualDartSum", d.manual_dart_sum);
    s.value("WaDif", d.wa_dif);
    s.value("HiDCons", d.hid_cons);
    s.value("MoLCons", d.mol_cons);

    let o = s.settings().origin;
    let at = |x: f64, y: f64| Point2::new(o.x + x, o.y + y);
    let half = d.hiw / 2.0;
    let p1 = s.set_marked("1", at(0.0, 0.0))?;
    let p2 = s.set_marked("2", at(0.0, d.mol))?;
    let p3 = s.set_marked("3", at(0.0, d.hid))?;
    let p4 = s.set_marked("4", at(d.hiw, 0.0))?;
    let p5 = s.set_marked("5", at(d.hiw, d.mol))?;
    let p6 = s.set_marked("6", at(d.hiw, d.hid))?;
    let p7 = s.set_marked("7", at(half, 0.0))?;
    let p8 = s.set_marked("8", at(half, d.mol))?;
    s.set_marked("9", at(half, d.hid))?;

    s.line("Centre Front Line", Stroke::Solid, p1, p2);
    s.line("Waist Line", Stroke::Solid, p1, p4);
    s.line("Centre Back Line", Stroke::Solid, p4, p5);
    s.line("Hem Line", Stroke::Solid, p5, p2);
    s.line("Side Line", Stroke::Solid, p7, p8);
    s.line("Hip Line", Stroke::Dashed, p3, p6);
    Some(())
}

fn side_dart(s: &mut SkirtScope<'_>) -> Option<()> {
    let d = *s.data();
    let p7 = s.p("7")?;
    let p9 = s.p("9")?;
    let half = (d.darts.side / 2.0).max(0.0);

    let p10 = s.set_marked("10", p7 - Vec2::new(0.0, d.waist_shaping))?;
    let p11 = s.set("11", p10 - Vec2::new(half, 0.0))?;
    let p12 = s.set("12", p10 + Vec2::new(half, 0.0))?;
    s.line("Waist Shaping Guide", Stroke::Solid, p7, p10);
    s.line(
        "Upper Waist Shaping Guide",
        Stroke::Dashed,
        p10 - Vec2::new(WAIST_GUIDE_HALF, 0.0),
        p10 + Vec2::new(WAIST_GUIDE_HALF, 0.0),
    );

    if half > 0.0 {
        s.mark("11");
        s.mark("12");
        s.line("Side Dart Left", Stroke::Solid, p10, p11);
        s.line("Side Dart Right", Stroke::Solid, p10, p12);
        let handle = Point2::new(p7.x, p9.y - HIP_CURVE_HANDLE);
        s.curve(
            "Front Hip Curve",
            Stroke::Solid,
            [CurveSegment::cubic(p11, p11, handle, p9)],
        );
        s.curve(
            "Back Hip Curve",
            Stroke::Solid,
            [CurveSegment::cubic(p12, p12, handle, p9)],
        );
    }
    Some(())
}

/// Dart legs from the tops at `x ± half` on `top_y` down to `base`.
fn dart_legs(
    s: &mut SkirtScope<'_>,
    labels: (&str, &str),
    names: (&str, &str),
    centre: Point2,
    top_y: f64,
    half: f64,
    base: Point2,
) -> Option<()> {
    let left = s.set(labels.0, Point2::new(centre.x - half, top_y))?;
    let right = s.set(labels.1, Point2::new(centre.x + half, top_y))?;
    if half > 0.0 {
        s.line(names.0, Stroke::Solid, left, base);
        s.line(names.1, Stroke::Solid, right, base);
    }
    Some(())
}

fn front_dart(s: &mut SkirtScope<'_>) -> Option<()> {
    let d = *s.data();
    let waist_y = s.p("1")?.y;
    let p9 = s.p("9")?;
    let p11 = s.p("11")?;

    let hip_at_waist = extend_line_to_y(&p11, &p9, waist_y);
    let p13 = s.set_marked(
        "13",
        Point2::new(hip_at_waist.x - d.waist_circumference / 10.0, waist_y),
    )?;
    let length = d.front_dart_length.max(MIN_FRONT_DART_LENGTH);
    let base = s.set("13Base", p13 + Vec2::new(0.0, length))?;
    let top_y = p13.y - front_dart_rise(d.hip_profile);

    s.line(
        "Front Dart Guide",
        Stroke::Dashed,
        Point2::new(p13.x - DART_GUIDE_HALF, top_y),
        Point2::new(p13.x + DART_GUIDE_HALF, top_y),
    );
    s.line("Front Dart Centre", Stroke::Dashed, p13, base);
    dart_legs(
        s,
        ("13Left", "13Right"),
        ("Front Dart Left", "Front Dart Right"),
        p13,
        top_y,
        (d.darts.front / 2.0).max(0.0),
        base,
    )
}

/// First back dart. With a second dart it sits a third of the way from
/// centre back to the side, otherwise halfway.
fn back_dart(s: &mut SkirtScope<'_>) -> Option<()> {
    let d = *s.data();
    let p4 = s.p("4")?;
    let p9 = s.p("9")?;
    let p12 = s.p("12")?;
    let waist_y = p4.y;

    let side_at_waist = s.set("backHipWaist", extend_line_to_y(&p12, &p9, waist_y))?;
    let second = d.darts.has_second_back_dart();
    let share = if second { 1.0 / 3.0 } else { 0.5 };
    let p14 = s.set_marked("14", lerp(&p4, &side_at_waist, share))?;
    let base = s.set("14Base", p14 + Vec2::new(0.0, d.back_dart_length1.max(0.0)))?;
    let half = (d.darts.back1 / 2.0).max(0.0);

    let top_y = if second {
        p14.y
    } else {
        let guide_y = p14.y - back_dart_rise(d.hip_profile);
        s.line(
            "Back Dart Guide",
            Stroke::Dashed,
            Point2::new(p14.x - DART_GUIDE_HALF, guide_y),
            Point2::new(p14.x + DART_GUIDE_HALF, guide_y),
        );
        guide_y
    };
    if d.back_dart_length1 > 0.0 {
        s.line("1st Back Dart Centre", Stroke::Dashed, p14, base);
    }
    dart_legs(
        s,
        ("14Left", "14Right"),
        ("First Back Dart Left", "First Back Dart Right"),
        p14,
        top_y,
        half,
        base,
    )
}

fn second_back_dart(s: &mut SkirtScope<'_>) -> Option<()> {
    let d = *s.data();
    if !d.darts.has_second_back_dart() {
        return Some(());
    }
    let left = s.p("14Left")?;
    let side_at_waist = s.p("backHipWaist")?;

    let p15 = s.set_marked("15", lerp(&left, &side_at_waist, 0.5))?;
    let base = s.set("15Base", p15 + Vec2::new(0.0, d.back_dart_length2.max(0.0)))?;
    let top_y = p15.y - back_dart_rise(d.hip_profile);
    s.line(
        "Second Back Dart Guide",
        Stroke::Dashed,
        Point2::new(p15.x - DART_GUIDE_HALF, top_y),
        Point2::new(p15.x + DART_GUIDE_HALF, top_y),
    );
    if d.back_dart_length2 > 0.0 {
        s.line("2nd Back Dart Centre", Stroke::Dashed, p15, base);
    }
    dart_legs(
        s,
        ("15Left", "15Right"),
        ("Second Back Dart Left", "Second Back Dart Right"),
        p15,
        top_y,
        (d.darts.back2 / 2.0).max(0.0),
        base,
    )
}

/// Step plan of the basic skirt.
pub fn basic_skirt_plan() -> Plan<SkirtDerived> {
    Plan::new("basic-skirt", Orientation::YDown)
        .step(
            Step::new("frame", frame)
                .writes(&["1", "2", "3", "4", "5", "6", "7", "8", "9"])
                .draws(&[
                    "Centre Front Line",
                    "Waist Line",
                    "Centre Back Line",
                    "Hem Line",
                    "Side Line",
                    "Hip Line",
                ]),
        )
        .step(
            Step::new("side dart", side_dart)
                .reads(&["7", "9"])
                .writes(&["10", "11", "12"])
                .draws(&[
                    "Waist Shaping Guide",
                    "Upper Waist Shaping Guide",
                    "Side Dart Left",
                    "Side Dart Right",
                    "Front Hip Curve",
                    "Back Hip Curve",
                ]),
        )
        .step(
            Step::new("front dart", front_dart)
                .reads(&["1", "9", "11"])
                .writes(&["13", "13Base", "13Left", "13Right"])
                .draws(&[
                    "Front Dart Guide",
                    "Front Dart Centre",
                    "Front Dart Left",
                    "Front Dart Right",
                ]),
        )
        .step(
            Step::new("back dart", back_dart)
                .reads(&["4", "9", "12"])
                .writes(&["backHipWaist", "14", "14Base", "14Left", "14Right"])
                .draws(&[
                    "Back Dart Guide",
                    "1st Back Dart Centre",
                    "First Back Dart Left",
                    "First Back Dart Right",
                ]),
        )
        .step(
            Step::new("second back dart", second_back_dart)
                .reads(&["14Left", "backHipWaist"])
                .writes(&["15", "15Base", "15Left", "15Right"])
                .draws(&[
                    "Second Back Dart Guide",
                    "2nd Back Dart Centre",
                    "Second Back Dart Left",
                    "Second Back Dart Right",
                ]),
        )
}

/// Draft a basic skirt from the measurements behind `input`.
pub fn draft_basic_skirt(input: &dyn InputSurface, settings: &DraftSettings) -> Result<DraftContext> {
    let measurements = SkirtMeasurements::read(input);
    let mut ctx = basic_skirt_plan().run(&measurements.derive(), settings)?;
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
        draft_basic_skirt(input, &DraftSettings::default()).unwrap()
    }

    fn point(ctx: &DraftContext, label: &str) -> Point2 {
        ctx.point(label)
            .unwrap_or_else(|| panic!("missing point {label}"))
    }

    #[test]
    fn test_plan_is_valid() {
        basic_skirt_plan().validate().unwrap();
    }

    #[test]
    fn test_default_frame() {
        let ctx = draft(&HeadlessInput::new());
        assert!(ctx.skipped().is_empty(), "skipped: {:?}", ctx.skipped());
        assert_eq!(point(&ctx, "5"), Point2::new(50.0, 50.0));
        assert_eq!(point(&ctx, "9"), Point2::new(25.0, 21.0));
        assert_eq!(point(&ctx, "10"), Point2::new(25.0, -1.0));
        assert_relative_eq!(point(&ctx, "11").x, 21.75);
        assert_relative_eq!(point(&ctx, "12").x, 28.25);
        assert_eq!(ctx.value("DartSum"), Some(13.0));
        let markers: Vec<_> = ctx.markers().map(|(label, _)| label).collect();
        assert_eq!(markers.len(), 15);
    }

    #[test]
    fn test_hip_curves_share_handle() {
        let ctx = draft(&HeadlessInput::new());
        let front = ctx.path("Front Hip Curve").unwrap().curve_segments()[0].as_cubic();
        let back = ctx.path("Back Hip Curve").unwrap().curve_segments()[0].as_cubic();
        assert_eq!(front.p2, back.p2);
        assert_eq!(front.p2, Point2::new(25.0, 10.5));
        assert_eq!(front.p0, front.p1);
        assert_eq!(front.p3, point(&ctx, "9"));
    }

    #[test]
    fn test_front_dart() {
        let ctx = draft(&HeadlessInput::new());
        let p13 = point(&ctx, "13");
        assert_relative_eq!(p13.x, 14.697727, epsilon = 1e-6);
        assert_eq!(p13.y, 0.0);
        assert_relative_eq!(point(&ctx, "13Base").y, 10.0);
        let left = point(&ctx, "13Left");
        let right = point(&ctx, "13Right");
        assert_relative_eq!(right.x - left.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(left.y, -0.5);
    }

    #[test]
    fn test_two_back_darts() {
        let ctx = draft(&HeadlessInput::new());
        let p14 = point(&ctx, "14");
        assert_relative_eq!(p14.x, 42.700758, epsilon = 1e-6);
        assert_relative_eq!(point(&ctx, "14Base").y, 14.5);
        // With a second dart the first dart's legs start on the waist.
        assert_eq!(point(&ctx, "14Left").y, 0.0);
        assert!(ctx.path("Back Dart Guide").is_none());

        let p15 = point(&ctx, "15");
        assert_relative_eq!(p15.x, 34.426515, epsilon = 1e-6);
        assert_relative_eq!(point(&ctx, "15Left").y, -0.3);
        assert_relative_eq!(point(&ctx, "15Base").y, 13.0);
        assert!(ctx.path("Second Back Dart Left").is_some());
    }

    #[test]
    fn test_curvy_single_back_dart() {
        let ctx = draft(&HeadlessInput::new().with_text("HipProfile", "Curvy"));
        assert_eq!(point(&ctx, "10").y, -1.5);
        assert!(!ctx.contains("15"));
        assert!(ctx.path("Second Back Dart Guide").is_none());
        assert!(ctx.skipped().is_empty());

        let p14 = point(&ctx, "14");
        let side = point(&ctx, "backHipWaist");
        assert_relative_eq!(p14.x, (50.0 + side.x) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(point(&ctx, "14Left").y, -0.5);
        assert_relative_eq!(point(&ctx, "13Left").y, -0.7);
        assert!(ctx.path("Back Dart Guide").is_some());
    }

    #[test]
    fn test_no_side_dart_without_waist_difference() {
        let input = HeadlessInput::new()
            .with_number("WaC", 97.0)
            .with_number("WaistEase", 3.0);
        let ctx = draft(&input);
        assert_eq!(point(&ctx, "11"), point(&ctx, "10"));
        assert!(ctx.path("Side Dart Left").is_none());
        assert!(ctx.path("Front Dart Left").is_none());
        let markers: Vec<_> = ctx.markers().map(|(label, _)| label).collect();
        assert!(!markers.contains(&"11"));
    }

    #[test]
    fn test_origin_offset() {
        let mut settings = DraftSettings::default();
        settings.origin = crate::types::Point2D::new(3.0, 4.0);
        let ctx = draft_basic_skirt(&HeadlessInput::new(), &settings).unwrap();
        assert_eq!(point(&ctx, "1"), Point2::new(3.0, 4.0));
        assert_relative_eq!(point(&ctx, "13").y, 4.0);
        assert_relative_eq!(point(&ctx, "14Base").y, 18.5);
    }
}
