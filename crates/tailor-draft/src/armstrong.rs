//! Inch-based front and back bodice.
//!
//! The front is drafted leftward from A on the centre front, the back
//! rightward from BA, 10 cm to the right of A, with both waists on the
//! same level. Measurements come in inches and every step works in cm.
//! Curves take their handles as ratios of the chord: a tangential share
//! along the chord and a normal share across it.

use tailor_kernel_curve::CurveSegment;
use tailor_kernel_geom::circle_circle_intersection;
use tailor_kernel_math::{midpoint, unit, Point2, Vec2};
use tailor_measure::{ArmstrongDerived, ArmstrongMeasurements, InputSurface, CM_PER_INCH};

use crate::context::DraftContext;
use crate::error::Result;
use crate::plan::{Plan, Scope, Step};
use crate::settings::DraftSettings;
use crate::types::{Orientation, Stroke};

type ArmstrongScope<'a> = Scope<'a, ArmstrongDerived>;

const fn inch(v: f64) -> f64 {
    v * CM_PER_INCH
}

const EIGHTH: f64 = inch(0.125);
const QUARTER: f64 = inch(0.25);

/// Gap between the front centre line and the back centre line (cm).
pub const ARMSTRONG_BACK_GAP: f64 = 10.0;

/// Drop of F below the waist line.
const DART_PLACEMENT_DROP: f64 = inch(0.1875);

/// Drop of the bust point guide below K.
const DART_REDUCTION: f64 = inch(0.625);

/// Back waist dart intake.
const BACK_DART_INTAKE: f64 = inch(1.5);

/// Extension of every back dart leg past its base point.
const DART_LEG_EXTENSION: f64 = inch(0.125);

const SIDE_GUIDE: f64 = inch(11.0);
const BACK_SIDE_GUIDE: f64 = inch(10.0);
const SHOULDER_GUIDE: f64 = inch(4.0);
const BACK_SHOULDER_GUIDE: f64 = inch(6.0);

/// `len` toward the front side seam, which lies left of the centre front.
fn left(len: f64) -> Vec2 {
    Vec2::new(-len, 0.0)
}

fn down(len: f64) -> Vec2 {
    Vec2::new(0.0, len)
}

/// Handle at `base` from chord ratios of `start -> end`.
///
/// The normal is the chord direction turned toward the pattern's outside,
/// `(t.y, -t.x)` in draft coordinates.
fn ratio_handle(
    base: Point2,
    start: Point2,
    end: Point2,
    tangent: f64,
    normal: f64,
) -> Option<Point2> {
    let chord = end - start;
    let length = chord.norm();
    let t = unit(&chord)?;
    let n = Vec2::new(t.y, -t.x);
    Some(base + (t * tangent + n * normal) * length)
}

/// Cubic from `start` to `end` with both handles given as chord ratios.
fn ratio_curve(
    start: Point2,
    end: Point2,
    start_ratio: (f64, f64),
    end_ratio: (f64, f64),
) -> Option<CurveSegment> {
    let h1 = ratio_handle(start, start, end, start_ratio.0, start_ratio.1)?;
    let h2 = ratio_handle(end, start, end, end_ratio.0, end_ratio.1)?;
    Some(CurveSegment::cubic(start, h1, h2, end))
}

/// Root of `a t² + b t + c` inside `[lo, hi]`; `prefer` breaks ties.
///
/// A negative discriminant counts as zero. With no root in range the first
/// root is clamped.
fn root_in(a: f64, b: f64, c: f64, lo: f64, hi: f64, prefer: fn(f64, f64) -> f64) -> f64 {
    if a == 0.0 {
        return lo;
    }
    let disc = (b * b - 4.0 * a * c).max(0.0).sqrt();
    let t1 = (-b + disc) / (2.0 * a);
    let t2 = (-b - disc) / (2.0 * a);
    let inside = |t: f64| (lo..=hi).contains(&t);
    match (inside(t1), inside(t2)) {
        (true, true) => prefer(t1, t2),
        (true, false) => t1,
        (false, true) => t2,
        (false, false) => t1.clamp(lo, hi),
    }
}

/// `to` moved along `from -> to` so the leg is `extra` longer.
fn extend_leg(from: Point2, to: Point2, extra: f64) -> Option<Point2> {
    let dir = unit(&(to - from))?;
    Some(from + dir * ((to - from).norm() + extra))
}

// =============================================================================
// Front
// =============================================================================

fn front_frame(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    if !(d.full_length > 0.0) {
        return None;
    }
    s.value("BustCupOffset", d.cup_offset);

    let o = s.settings().origin;
    let a = s.set_marked("A", Point2::new(o.x, o.y))?;
    let b = s.set_marked("B", a + down(d.full_length + EIGHTH))?;
    let c = s.set_marked("C", a + left(d.across_shoulder - EIGHTH))?;
    let pd = s.set_marked("D", b - down(d.centre_front_length))?;
    let e = s.set_marked("E", b + left(d.bust_arc + QUARTER))?;

    s.line("Full Length", Stroke::Solid, a, b);
    s.line("Front Across Shoulder", Stroke::Solid, a, c);
    s.line("B-D", Stroke::Solid, b, pd);
    s.line("Front Neck Guide 1", Stroke::Dashed, pd, pd + left(inch(4.0)));
    s.line("Bust Arc", Stroke::Solid, b, e);
    s.line("Side Guide Line", Stroke::Solid, e, e - down(SIDE_GUIDE));
    s.line("Shoulder Slope Guide", Stroke::Dashed, c, c + down(SHOULDER_GUIDE));
    Some(())
}

/// G on the shoulder guide at shoulder slope from B, H at bust depth from
/// G, and I on the across shoulder line at shoulder length from G.
fn front_shoulder(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let a = s.p("A")?;
    let b = s.p("B")?;
    let c = s.p("C")?;
    let pd = s.p("D")?;

    let run = (c.x - b.x).abs();
    let rise = (d.shoulder_slope.powi(2) - run * run).max(0.0).sqrt();
    let gy = (b.y - rise).clamp(c.y, c.y + SHOULDER_GUIDE);
    let g = s.set_marked("G", Point2::new(c.x, gy))?;
    s.set_marked("H", g + unit(&(b - g))? * d.bust_depth)?;

    let ac = c - a;
    let w = a - g;
    let t = root_in(
        ac.norm_squared(),
        2.0 * w.dot(&ac),
        w.norm_squared() - d.shoulder_length.powi(2),
        0.0,
        1.0,
        |t1, t2| if (t1 - 1.0).abs() < (t2 - 1.0).abs() { t1 } else { t2 },
    );
    let i = s.set_marked("I", a + ac * t)?;

    s.line("Shoulder Slope", Stroke::Solid, b, g);
    s.line("Shoulder Length", Stroke::Solid, g, i);
    s.curve(
        "D-I Arc",
        Stroke::Solid,
        [CurveSegment::cubic(pd, pd + left(inch(1.8)), i + down(inch(1.8)), i)],
    );

    // Square off the shoulder at I down to the neck guide.
    let across = unit(&(i - g)).map(|u| Vec2::new(-u.y, u.x));
    let drop = match across {
        Some(n) if n.y != 0.0 => i + n * ((pd.y - i.y) / n.y),
        _ => i,
    };
    s.line("Front Neck Guide 2", Stroke::Dashed, i, drop);
    Some(())
}

fn bust_lines(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let b = s.p("B")?;
    let pd = s.p("D")?;
    let h = s.p("H")?;

    let j = s.set_marked("J", Point2::new(b.x, h.y))?;
    let l = s.set_marked("L", Point2::new(b.x, pd.y + (j.y - pd.y) / 2.0))?;
    let k = s.set_marked("K", j + left(d.bust_span + QUARTER))?;
    let k_drop = s.set("KDrop", k + down(DART_REDUCTION))?;
    let m = s.set_marked("M", l + left(d.across_chest + QUARTER))?;

    s.line("Dart Reduction", Stroke::Dashed, k, k_drop);
    s.line("Bust Span", Stroke::Solid, j, k);
    s.line("Across Chest", Stroke::Solid, l, m);
    s.line(
        "Front Armhole Guide Line",
        Stroke::Dashed,
        m - down(inch(2.0)),
        m + down(inch(1.0)),
    );
    Some(())
}

fn front_waist(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let b = s.p("B")?;
    let k_drop = s.p("KDrop")?;
    let top = s.set("FTop", b + left(d.dart_placement))?;
    let f = s.set_marked("F", top + down(DART_PLACEMENT_DROP))?;
    s.line("Dart Placement Guide", Stroke::Solid, top, f);
    s.line("Front Waist Line 2", Stroke::Solid, b, f);
    s.line("K-F", Stroke::Solid, k_drop, f);
    Some(())
}

/// N on the side guide at new strap from I, O a side length above N, and
/// P swung out from N by the cup offset keeping O-P at side length.
fn front_side(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let e = s.p("E")?;
    let g = s.p("G")?;
    let i = s.p("I")?;

    let strap = d.new_strap + EIGHTH;
    let dx = e.x - i.x;
    let dy = (strap * strap - dx * dx).max(0.0).sqrt();
    let (top, bottom) = (e.y - SIDE_GUIDE, e.y);
    let on_guide = |y: f64| (top..=bottom).contains(&y);
    let (c1, c2) = (i.y + dy, i.y - dy);
    let ny = match (on_guide(c1), on_guide(c2)) {
        (false, true) => c2,
        (true, true) if (c1 - bottom).abs() < (c2 - bottom).abs() => c1,
        (true, true) => c2,
        (true, false) => c1,
        (false, false) => c1.clamp(top, bottom),
    };
    let n = s.set_marked("N", Point2::new(e.x, ny))?;
    let o = s.set_marked("O", n - down(d.side_length))?;

    let base = n + left(d.cup_offset);
    let swung = if d.side_length > 0.0 && d.cup_offset > 0.0 {
        circle_circle_intersection(&o, d.side_length, &n, d.cup_offset).and_then(|hit| {
            hit.points().into_iter().min_by(|p, q| {
                (p - base).norm_squared().total_cmp(&(q - base).norm_squared())
            })
        })
    } else {
        None
    };
    let p = match swung {
        Some(p) => p,
        None => match unit(&(base - o)) {
            Some(dir) if d.side_length > 0.0 => o + dir * d.side_length,
            _ => base,
        },
    };
    let p = s.set_marked("P", p)?;

    s.line("New Strap", Stroke::Solid, i, n);
    s.line("Provisional Side Length", Stroke::Solid, n, o);
    let arc = ratio_curve(g, o, (0.5295, 0.494), (-0.1495, 0.3325))?;
    let mut arc = arc.as_cubic();
    arc.p1.x += inch(0.15);
    s.curve(
        "G-O Arc",
        Stroke::Solid,
        [CurveSegment::cubic(arc.p0, arc.p1, arc.p2, arc.p3)],
    );
    s.line("Side Length OP", Stroke::Solid, o, p);
    Some(())
}

/// Q on P-F so the waist measures the waist arc, then pulled onto the
/// circle through F about the bust point so both dart legs match.
fn front_dart(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let p = s.p("P")?;
    let f = s.p("F")?;
    let k_drop = s.p("KDrop")?;

    let along = d.waist_arc + QUARTER - d.dart_placement;
    let target = match unit(&(f - p)) {
        Some(dir) => p + dir * along,
        None => p,
    };
    let leg = (f - k_drop).norm();
    let q = match unit(&(target - k_drop)) {
        Some(dir) if leg > 0.0 => k_drop + dir * leg,
        _ => target,
    };
    let q = s.set_marked("Q", q)?;
    s.value("FrontDartLeg", leg);
    s.line("KQ Equivalent", Stroke::Solid, k_drop, q);
    s.line("Front Waist Line 1", Stroke::Solid, p, q);
    Some(())
}

// =============================================================================
// Back
// =============================================================================

fn back_frame(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let b = s.p("B")?;
    let a = s.p("A")?;
    let length = d.back_full_length + EIGHTH;
    let bo = Point2::new(a.x + ARMSTRONG_BACK_GAP, b.y - length);
    let at = |x: f64, y: f64| Point2::new(bo.x + x, bo.y + y);
    let side = d.back_waist_arc + inch(1.75);

    let ba = s.set_marked("BA", at(0.0, 0.0))?;
    let bb = s.set_marked("BB", at(0.0, length))?;
    s.set_marked("BI", at(d.back_dart_placement, length))?;
    s.set_marked("BJ", at(side, length))?;
    s.set_marked("BK", at(d.back_dart_placement + BACK_DART_INTAKE, length))?;
    s.set_marked("BL", at(d.back_dart_placement + BACK_DART_INTAKE / 2.0, length))?;
    s.set_marked("BM", at(side, length + DART_PLACEMENT_DROP))?;
    let bd = s.set_marked("BD", at(0.0, length - d.centre_back_length))?;
    let bc = s.set_marked("BC", at(d.back_across_shoulder, 0.0))?;
    let be = s.set_marked("BE", at(d.back_arc + inch(0.75), length))?;

    s.line("Back Full Length", Stroke::Solid, ba, bb);
    s.line("Centre Back", Stroke::Solid, bd, bb);
    s.line("Back Across Shoulder", Stroke::Solid, ba, bc);
    s.line("Back Neck Guide", Stroke::Dashed, bd, bd - left(inch(4.0)));
    s.line("Back Shoulder Slope Guide", Stroke::Dashed, bc, bc + down(BACK_SHOULDER_GUIDE));
    s.line("Back Arc", Stroke::Solid, bb, be);
    s.line("Back Side Guide Line", Stroke::Solid, be, be - down(BACK_SIDE_GUIDE));
    Some(())
}

/// Back neck from BD to BF, shoulder slope to BG and the shoulder line
/// BF-BH with the dart marks BR and Ba around its midpoint BP.
fn back_shoulder(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let ba = s.p("BA")?;
    let bb = s.p("BB")?;
    let bc = s.p("BC")?;
    let bd = s.p("BD")?;

    let bf = s.set_marked("BF", ba - left(d.back_neck + EIGHTH))?;
    let neck = ratio_curve(
        bd,
        bf,
        (0.5164137931, -0.1390344828),
        (-0.1807448276, -0.1913379310),
    )?;
    s.curve("Back Neck Curve", Stroke::Solid, [neck]);

    let slope = d.back_shoulder_slope + EIGHTH;
    let dx = bc.x - bb.x;
    let dy = bc.y - bb.y;
    let c = dy * dy + dx * dx - slope * slope;
    let drop = if 4.0 * dy * dy - 4.0 * c >= 0.0 {
        root_in(1.0, 2.0 * dy, c, 0.0, BACK_SHOULDER_GUIDE, f64::max)
    } else {
        0.0
    };
    let bg = s.set_marked("BG", bc + down(drop))?;
    let dir = unit(&(bg - bf))?;
    let bh = s.set_marked("BH", bf + dir * (d.back_shoulder_length + inch(0.5)))?;
    let bp = s.set_marked("BP", midpoint(&bf, &bh))?;
    s.set_marked("BR", bp - dir * QUARTER)?;
    s.set_marked("Ba", bp + dir * QUARTER)?;

    s.line("Back Shoulder Slope", Stroke::Solid, bb, bg);
    s.line("Back Shoulder Length", Stroke::Solid, bf, bh);
    Some(())
}

fn back_side(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let be = s.p("BE")?;
    let bm = s.p("BM")?;
    let bh = s.p("BH")?;
    let bl = s.p("BL")?;

    let dx = be.x - bm.x;
    let rise = (d.back_side_length.powi(2) - dx * dx).max(0.0).sqrt();
    let top = be.y - BACK_SIDE_GUIDE;
    let bn = s.set_marked("BN", Point2::new(be.x, (bm.y - rise).max(top)))?;
    s.line("Back Side Length", Stroke::Solid, bm, bn);

    let armhole = ratio_curve(
        bh,
        bn,
        (0.5836719092, -0.3423131657),
        (-0.1240008345, -0.3063856393),
    )?;
    let mut armhole = armhole.as_cubic();
    armhole.p1.x -= inch(0.3);
    s.curve(
        "Back Armhole Curve",
        Stroke::Solid,
        [CurveSegment::cubic(armhole.p0, armhole.p1, armhole.p2, armhole.p3)],
    );

    let side = (bn - bm).norm();
    let bo = s.set_marked("BO", bl - down((side - inch(1.0)).max(0.0)))?;
    s.line("Back Dart Leg Guide", Stroke::Dashed, bl, bo);
    Some(())
}

/// Across back, a quarter of the centre back down from BD.
fn across_back(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let d = *s.data();
    let bb = s.p("BB")?;
    let bd = s.p("BD")?;
    let bs = s.set_marked("BS", bd + down((bb - bd).norm() / 4.0))?;
    let bt = s.set_marked("BT", bs - left(d.across_back + QUARTER))?;
    s.line("Across Back", Stroke::Solid, bs, bt);
    s.line(
        "Back Armhole Guideline",
        Stroke::Dashed,
        bt - down(inch(1.0)),
        bt + down(inch(4.0)),
    );
    Some(())
}

/// Waist dart legs from BO, extended past the waist, and the shoulder
/// dart legs from BQ, 3" below BP toward BO.
fn back_darts(s: &mut ArmstrongScope<'_>) -> Option<()> {
    let bb = s.p("BB")?;
    let bm = s.p("BM")?;
    let bf = s.p("BF")?;
    let bh = s.p("BH")?;
    let bp = s.p("BP")?;
    let bo = s.p("BO")?;

    let bi = s.p("BI")?;
    let bk = s.p("BK")?;
    let br = s.p("BR")?;
    let ba = s.p("Ba")?;

    let bi = s.set("BI", extend_leg(bo, bi, DART_LEG_EXTENSION)?)?;
    let bk = s.set("BK", extend_leg(bo, bk, DART_LEG_EXTENSION)?)?;
    let bq = s.set_marked("BQ", bp + unit(&(bo - bp))? * inch(3.0))?;

    let leg = (br - bq).norm() + DART_LEG_EXTENSION;
    let br = s.set("BR", bq + unit(&(br - bq))? * leg)?;
    let ba = s.set("Ba", bq + unit(&(ba - bq))? * leg)?;

    s.line("Back Waist Dart Left Leg", Stroke::Solid, bo, bi);
    s.line("Back Waist Dart Right Leg", Stroke::Solid, bo, bk);
    s.line("Back Shoulder Dart Left Leg", Stroke::Solid, bq, br);
    s.line("Back Shoulder Dart Right Leg", Stroke::Solid, bq, ba);
    s.line("Back Shoulder Line 2", Stroke::Solid, ba, bh);
    s.line("Back Shoulder Line 1", Stroke::Solid, bf, br);
    s.line("Back Waist Line 1", Stroke::Solid, bb, bi);
    s.line("Back Waist Line 2", Stroke::Solid, bk, bm);
    s.line("Back Dart Center Guide", Stroke::Dashed, bp, bo);
    Some(())
}

/// Step plan of the inch-based bodice.
pub fn armstrong_bodice_plan() -> Plan<ArmstrongDerived> {
    Plan::new("armstrong-bodice", Orientation::YDown)
        .step(
            Step::new("front frame", front_frame)
                .writes(&["A", "B", "C", "D", "E"])
                .draws(&[
                    "Full Length",
                    "Front Across Shoulder",
                    "B-D",
                    "Front Neck Guide 1",
                    "Bust Arc",
                    "Side Guide Line",
                    "Shoulder Slope Guide",
                ]),
        )
        .step(
            Step::new("front shoulder", front_shoulder)
                .reads(&["A", "B", "C", "D"])
                .writes(&["G", "H", "I"])
                .draws(&["Shoulder Slope", "Shoulder Length", "D-I Arc", "Front Neck Guide 2"]),
        )
        .step(
            Step::new("bust lines", bust_lines)
                .reads(&["B", "D", "H"])
                .writes(&["J", "L", "K", "KDrop", "M"])
                .draws(&[
                    "Dart Reduction",
                    "Bust Span",
                    "Across Chest",
                    "Front Armhole Guide Line",
                ]),
        )
        .step(
            Step::new("front waist", front_waist)
                .reads(&["B", "KDrop"])
                .writes(&["FTop", "F"])
                .draws(&["Dart Placement Guide", "Front Waist Line 2", "K-F"]),
        )
        .step(
            Step::new("front side", front_side)
                .reads(&["E", "G", "I"])
                .writes(&["N", "O", "P"])
                .draws(&["New Strap", "Provisional Side Length", "G-O Arc", "Side Length OP"]),
        )
        .step(
            Step::new("front dart", front_dart)
                .reads(&["P", "F", "KDrop"])
                .writes(&["Q"])
                .draws(&["KQ Equivalent", "Front Waist Line 1"]),
        )
        .step(
            Step::new("back frame", back_frame)
                .reads(&["A", "B"])
                .writes(&["BA", "BB", "BI", "BJ", "BK", "BL", "BM", "BD", "BC", "BE"])
                .draws(&[
                    "Back Full Length",
                    "Centre Back",
                    "Back Across Shoulder",
                    "Back Neck Guide",
                    "Back Shoulder Slope Guide",
                    "Back Arc",
                    "Back Side Guide Line",
                ]),
        )
        .step(
            Step::new("back shoulder", back_shoulder)
                .reads(&["BA", "BB", "BC", "BD"])
                .writes(&["BF", "BG", "BH", "BP", "BR", "Ba"])
                .draws(&["Back Neck Curve", "Back Shoulder Slope", "Back Shoulder Length"]),
        )
        .step(
            Step::new("back side", back_side)
                .reads(&["BE", "BM", "BH", "BL"])
                .writes(&["BN", "BO"])
                .draws(&["Back Side Length", "Back Armhole Curve", "Back Dart Leg Guide"]),
        )
        .step(
            Step::new("across back", across_back)
                .reads(&["BB", "BD"])
                .writes(&["BS", "BT"])
                .draws(&["Across Back", "Back Armhole Guideline"]),
        )
        .step(
            Step::new("back darts", back_darts)
                .reads(&["BB", "BM", "BF", "BH", "BP", "BO"])
                .updates(&["BI", "BK", "BR", "Ba"])
                .writes(&["BQ"])
                .draws(&[
                    "Back Waist Dart Left Leg",
                    "Back Waist Dart Right Leg",
                    "Back Shoulder Dart Left Leg",
                    "Back Shoulder Dart Right Leg",
                    "Back Shoulder Line 2",
                    "Back Shoulder Line 1",
                    "Back Waist Line 1",
                    "Back Waist Line 2",
                    "Back Dart Center Guide",
                ]),
        )
}

/// Draft the inch-based bodice from the measurements behind `input`.
pub fn draft_armstrong_bodice(
    input: &dyn InputSurface,
    settings: &DraftSettings,
) -> Result<DraftContext> {
    let measurements = ArmstrongMeasurements::read(input);
    let mut ctx = armstrong_bodice_plan().run(&measurements.derive(), settings)?;
    ctx.set_measurements(measurements.sheet);
    Ok(ctx)
}
