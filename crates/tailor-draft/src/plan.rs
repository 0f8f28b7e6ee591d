//! Ordered construction steps.
//!
//! A variant is a [`Plan`]: a list of named [`Step`]s, each declaring the
//! points it reads and writes. [`Plan::validate`] rejects a plan whose
//! steps read a point before it is produced, and [`Plan::run`] executes
//! the steps in order against one [`DraftContext`].
//!
//! A step that cannot complete (a missing input point, degenerate
//! geometry) returns `None`. The run discards whatever the step wrote,
//! records it as skipped and moves on.

use std::collections::HashSet;
use std::fmt;

use log::{info, warn};
use tailor_kernel_curve::{point_at_distance, CurveSegment};
use tailor_kernel_geom::rotate_about;
use tailor_kernel_math::Point2;

use crate::context::DraftContext;
use crate::error::{DraftError, Result};
use crate::settings::DraftSettings;
use crate::types::{DraftPath, Notch, Orientation, PathSegment, Stroke};

/// Body of a step.
pub type StepFn<D> = fn(&mut Scope<'_, D>) -> Option<()>;

/// One named construction step.
pub struct Step<D> {
    /// Step name, used in errors and skip records.
    pub name: &'static str,
    /// Points read.
    pub reads: &'static [&'static str],
    /// Points created.
    pub writes: &'static [&'static str],
    /// Existing points moved in place.
    pub updates: &'static [&'static str],
    /// Paths drawn.
    pub draws: &'static [&'static str],
    /// Paths read (for notches).
    pub uses_paths: &'static [&'static str],
    run: StepFn<D>,
}

impl<D> Step<D> {
    /// A step that declares nothing yet.
    pub fn new(name: &'static str, run: StepFn<D>) -> Self {
        Self {
            name,
            reads: &[],
            writes: &[],
            updates: &[],
            draws: &[],
            uses_paths: &[],
            run,
        }
    }

    /// Declare the points read.
    pub fn reads(mut self, labels: &'static [&'static str]) -> Self {
        self.reads = labels;
        self
    }

    /// Declare the points created.
    pub fn writes(mut self, labels: &'static [&'static str]) -> Self {
        self.writes = labels;
        self
    }

    /// Declare points moved in place.
    pub fn updates(mut self, labels: &'static [&'static str]) -> Self {
        self.updates = labels;
        self
    }

    /// Declare the paths drawn.
    pub fn draws(mut self, names: &'static [&'static str]) -> Self {
        self.draws = names;
        self
    }

    /// Declare the paths notched or measured.
    pub fn uses_paths(mut self, names: &'static [&'static str]) -> Self {
        self.uses_paths = names;
        self
    }

    fn declares(&self, label: &str) -> bool {
        self.reads.contains(&label) || self.writes.contains(&label) || self.updates.contains(&label)
    }
}

impl<D> Clone for Step<D> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<D> fmt::Debug for Step<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("updates", &self.updates)
            .field("draws", &self.draws)
            .finish()
    }
}

/// An ordered list of steps over the data type `D`.
#[derive(Debug, Clone)]
pub struct Plan<D> {
    /// Variant name recorded on the result.
    pub variant: &'static str,
    /// Direction of the y axis.
    pub orientation: Orientation,
    steps: Vec<Step<D>>,
}

impl<D> Plan<D> {
    /// An empty plan.
    pub fn new(variant: &'static str, orientation: Orientation) -> Self {
        Self {
            variant,
            orientation,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step(mut self, step: Step<D>) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps.
    pub fn extend(mut self, steps: impl IntoIterator<Item = Step<D>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Steps in run order.
    pub fn steps(&self) -> &[Step<D>] {
        &self.steps
    }

    /// Every point label the plan can produce, in order.
    pub fn outputs(&self) -> Vec<&'static str> {
        self.steps.iter().flat_map(|s| s.writes.iter().copied()).collect()
    }

    /// Check that every read refers to an earlier write and no label is written twice.
    ///
    /// A notched path must be drawn by an earlier step or by the same step.
    pub fn validate(&self) -> Result<()> {
        let mut produced: HashSet<&str> = HashSet::new();
        let mut drawn: HashSet<&str> = HashSet::new();
        for step in &self.steps {
            for label in step.reads.iter().chain(step.updates) {
                if !produced.contains(label) {
                    return Err(DraftError::UnproducedRead {
                        step: step.name.to_string(),
                        label: label.to_string(),
                    });
                }
            }
            drawn.extend(step.draws.iter().copied());
            for path in step.uses_paths {
                if !drawn.contains(path) {
                    return Err(DraftError::UnknownPath {
                        step: step.name.to_string(),
                        path: path.to_string(),
                    });
                }
            }
            for label in step.writes {
                if !produced.insert(*label) {
                    return Err(DraftError::DuplicateOutput {
                        step: step.name.to_string(),
                        label: label.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate, then run every step against `data`.
    pub fn run(&self, data: &D, settings: &DraftSettings) -> Result<DraftContext> {
        settings.validate()?;
        self.validate()?;

        let mut ctx = DraftContext::new(self.variant, self.orientation);
        for step in &self.steps {
            let before = ctx.clone();
            let mut scope = Scope {
                step,
                data,
                settings,
                ctx: &mut ctx,
                missing: None,
            };
            let outcome = (step.run)(&mut scope);
            let missing = scope.missing.take();
            if outcome.is_none() {
                let reason = match missing {
                    Some(label) => format!("missing point {label}"),
                    None => "degenerate geometry".to_string(),
                };
                // A skipped step leaves nothing behind.
                ctx = before;
                ctx.skip(step.name, reason);
            }
        }
        info!(
            "{}: {} points, {} paths, {} skipped",
            self.variant,
            ctx.points().len(),
            ctx.paths().len(),
            ctx.skipped().len()
        );
        Ok(ctx)
    }
}

/// What a running step sees: its data, the settings and the context so far.
pub struct Scope<'a, D> {
    step: &'a Step<D>,
    data: &'a D,
    settings: &'a DraftSettings,
    ctx: &'a mut DraftContext,
    missing: Option<String>,
}

impl<'a, D> Scope<'a, D> {
    /// Variant data.
    pub fn data(&self) -> &'a D {
        self.data
    }

    /// Draft settings.
    pub fn settings(&self) -> &'a DraftSettings {
        self.settings
    }

    /// A required point. A missing point is recorded as the skip reason.
    pub fn p(&mut self, label: &str) -> Option<Point2> {
        if !self.step.declares(label) {
            warn!("step '{}' reads undeclared point '{label}'", self.step.name);
        }
        let point = self.ctx.point(label);
        if point.is_none() && self.missing.is_none() {
            self.missing = Some(label.to_string());
        }
        point
    }

    /// An optional point.
    pub fn maybe(&self, label: &str) -> Option<Point2> {
        self.ctx.point(label)
    }

    /// Store a point. Non-finite coordinates stop the step.
    pub fn set(&mut self, label: &str, point: Point2) -> Option<Point2> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        if !self.step.declares(label) {
            warn!("step '{}' writes undeclared point '{label}'", self.step.name);
        }
        self.ctx.set_point(label, point);
        Some(point)
    }

    /// Store a point and give it a numbered marker.
    pub fn set_marked(&mut self, label: &str, point: Point2) -> Option<Point2> {
        let point = self.set(label, point)?;
        self.ctx.mark(label);
        Some(point)
    }

    /// Give an existing point a marker.
    pub fn mark(&mut self, label: &str) {
        self.ctx.mark(label);
    }

    /// Draw a straight path.
    pub fn line(&mut self, name: &str, stroke: Stroke, a: Point2, b: Point2) {
        self.curve(name, stroke, [CurveSegment::line(a, b)]);
    }

    /// Draw a path through `points` with straight segments.
    pub fn polyline(&mut self, name: &str, stroke: Stroke, points: &[Point2], closed: bool) {
        let segments = points
            .windows(2)
            .map(|w| CurveSegment::line(w[0], w[1]).into())
            .collect();
        self.add_path(name, stroke, closed, segments);
    }

    /// Draw a path from segments.
    pub fn curve(
        &mut self,
        name: &str,
        stroke: Stroke,
        segments: impl IntoIterator<Item = CurveSegment>,
    ) {
        let segments = segments.into_iter().map(Into::into).collect();
        self.add_path(name, stroke, false, segments);
    }

    fn add_path(&mut self, name: &str, stroke: Stroke, closed: bool, segments: Vec<PathSegment>) {
        if !self.step.draws.contains(&name) {
            warn!("step '{}' draws undeclared path '{name}'", self.step.name);
        }
        self.ctx.add_path(DraftPath {
            name: name.to_string(),
            stroke,
            closed,
            segments,
        });
    }

    /// Segments of a drawn path.
    pub fn segments_of(&self, path: &str) -> Option<Vec<CurveSegment>> {
        self.ctx.path(path).map(DraftPath::curve_segments)
    }

    /// Place a notch `distance` along a path, from its start or its end.
    pub fn notch(&mut self, name: &str, path: &str, distance: f64, from_end: bool) -> Option<()> {
        if !self.step.uses_paths.contains(&path) {
            warn!("step '{}' notches undeclared path '{path}'", self.step.name);
        }
        let segments = self.segments_of(path)?;
        let sample = point_at_distance(&segments, distance, from_end)?;
        self.ctx.add_notch(Notch {
            name: name.to_string(),
            path: path.to_string(),
            center: sample.point.into(),
            normal: sample.normal.into(),
        });
        Some(())
    }

    /// Record a derived scalar.
    pub fn value(&mut self, key: &str, value: f64) {
        self.ctx.set_value(key, value);
    }

    /// Rotate existing points about `pivot` in place. Missing labels are ignored.
    pub fn rotate(&mut self, labels: &[&str], pivot: Point2, angle: f64) {
        for label in labels {
            if !self.step.updates.contains(label) && !self.step.writes.contains(label) {
                warn!("step '{}' rotates undeclared point '{label}'", self.step.name);
            }
            if let Some(p) = self.ctx.point(label) {
                self.ctx.set_point(label, rotate_about(&p, &pivot, angle));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn origin(s: &mut Scope<'_, f64>) -> Option<()> {
        let o = s.settings().origin;
        s.set_marked("1", Point2::new(o.x, o.y))?;
        Some(())
    }

    fn below(s: &mut Scope<'_, f64>) -> Option<()> {
        let p1 = s.p("1")?;
        let p2 = s.set_marked("2", p1 + tailor_kernel_math::Vec2::new(0.0, *s.data()))?;
        s.line("1 - 2", Stroke::Solid, p1, p2);
        Some(())
    }

    fn needs_missing(s: &mut Scope<'_, f64>) -> Option<()> {
        let _ = s.p("16")?;
        s.set("17", Point2::origin())?;
        Some(())
    }

    fn notch_it(s: &mut Scope<'_, f64>) -> Option<()> {
        s.notch("Mid", "1 - 2", 1.0, true)
    }

    fn toy() -> Plan<f64> {
        Plan::new("toy", Orientation::YDown)
            .step(Step::new("origin", origin).writes(&["1"]))
            .step(Step::new("below", below).reads(&["1"]).writes(&["2"]).draws(&["1 - 2"]))
            .step(Step::new("notch", notch_it).uses_paths(&["1 - 2"]))
    }

    #[test]
    fn test_run_in_order() {
        let ctx = toy().run(&4.0, &DraftSettings::default()).unwrap();
        assert_eq!(ctx.variant, "toy");
        assert_eq!(ctx.point("2"), Some(Point2::new(0.0, 4.0)));
        assert_eq!(ctx.markers().count(), 2);
        let notch = &ctx.notches()[0];
        assert_relative_eq!(notch.center.y, 3.0, epsilon = 1e-2);
        assert!(ctx.skipped().is_empty());
    }

    #[test]
    fn test_validate_rejects_forward_read() {
        let plan = Plan::new("bad", Orientation::YDown)
            .step(Step::new("below", below).reads(&["1"]).writes(&["2"]))
            .step(Step::new("origin", origin).writes(&["1"]));
        match plan.validate() {
            Err(DraftError::UnproducedRead { step, label }) => {
                assert_eq!(step, "below");
                assert_eq!(label, "1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_and_unknown_path() {
        let dup = Plan::new("dup", Orientation::YDown)
            .step(Step::new("a", origin).writes(&["1"]))
            .step(Step::new("b", origin).writes(&["1"]));
        assert!(matches!(dup.validate(), Err(DraftError::DuplicateOutput { .. })));

        let unknown = Plan::new("unknown", Orientation::YDown)
            .step(Step::new("notch", notch_it).uses_paths(&["1 - 2"]));
        assert!(matches!(unknown.validate(), Err(DraftError::UnknownPath { .. })));
    }

    #[test]
    fn test_missing_point_is_skipped() {
        let plan = toy().step(Step::new("needs 16", needs_missing).writes(&["17"]));
        let ctx = plan.run(&4.0, &DraftSettings::default()).unwrap();
        assert_eq!(ctx.point("17"), None);
        assert_eq!(ctx.skipped().len(), 1);
        assert_eq!(ctx.skipped()[0].step, "needs 16");
        assert_eq!(ctx.skipped()[0].reason, "missing point 16");
    }

    fn draw_and_notch(s: &mut Scope<'_, f64>) -> Option<()> {
        let p1 = s.p("1")?;
        s.line("Own", Stroke::Solid, p1, p1 + tailor_kernel_math::Vec2::new(2.0, 0.0));
        s.notch("Own Mid", "Own", 1.0, false)
    }

    fn half_done(s: &mut Scope<'_, f64>) -> Option<()> {
        let p1 = s.p("1")?;
        s.set_marked("3", p1 + tailor_kernel_math::Vec2::new(1.0, 0.0))?;
        s.line("1 - 3", Stroke::Dashed, p1, p1);
        s.value("Partial", 1.0);
        None
    }

    #[test]
    fn test_step_notches_its_own_path() {
        let plan = toy().step(
            Step::new("own", draw_and_notch)
                .reads(&["1"])
                .draws(&["Own"])
                .uses_paths(&["Own"]),
        );
        assert!(plan.validate().is_ok());
        let ctx = plan.run(&4.0, &DraftSettings::default()).unwrap();
        let notch = ctx.notches().iter().find(|n| n.name == "Own Mid").unwrap();
        assert_relative_eq!(notch.center.x, 1.0, epsilon = 1e-2);
        assert!(ctx.skipped().is_empty());
    }

    #[test]
    fn test_skipped_step_leaves_nothing() {
        let plan = toy().step(
            Step::new("half done", half_done)
                .reads(&["1"])
                .writes(&["3"])
                .draws(&["1 - 3"]),
        );
        let ctx = plan.run(&4.0, &DraftSettings::default()).unwrap();
        assert!(!ctx.contains("3"));
        assert!(ctx.path("1 - 3").is_none());
        assert_eq!(ctx.value("Partial"), None);
        assert_eq!(ctx.markers().count(), 2);
        assert_eq!(ctx.skipped().len(), 1);
        assert_eq!(ctx.skipped()[0].reason, "degenerate geometry");
    }

    #[test]
    fn test_settings_origin_and_validation() {
        let mut settings = DraftSettings::default();
        settings.origin = crate::types::Point2D::new(3.0, 1.0);
        let ctx = toy().run(&2.0, &settings).unwrap();
        assert_eq!(ctx.point("2"), Some(Point2::new(3.0, 3.0)));

        settings.arc_target_length = -1.0;
        assert!(toy().run(&2.0, &settings).is_err());
    }
}
