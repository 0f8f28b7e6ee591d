//! Draft settings.

use serde::{Deserialize, Serialize};
use tailor_kernel_curve::WaypointParams;

use crate::error::{DraftError, Result};
use crate::types::Point2D;

/// Limits of an armhole waypoint solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Maximum Newton iterations.
    pub max_iterations: usize,
    /// Per-axis hit tolerance (cm).
    pub tolerance: f64,
    /// Jacobian determinant below which the solve stops.
    pub det_eps: f64,
}

impl From<WaypointParams> for SolverSettings {
    fn from(p: WaypointParams) -> Self {
        Self {
            max_iterations: p.max_iterations,
            tolerance: p.tolerance,
            det_eps: p.det_eps,
        }
    }
}

impl From<SolverSettings> for WaypointParams {
    fn from(s: SolverSettings) -> Self {
        Self {
            max_iterations: s.max_iterations,
            tolerance: s.tolerance,
            det_eps: s.det_eps,
        }
    }
}

impl SolverSettings {
    fn validate(&self, name: &str) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(DraftError::InvalidSettings(format!(
                "{name}.max_iterations must be at least 1"
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(DraftError::InvalidSettings(format!(
                "{name}.tolerance must be positive"
            )));
        }
        if !(self.det_eps > 0.0) {
            return Err(DraftError::InvalidSettings(format!(
                "{name}.det_eps must be positive"
            )));
        }
        Ok(())
    }
}

/// Drafting parameters shared by every variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    /// Position of point 1 (cm).
    pub origin: Point2D,
    /// Front armhole solve limits.
    pub front_armhole: SolverSettings,
    /// Back armhole solve limits.
    pub back_armhole: SolverSettings,
    /// Length of the sleeve cap arc on the first attempt (cm).
    pub arc_target_length: f64,
    /// Arc length tried when the back cap circle misses the first arc (cm).
    pub arc_retry_length: f64,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            origin: Point2D::ORIGIN,
            front_armhole: WaypointParams::FRONT_ARMHOLE.into(),
            back_armhole: WaypointParams::BACK_ARMHOLE.into(),
            arc_target_length: 20.0,
            arc_retry_length: 22.0,
        }
    }
}

impl DraftSettings {
    /// Parse settings from TOML; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.origin.x.is_finite() || !self.origin.y.is_finite() {
            return Err(DraftError::InvalidSettings("origin must be finite".into()));
        }
        self.front_armhole.validate("front_armhole")?;
        self.back_armhole.validate("back_armhole")?;
        if !(self.arc_target_length > 0.0) {
            return Err(DraftError::InvalidSettings(
                "arc_target_length must be positive".into(),
            ));
        }
        if self.arc_retry_length < self.arc_target_length {
            return Err(DraftError::InvalidSettings(
                "arc_retry_length must not be shorter than arc_target_length".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let s = DraftSettings::default();
        s.validate().unwrap();
        assert_eq!(WaypointParams::from(s.back_armhole), WaypointParams::BACK_ARMHOLE);
        assert_eq!(s.arc_retry_length, 22.0);
    }

    #[test]
    fn test_partial_toml() {
        let s = DraftSettings::from_toml_str(
            "arc_target_length = 18.0\n[origin]\nx = 5.0\ny = 2.0\n",
        )
        .unwrap();
        assert_eq!(s.origin, Point2D::new(5.0, 2.0));
        assert_eq!(s.arc_target_length, 18.0);
        assert_eq!(s.front_armhole.max_iterations, 25);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut s = DraftSettings::default();
        s.arc_retry_length = 10.0;
        assert!(matches!(s.validate(), Err(DraftError::InvalidSettings(_))));

        let mut s = DraftSettings::default();
        s.back_armhole.tolerance = 0.0;
        assert!(s.validate().is_err());

        assert!(matches!(
            DraftSettings::from_toml_str("arc_target_length = \"long\""),
            Err(DraftError::SettingsFile(_))
        ));
    }
}
