//! Skirt measurements and dart distribution.

use serde::{Deserialize, Serialize};

use crate::input::InputSurface;
use crate::measurement::{Measurement, MeasurementRow, MeasurementSheet};

/// Back dart 2 intakes at or below this are treated as absent.
pub const SECOND_BACK_DART_MIN: f64 = 0.05;

/// Skirt rows.
pub const SKIRT_ROWS: &[MeasurementRow] = &[
    MeasurementRow::new("HiC", "Hip circumference", 97.0).with_ease("HipEase", 3.0),
    MeasurementRow::new("WaC", "Waist circumference", 72.0).with_ease("WaistEase", 2.0),
    MeasurementRow::new("HiD", "Hip depth", 21.0).with_ease("HiDEase", 0.0),
    MeasurementRow::new("MoL", "Skirt length", 50.0).with_ease("MoLEase", 0.0),
    MeasurementRow::new("FrontDartLength", "Front dart length", 10.0),
    MeasurementRow::new("BackDartLength1", "Back dart 1 length", 14.5),
    MeasurementRow::new("BackDartLength2", "Back dart 2 length", 13.0),
];

/// Hip shape, which moves intake between the side dart and the other darts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HipProfile {
    /// Straight hips.
    Flat,
    /// Average hips.
    #[default]
    Normal,
    /// Rounded hips.
    Curvy,
}

impl HipProfile {
    /// Parse a profile name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "normal" => Some(Self::Normal),
            "curvy" => Some(Self::Curvy),
            _ => None,
        }
    }

    /// Rise of the side seam above the waist line, in cm.
    pub fn waist_shaping(self) -> f64 {
        match self {
            Self::Curvy => 1.5,
            _ => 1.0,
        }
    }

    /// Auto side dart intake for a half-waist difference.
    pub fn side_dart(self, waist_diff: f64) -> f64 {
        let adjust = match self {
            Self::Curvy => 1.0,
            Self::Flat => -1.0,
            Self::Normal => 0.0,
        };
        (waist_diff / 2.0 + adjust).max(0.0)
    }
}

/// Intake of each waist dart, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DartIntakes {
    /// Side seam dart.
    pub side: f64,
    /// Front dart.
    pub front: f64,
    /// First back dart.
    pub back1: f64,
    /// Second back dart.
    pub back2: f64,
}

impl DartIntakes {
    /// Total intake, never negative.
    pub fn sum(&self) -> f64 {
        (self.side + self.front + self.back1 + self.back2).max(0.0)
    }

    /// Whether the second back dart is drafted.
    pub fn has_second_back_dart(&self) -> bool {
        self.back2 > SECOND_BACK_DART_MIN
    }
}

/// Manually entered intakes. `None` uses the computed value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DartOverrides {
    /// Side dart.
    pub side: Option<f64>,
    /// Front dart.
    pub front: Option<f64>,
    /// First back dart.
    pub back1: Option<f64>,
    /// Second back dart.
    pub back2: Option<f64>,
}

impl DartOverrides {
    /// Read overrides: `<Key>` counts only while the `<Key>Override` flag is set.
    pub fn read(input: &dyn InputSurface) -> Self {
        let read = |key: &str| {
            if input.flag(&format!("{key}Override")) {
                input.number(key).filter(|v| v.is_finite())
            } else {
                None
            }
        };
        Self {
            side: read("SideDart"),
            front: read("FrontDart"),
            back1: read("BackDart1"),
            back2: read("BackDart2"),
        }
    }

    /// Sum of the overridden intakes, each counted as at least zero.
    pub fn manual_sum(&self) -> f64 {
        [self.side, self.front, self.back1, self.back2]
            .iter()
            .flatten()
            .map(|v| v.max(0.0))
            .sum()
    }
}

/// Measurements read for a skirt draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkirtMeasurements {
    /// Regular rows.
    pub sheet: MeasurementSheet,
    /// Hip shape.
    pub hip_profile: HipProfile,
    /// Manual dart intakes.
    pub overrides: DartOverrides,
}

impl SkirtMeasurements {
    /// Read skirt measurements.
    pub fn read(input: &dyn InputSurface) -> Self {
        let hip_profile = input
            .text("HipProfile")
            .and_then(|t| HipProfile::from_name(&t))
            .unwrap_or_default();
        Self {
            sheet: MeasurementSheet::read(SKIRT_ROWS, input),
            hip_profile,
            overrides: DartOverrides::read(input),
        }
    }

    /// A measurement by key.
    pub fn get(&self, key: &str) -> Measurement {
        self.sheet.measurement(key)
    }

    /// Compute widths and distribute the waist difference over the darts.
    pub fn derive(&self) -> SkirtDerived {
        let s = &self.sheet;
        let hiw = s.final_value("HiC") / 2.0;
        let waw = s.final_value("WaC") / 2.0;
        let waist_diff = (hiw - waw).max(0.0);
        let o = self.overrides;

        let side = o.side.unwrap_or_else(|| self.hip_profile.side_dart(waist_diff));
        let front = o.front.unwrap_or((waist_diff * 0.2).min(2.5));
        let back1 = o.back1.unwrap_or((waist_diff * 0.3).min(4.5));
        let back2 = o
            .back2
            .unwrap_or((waist_diff - side - front - back1).max(0.0));
        let darts = DartIntakes {
            side,
            front,
            back1,
            back2,
        };
        let manual_dart_sum = o.manual_sum();

        SkirtDerived {
            hiw,
            waw,
            waist_diff,
            darts,
            dart_sum: darts.sum(),
            manual_dart_sum,
            wa_dif: waist_diff - manual_dart_sum,
            hid: s.raw("HiD"),
            mol: s.raw("MoL"),
            hid_cons: s.final_value("HiD"),
            mol_cons: s.final_value("MoL"),
            front_dart_length: s.raw("FrontDartLength"),
            back_dart_length1: s.raw("BackDartLength1"),
            back_dart_length2: s.raw("BackDartLength2"),
            waist_circumference: s.raw("WaC"),
            waist_shaping: self.hip_profile.waist_shaping(),
            hip_profile: self.hip_profile,
        }
    }
}

impl Default for SkirtMeasurements {
    fn default() -> Self {
        Self::read(&crate::input::HeadlessInput::new())
    }
}

/// Construction values of a skirt, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkirtDerived {
    /// Half hip width with ease.
    pub hiw: f64,
    /// Half waist width with ease.
    pub waw: f64,
    /// `max(0, hiw - waw)`.
    pub waist_diff: f64,
    /// Dart intakes after overrides.
    pub darts: DartIntakes,
    /// Total dart intake.
    pub dart_sum: f64,
    /// Total of the manually entered intakes.
    pub manual_dart_sum: f64,
    /// Waist difference left for the computed darts.
    pub wa_dif: f64,
    /// Raw hip depth.
    pub hid: f64,
    /// Raw skirt length.
    pub mol: f64,
    /// Hip depth with ease.
    pub hid_cons: f64,
    /// Skirt length with ease.
    pub mol_cons: f64,
    /// Front dart length.
    pub front_dart_length: f64,
    /// First back dart length.
    pub back_dart_length1: f64,
    /// Second back dart length.
    pub back_dart_length2: f64,
    /// Raw waist circumference.
    pub waist_circumference: f64,
    /// Rise of the side seam above the waist.
    pub waist_shaping: f64,
    /// Hip shape.
    pub hip_profile: HipProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HeadlessInput;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_darts() {
        let d = SkirtMeasurements::default().derive();
        assert_relative_eq!(d.hiw, 50.0);
        assert_relative_eq!(d.waw, 37.0);
        assert_relative_eq!(d.waist_diff, 13.0);
        assert_relative_eq!(d.darts.side, 6.5);
        assert_relative_eq!(d.darts.front, 2.5);
        assert_relative_eq!(d.darts.back1, 3.9, epsilon = 1e-9);
        assert_relative_eq!(d.darts.back2, 0.1, epsilon = 1e-9);
        assert!(d.darts.has_second_back_dart());
        assert_relative_eq!(d.dart_sum, 13.0, epsilon = 1e-9);
        assert_eq!(d.manual_dart_sum, 0.0);
        assert_relative_eq!(d.wa_dif, 13.0);
        assert_eq!(d.hip_profile, HipProfile::Normal);
        assert_relative_eq!(d.waist_shaping, 1.0);
    }

    #[test]
    fn test_hip_profiles() {
        assert_eq!(HipProfile::from_name(" curvy "), Some(HipProfile::Curvy));
        assert_eq!(HipProfile::from_name("FLAT"), Some(HipProfile::Flat));
        assert_eq!(HipProfile::from_name("round"), None);
        assert_relative_eq!(HipProfile::Curvy.side_dart(13.0), 7.5);
        assert_relative_eq!(HipProfile::Flat.side_dart(13.0), 5.5);
        assert_eq!(HipProfile::Flat.side_dart(1.0), 0.0);

        let curvy = SkirtMeasurements::read(&HeadlessInput::new().with_text("HipProfile", "Curvy")).derive();
        assert_relative_eq!(curvy.waist_shaping, 1.5);
        // Side 7.5 + front 2.5 + back 3.9 leaves nothing for a second back dart.
        assert_eq!(curvy.darts.back2, 0.0);
        assert!(!curvy.darts.has_second_back_dart());
    }

    #[test]
    fn test_overrides_need_flag() {
        let input = HeadlessInput::new().with_number("SideDart", 4.0);
        let d = SkirtMeasurements::read(&input).derive();
        assert_relative_eq!(d.darts.side, 6.5);

        let d = SkirtMeasurements::read(&input.with_flag("SideDartOverride")).derive();
        assert_relative_eq!(d.darts.side, 4.0);
        assert_relative_eq!(d.darts.back2, 2.6, epsilon = 1e-9);
        assert_relative_eq!(d.manual_dart_sum, 4.0);
        assert_relative_eq!(d.wa_dif, 9.0);
    }

    #[test]
    fn test_flag_without_value_uses_auto() {
        let input = HeadlessInput::new().with_flag("FrontDartOverride");
        let d = SkirtMeasurements::read(&input).derive();
        assert_relative_eq!(d.darts.front, 2.5);
        assert_eq!(d.manual_dart_sum, 0.0);
    }

    #[test]
    fn test_narrow_hips_have_no_darts() {
        let input = HeadlessInput::new().with_number("HiC", 70.0);
        let d = SkirtMeasurements::read(&input).derive();
        assert_eq!(d.waist_diff, 0.0);
        assert_eq!(d.dart_sum, 0.0);
    }
}
