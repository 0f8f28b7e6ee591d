//! Measurements of the close-fitting bodice block.
//!
//! Ease is added to the half bust and half waist, not to the full
//! circumference. The bust-waist difference is spread over a front, a
//! back and a side waist dart, and the neck dart and armhole guides follow
//! bust bands.

use serde::{Deserialize, Serialize};

use crate::input::InputSurface;
use crate::measurement::{MeasurementRow, MeasurementSheet};

/// Close-fitting bodice rows, size 12 defaults.
pub const ALDRICH_ROWS: &[MeasurementRow] = &[
    MeasurementRow::new("Bust", "Bust", 88.0).with_ease("BustEase", 5.0),
    MeasurementRow::new("Waist", "Waist", 68.0).with_ease("WaistEase", 3.0),
    MeasurementRow::new("Hip", "Hip", 94.0),
    MeasurementRow::new("NapeToWaist", "Nape to waist", 41.0),
    MeasurementRow::new("Shoulder", "Shoulder", 12.25),
    MeasurementRow::new("BackWidth", "Back width", 34.4),
    MeasurementRow::new("WaistToHip", "Waist to hip", 20.6),
    MeasurementRow::new("ArmscyeDepth", "Armscye depth", 21.0),
    MeasurementRow::new("Chest", "Chest", 32.4),
    MeasurementRow::new("NeckSize", "Neck size", 37.0),
    MeasurementRow::new("DartApexOffset", "Front waist dart apex offset", 2.5),
];

/// Share of every waist dart kept with reduced darting.
pub const REDUCED_DARTING_FACTOR: f64 = 0.75;

/// Front neck dart intake for a bust, in cm.
///
/// 7 cm at an 88 cm bust and 10 cm at 110 cm, moving 0.6 cm per 4 cm of
/// bust below 104 cm and 0.6 cm per 6 cm above.
pub fn front_neck_dart(bust: f64) -> f64 {
    if !bust.is_finite() {
        return 7.0;
    }
    if bust < 88.0 {
        7.0 - (88.0 - bust) / 4.0 * 0.6
    } else if bust <= 104.0 {
        7.0 + (bust - 88.0) / 4.0 * 0.6
    } else if bust <= 110.0 {
        10.0 - (110.0 - bust) / 6.0 * 0.6
    } else {
        10.0 + (bust - 110.0) / 6.0 * 0.6
    }
}

/// Diagonal from the back width point to the back armhole guide, in cm.
///
/// The 96-106 band wins where it overlaps the 80-99 band.
pub fn back_armhole_guide(bust: f64) -> f64 {
    armhole_band(bust, [2.25, 3.0, 3.5, 2.5, 3.5], 2.5)
}

/// Diagonal from the chest point to the front armhole guide, in cm.
pub fn front_armhole_guide(bust: f64) -> f64 {
    armhole_band(bust, [1.75, 2.5, 3.0, 2.0, 3.0], 2.0)
}

fn armhole_band(bust: f64, bands: [f64; 5], fallback: f64) -> f64 {
    if !bust.is_finite() {
        return fallback;
    }
    if bust <= 80.0 {
        bands[0]
    } else if (96.0..=106.0).contains(&bust) {
        bands[1]
    } else if bust > 106.0 && bust <= 128.0 {
        bands[2]
    } else if bust <= 99.0 {
        bands[3]
    } else {
        bands[4]
    }
}

/// Half bust minus half waist, each with its ease.
pub fn bust_waist_difference(bust: f64, waist: f64, bust_ease: f64, waist_ease: f64) -> f64 {
    (bust / 2.0 + bust_ease) - (waist / 2.0 + waist_ease)
}

/// Waist dart intakes, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaistDarts {
    /// Front waist dart.
    pub front: f64,
    /// Back waist dart.
    pub back: f64,
    /// Side waist dart, shared by front and back.
    pub side: f64,
}

impl WaistDarts {
    /// Spread a bust-waist difference: with `x = (|diff| - 6) / 4` the
    /// front takes `x + 3`, the back `x + 2` and the side `2x + 1`.
    pub fn from_difference(diff: f64) -> Self {
        if !diff.is_finite() {
            return Self::default();
        }
        let x = (diff.abs() - 6.0) / 4.0;
        Self {
            front: x + 3.0,
            back: x + 2.0,
            side: 2.0 * x + 1.0,
        }
    }

    /// Every intake multiplied by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            front: self.front * factor,
            back: self.back * factor,
            side: self.side * factor,
        }
    }

    /// Sum of the three intakes.
    pub fn total(&self) -> f64 {
        self.front + self.back + self.side
    }
}

fn overridden(input: &dyn InputSurface, key: &str) -> Option<f64> {
    if input.flag(&format!("{key}Override")) {
        input.number(key).filter(|v| v.is_finite())
    } else {
        None
    }
}

/// Measurements read for the close-fitting bodice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AldrichMeasurements {
    /// Regular rows.
    pub sheet: MeasurementSheet,
    /// Manual front neck dart.
    pub front_neck_dart: Option<f64>,
    /// Manual bust-waist difference, redistributed over the darts.
    pub bust_waist_difference: Option<f64>,
    /// Manual front waist dart.
    pub front_waist_dart: Option<f64>,
    /// Manual back waist dart.
    pub back_waist_dart: Option<f64>,
    /// Manual side waist dart.
    pub side_waist_dart: Option<f64>,
    /// Keep three quarters of every computed waist dart.
    pub reduced_darting: bool,
}

impl AldrichMeasurements {
    /// Read the rows, the manual overrides and the `ReducedDarting` flag.
    ///
    /// A manual value counts only while its `<Key>Override` flag is set.
    pub fn read(input: &dyn InputSurface) -> Self {
        Self {
            sheet: MeasurementSheet::read(ALDRICH_ROWS, input),
            front_neck_dart: overridden(input, "FrontNeckDart"),
            bust_waist_difference: overridden(input, "BustWaistDiff"),
            front_waist_dart: overridden(input, "FrontWaistDart"),
            back_waist_dart: overridden(input, "BackWaistDart"),
            side_waist_dart: overridden(input, "SideWaistDart"),
            reduced_darting: input.flag("ReducedDarting"),
        }
    }

    /// Compute the frame widths, the darts and the armhole guides.
    pub fn derive(&self) -> AldrichDerived {
        let s = &self.sheet;
        let bust = s.raw("Bust");
        let waist = s.raw("Waist");
        let bust_ease = s.measurement("Bust").ease;
        let waist_ease = s.measurement("Waist").ease;

        let measured = bust_waist_difference(bust, waist, bust_ease, waist_ease);
        let factor = if self.reduced_darting {
            REDUCED_DARTING_FACTOR
        } else {
            1.0
        };
        let auto = WaistDarts::from_difference(self.bust_waist_difference.unwrap_or(measured))
            .scaled(factor);
        let darts = WaistDarts {
            front: self.front_waist_dart.unwrap_or(auto.front),
            back: self.back_waist_dart.unwrap_or(auto.back),
            side: self.side_waist_dart.unwrap_or(auto.side),
        };

        AldrichDerived {
            bust,
            half_bust_width: bust / 2.0 + bust_ease,
            nape_to_waist: s.raw("NapeToWaist"),
            shoulder: s.raw("Shoulder"),
            back_width: s.raw("BackWidth"),
            armscye_depth: s.raw("ArmscyeDepth"),
            chest: s.raw("Chest"),
            neck_size: s.raw("NeckSize"),
            dart_apex_offset: s.raw("DartApexOffset"),
            front_neck_dart: self.front_neck_dart.unwrap_or_else(|| front_neck_dart(bust)),
            measured_difference: measured,
            bust_waist_difference: darts.total().abs(),
            darts,
            back_armhole_guide: back_armhole_guide(bust),
            front_armhole_guide: front_armhole_guide(bust),
        }
    }
}

impl Default for AldrichMeasurements {
    fn default() -> Self {
        Self::read(&crate::input::HeadlessInput::new())
    }
}

/// Construction values of the close-fitting bodice, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AldrichDerived {
    /// Bust circumference.
    pub bust: f64,
    /// Half bust plus bust ease: the frame width.
    pub half_bust_width: f64,
    /// Nape to waist.
    pub nape_to_waist: f64,
    /// Shoulder length.
    pub shoulder: f64,
    /// Back width.
    pub back_width: f64,
    /// Armscye depth.
    pub armscye_depth: f64,
    /// Chest.
    pub chest: f64,
    /// Neck size.
    pub neck_size: f64,
    /// Drop of the front waist dart apex below point 26.
    pub dart_apex_offset: f64,
    /// Front neck dart intake.
    pub front_neck_dart: f64,
    /// Bust-waist difference from the measurements.
    pub measured_difference: f64,
    /// Total intake of the waist darts actually drafted.
    pub bust_waist_difference: f64,
    /// Waist darts after overrides.
    pub darts: WaistDarts,
    /// Back armhole guide diagonal.
    pub back_armhole_guide: f64,
    /// Front armhole guide diagonal.
    pub front_armhole_guide: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HeadlessInput;
    use approx::assert_relative_eq;

    #[test]
    fn test_neck_dart_bands() {
        assert_relative_eq!(front_neck_dart(88.0), 7.0);
        assert_relative_eq!(front_neck_dart(84.0), 6.4);
        assert_relative_eq!(front_neck_dart(104.0), 9.4);
        assert_relative_eq!(front_neck_dart(110.0), 10.0);
        assert_relative_eq!(front_neck_dart(116.0), 10.6);
        assert_relative_eq!(front_neck_dart(f64::NAN), 7.0);
    }

    #[test]
    fn test_armhole_bands_overlap() {
        assert_eq!(back_armhole_guide(80.0), 2.25);
        assert_eq!(back_armhole_guide(88.0), 2.5);
        assert_eq!(back_armhole_guide(97.0), 3.0);
        assert_eq!(back_armhole_guide(120.0), 3.5);
        assert_eq!(back_armhole_guide(130.0), 3.5);
        assert_eq!(front_armhole_guide(88.0), 2.0);
        assert_eq!(front_armhole_guide(98.0), 2.5);
        assert_eq!(front_armhole_guide(f64::INFINITY), 2.0);
    }

    #[test]
    fn test_default_darts() {
        let d = AldrichMeasurements::default().derive();
        assert_relative_eq!(d.half_bust_width, 49.0);
        assert_relative_eq!(d.measured_difference, 12.0);
        assert_relative_eq!(d.darts.front, 4.5);
        assert_relative_eq!(d.darts.back, 3.5);
        assert_relative_eq!(d.darts.side, 4.0);
        assert_relative_eq!(d.bust_waist_difference, 12.0);
        assert_relative_eq!(d.front_neck_dart, 7.0);
    }

    #[test]
    fn test_reduced_darting() {
        let input = HeadlessInput::new().with_flag("ReducedDarting");
        let d = AldrichMeasurements::read(&input).derive();
        assert_relative_eq!(d.darts.front, 3.375);
        assert_relative_eq!(d.bust_waist_difference, 9.0);
    }

    #[test]
    fn test_manual_dart_changes_total() {
        let input = HeadlessInput::new()
            .with_number("BackWaistDart", 2.0)
            .with_flag("BackWaistDartOverride");
        let d = AldrichMeasurements::read(&input).derive();
        assert_relative_eq!(d.darts.back, 2.0);
        assert_relative_eq!(d.darts.front, 4.5);
        assert_relative_eq!(d.bust_waist_difference, 10.5);
    }

    #[test]
    fn test_manual_difference_is_redistributed() {
        let input = HeadlessInput::new()
            .with_number("BustWaistDiff", 10.0)
            .with_flag("BustWaistDiffOverride");
        let d = AldrichMeasurements::read(&input).derive();
        assert_relative_eq!(d.darts.front, 4.0);
        assert_relative_eq!(d.darts.back, 3.0);
        assert_relative_eq!(d.darts.side, 3.0);
        assert_relative_eq!(d.measured_difference, 12.0);
    }
}
