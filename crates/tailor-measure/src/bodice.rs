//! Bodice measurements and the values derived from them.

use serde::{Deserialize, Serialize};

use crate::balance::recommended_optimal_balance;
use crate::input::{InputSurface, OPTIMAL_BALANCE_KEY};
use crate::measurement::{number_or, Measurement, MeasurementRow, MeasurementSheet, Unit};

/// Largest balance difference that still counts as balanced, in cm.
pub const BALANCE_TOLERANCE: f64 = 1.0;

/// Back shoulder seam length added over the front shoulder seam, in cm.
pub const BACK_SHOULDER_EASE: f64 = 0.7;

/// Default optimal balance when no recommendation can be made.
pub const DEFAULT_OPTIMAL_BALANCE: f64 = 3.5;

/// Bodice rows (size 38 defaults, "Fit 3" ease).
pub const BODICE_ROWS: &[MeasurementRow] = &[
    MeasurementRow::new("AhD", "Armhole depth", 20.1).with_ease("AhDEase", 1.3),
    MeasurementRow::new("BrC", "Bust circumference", 88.0).with_ease("BrCEase", 6.0),
    MeasurementRow::new("WaC", "Waist circumference", 68.0).with_ease("WaCEase", 5.0),
    MeasurementRow::new("HiC", "Hip circumference", 97.0).with_ease("HiCEase", 5.0),
    MeasurementRow::new("BG", "Back width", 16.5).with_ease("BGEase", 0.5),
    MeasurementRow::new("AG", "Armhole width", 9.3).with_ease("AGEase", 1.5),
    MeasurementRow::new("BrG", "Bust width", 18.2).with_ease("BrGEase", 1.0),
    MeasurementRow::new("ShG", "Shoulder length", 12.2).with_ease("ShGEase", 0.3),
    MeasurementRow::new("BL", "Back length", 41.6).with_ease("BLBal", 0.0),
    MeasurementRow::new("FL", "Front length", 45.3).with_ease("FLBal", 0.0),
    MeasurementRow::new("NeG", "Neck width", 6.5),
    MeasurementRow::new("MoL", "Model length", 75.0),
    MeasurementRow::new("HiD", "Hip depth", 20.0),
    MeasurementRow::new("ShA", "Shoulder angle", 20.0).in_unit(Unit::Degrees),
    MeasurementRow::new("BrD", "Bust depth", 28.1),
    MeasurementRow::new("ShoulderDifference", "Shoulder difference", 2.0).in_unit(Unit::Degrees),
];

/// Extra rows of the shaping bodice.
pub const SHAPING_ROWS: &[MeasurementRow] = &[
    MeasurementRow::new("BackContour", "Back contour", 2.0),
    MeasurementRow::new("BackShoulderDartIntake", "Back shoulder dart intake", 1.5),
    MeasurementRow::new("WaistShaping", "Waist shaping", 1.0),
];

/// Measurements read for a bodice draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodiceMeasurements {
    /// Every row as read.
    pub sheet: MeasurementSheet,
    /// Optimal balance: the user value, or the recommendation when left empty.
    pub optimal_balance: f64,
}

impl BodiceMeasurements {
    /// Read the casual bodice rows.
    pub fn read(input: &dyn InputSurface) -> Self {
        Self::read_rows(BODICE_ROWS, input)
    }

    /// Read the casual rows plus the shaping rows.
    pub fn read_shaping(input: &dyn InputSurface) -> Self {
        let mut m = Self::read(input);
        for (key, value) in MeasurementSheet::read(SHAPING_ROWS, input).iter() {
            m.sheet.insert(key, *value);
        }
        m
    }

    fn read_rows(rows: &[MeasurementRow], input: &dyn InputSurface) -> Self {
        let sheet = MeasurementSheet::read(rows, input);
        let recommended = recommended_optimal_balance(sheet.raw("BrC"));
        let optimal_balance = number_or(
            input,
            OPTIMAL_BALANCE_KEY,
            recommended.unwrap_or(DEFAULT_OPTIMAL_BALANCE),
        );
        Self {
            sheet,
            optimal_balance,
        }
    }

    /// A measurement by key.
    pub fn get(&self, key: &str) -> Measurement {
        self.sheet.measurement(key)
    }

    /// Compute the derived construction values.
    pub fn derive(&self) -> BodiceDerived {
        let s = &self.sheet;
        let f_sh_s = s.final_value("ShG");
        let fl = s.measurement("FL");
        let bl = s.measurement("BL");
        let fl_final = fl.raw + fl.ease;
        let bl_final = bl.raw + bl.ease;
        let final_balance = fl_final - bl_final;
        let balance_delta = (final_balance - self.optimal_balance).abs();
        let sha = s.raw("ShA");
        let diff = s.raw("ShoulderDifference");
        BodiceDerived {
            brw: s.final_value("BrC") / 2.0,
            waw: s.final_value("WaC") / 2.0,
            hiw: s.final_value("HiC") / 2.0,
            ahd: s.final_value("AhD"),
            bg: s.final_value("BG"),
            ag: s.final_value("AG"),
            brg: s.final_value("BrG"),
            f_sh_s,
            b_sh_s: f_sh_s + BACK_SHOULDER_EASE,
            fl: fl.raw,
            fl_final,
            bl: bl.raw,
            bl_final,
            neg: s.raw("NeG"),
            mol: s.raw("MoL"),
            hid: s.raw("HiD"),
            brd: s.raw("BrD"),
            brc: s.final_value("BrC"),
            individual_balance: fl.raw - bl.raw,
            final_balance,
            optimal_balance: self.optimal_balance,
            recommended_balance: recommended_optimal_balance(s.raw("BrC")),
            balance_delta,
            balance_within_tolerance: balance_delta <= BALANCE_TOLERANCE,
            front_shoulder_angle: sha + diff,
            back_shoulder_angle: sha - diff,
            back_contour: s.get("BackContour").map(|m| m.raw),
            back_shoulder_dart_intake: s.get("BackShoulderDartIntake").map(|m| m.raw),
            waist_shaping: s.get("WaistShaping").map(|m| m.raw),
        }
    }
}

impl Default for BodiceMeasurements {
    fn default() -> Self {
        Self::read(&crate::input::HeadlessInput::new())
    }
}

/// Construction values of a bodice. Lengths in cm, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodiceDerived {
    /// Half bust width (BrC+ / 2).
    pub brw: f64,
    /// Half waist width (WaC+ / 2).
    pub waw: f64,
    /// Half hip width (HiC+ / 2).
    pub hiw: f64,
    /// Armhole depth with ease.
    pub ahd: f64,
    /// Back width with ease.
    pub bg: f64,
    /// Armhole width with ease.
    pub ag: f64,
    /// Bust width with ease.
    pub brg: f64,
    /// Front shoulder seam length.
    pub f_sh_s: f64,
    /// Back shoulder seam length.
    pub b_sh_s: f64,
    /// Raw front length.
    pub fl: f64,
    /// Front length plus its balance.
    pub fl_final: f64,
    /// Raw back length.
    pub bl: f64,
    /// Back length plus its balance.
    pub bl_final: f64,
    /// Neck width.
    pub neg: f64,
    /// Model length.
    pub mol: f64,
    /// Hip depth.
    pub hid: f64,
    /// Bust depth.
    pub brd: f64,
    /// Bust circumference with ease.
    pub brc: f64,
    /// `FL - BL` before balance adjustments.
    pub individual_balance: f64,
    /// `FL final - BL final`.
    pub final_balance: f64,
    /// Balance the draft aims for.
    pub optimal_balance: f64,
    /// Recommendation from the raw bust circumference.
    pub recommended_balance: Option<f64>,
    /// `|final_balance - optimal_balance|`.
    pub balance_delta: f64,
    /// Whether the delta is within [`BALANCE_TOLERANCE`].
    pub balance_within_tolerance: bool,
    /// Front shoulder slope in degrees.
    pub front_shoulder_angle: f64,
    /// Back shoulder slope in degrees.
    pub back_shoulder_angle: f64,
    /// Back contour (shaping bodice only).
    pub back_contour: Option<f64>,
    /// Back shoulder dart intake (shaping bodice only).
    pub back_shoulder_dart_intake: Option<f64>,
    /// Waist shaping (shaping bodice only).
    pub waist_shaping: Option<f64>,
}
