//! Measurement rows, eased values and the per-draft measurement sheet.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tailor_kernel_math::round2;

use crate::input::InputSurface;

/// Unit of a measurement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Centimeters.
    Centimeters,
    /// Inches.
    Inches,
    /// Degrees.
    Degrees,
    /// Percent of another measurement.
    Percent,
}

/// Declaration of one input measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRow {
    /// Input key, e.g. `"BrC"`.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Unit of the raw value.
    pub unit: Unit,
    /// Value used when the input is missing or unparseable.
    pub default: f64,
    /// Input key of the ease delta, if the row takes ease.
    pub ease_key: Option<&'static str>,
    /// Ease used when the ease input is missing.
    pub default_ease: f64,
}

impl MeasurementRow {
    /// A centimeter row without ease.
    pub const fn new(key: &'static str, label: &'static str, default: f64) -> Self {
        Self {
            key,
            label,
            unit: Unit::Centimeters,
            default,
            ease_key: None,
            default_ease: 0.0,
        }
    }

    /// Attach an ease input to the row.
    pub const fn with_ease(mut self, ease_key: &'static str, default_ease: f64) -> Self {
        self.ease_key = Some(ease_key);
        self.default_ease = default_ease;
        self
    }

    /// Change the unit of the row.
    pub const fn in_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }
}

/// A raw measurement and its ease delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Body measurement as entered.
    pub raw: f64,
    /// Ease added on top of the body measurement.
    pub ease: f64,
}

impl Measurement {
    /// Create a measurement.
    pub fn new(raw: f64, ease: f64) -> Self {
        Self { raw, ease }
    }

    /// Construction value: `raw + ease` rounded to two decimals.
    pub fn final_value(&self) -> f64 {
        round2(self.raw + self.ease)
    }
}

/// Read a number from `input`, substituting `default` for missing or non-finite values.
pub(crate) fn number_or(input: &dyn InputSurface, key: &str, default: f64) -> f64 {
    match input.number(key) {
        Some(v) if v.is_finite() => v,
        _ => {
            debug!("{key}: using default {default}");
            default
        }
    }
}

/// Snapshot of every measurement read for one draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSheet {
    values: BTreeMap<String, Measurement>,
}

impl MeasurementSheet {
    /// Read every row from `input`, falling back to row defaults.
    pub fn read(rows: &[MeasurementRow], input: &dyn InputSurface) -> Self {
        let mut sheet = Self::default();
        for row in rows {
            let raw = number_or(input, row.key, row.default);
            let ease = match row.ease_key {
                Some(key) => number_or(input, key, row.default_ease),
                None => 0.0,
            };
            sheet.insert(row.key, Measurement::new(raw, ease));
        }
        sheet
    }

    /// Add or replace a measurement.
    pub fn insert(&mut self, key: impl Into<String>, measurement: Measurement) {
        self.values.insert(key.into(), measurement);
    }

    /// Look up a measurement.
    pub fn get(&self, key: &str) -> Option<Measurement> {
        self.values.get(key).copied()
    }

    /// Look up a measurement, or zero with a warning when it was never read.
    pub fn measurement(&self, key: &str) -> Measurement {
        self.get(key).unwrap_or_else(|| {
            warn!("measurement {key} is not on the sheet");
            Measurement::default()
        })
    }

    /// Raw value of `key`.
    pub fn raw(&self, key: &str) -> f64 {
        self.measurement(key).raw
    }

    /// Final (eased) value of `key`.
    pub fn final_value(&self, key: &str) -> f64 {
        self.measurement(key).final_value()
    }

    /// Iterate over all measurements in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Measurement)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sheet is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HeadlessInput;
    use approx::assert_relative_eq;

    const ROWS: &[MeasurementRow] = &[
        MeasurementRow::new("BrC", "Bust circumference", 88.0).with_ease("BrCEase", 6.0),
        MeasurementRow::new("ShA", "Shoulder angle", 20.0).in_unit(Unit::Degrees),
    ];

    #[test]
    fn test_final_value_identity() {
        for (raw, ease) in [(88.0, 6.0), (20.1, 1.3), (41.6, -0.333), (0.005, 0.0)] {
            let m = Measurement::new(raw, ease);
            assert_eq!(m.final_value(), round2(raw + ease));
        }
        assert_relative_eq!(Measurement::new(20.1, 1.3).final_value(), 21.4);
    }

    #[test]
    fn test_read_uses_defaults() {
        let sheet = MeasurementSheet::read(ROWS, &HeadlessInput::new());
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get("BrC"), Some(Measurement::new(88.0, 6.0)));
        assert_eq!(sheet.get("ShA"), Some(Measurement::new(20.0, 0.0)));
        assert_eq!(ROWS[1].unit, Unit::Degrees);
    }

    #[test]
    fn test_read_overrides_and_nan_fallback() {
        let input = HeadlessInput::new()
            .with_number("BrC", 100.0)
            .with_number("BrCEase", f64::NAN);
        let sheet = MeasurementSheet::read(ROWS, &input);
        assert_eq!(sheet.raw("BrC"), 100.0);
        assert_eq!(sheet.measurement("BrC").ease, 6.0);
        assert_relative_eq!(sheet.final_value("BrC"), 106.0);
    }

    #[test]
    fn test_missing_key_is_zero() {
        let sheet = MeasurementSheet::default();
        assert!(sheet.is_empty());
        assert_eq!(sheet.final_value("WaC"), 0.0);
    }
}
