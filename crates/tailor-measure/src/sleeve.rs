//! Sleeve measurements.

use serde::{Deserialize, Serialize};

use crate::input::InputSurface;
use crate::measurement::{number_or, Measurement, MeasurementRow, MeasurementSheet, Unit};

/// Sleeve rows. Armhole height and armhole circumference are optional and
/// read separately.
pub const SLEEVE_ROWS: &[MeasurementRow] = &[
    MeasurementRow::new("fAh", "Front armhole", 18.9).with_ease("fAhEase", 0.0),
    MeasurementRow::new("bAh", "Back armhole", 22.1).with_ease("bAhEase", 0.0),
    MeasurementRow::new("AL", "Arm length", 60.0).with_ease("ALEase", 0.0),
    MeasurementRow::new("upAC", "Upper arm circumference", 28.0).with_ease("upACEase", 1.0),
    MeasurementRow::new("WrC", "Wrist circumference", 16.0).with_ease("WrCEase", 2.0),
    MeasurementRow::new("CapEasePct", "Cap ease", 1.0)
        .with_ease("CapEasePctEase", 0.0)
        .in_unit(Unit::Percent),
    MeasurementRow::new("CapLineEase", "Cap line ease", 0.0),
    MeasurementRow::new("fAP", "Front armhole notch", 4.1),
    MeasurementRow::new("bAP", "Back armhole notch", 7.3),
];

/// Measurements read for a sleeve draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleeveMeasurements {
    /// Regular rows.
    pub sheet: MeasurementSheet,
    /// Armhole height, when given.
    pub ahh: Option<Measurement>,
    /// Armhole circumference; defaults to `fAh + bAh`.
    pub ahc: Measurement,
    /// Extra cap circumference ease.
    pub cap_c_ease: f64,
}

impl SleeveMeasurements {
    /// Read sleeve measurements.
    pub fn read(input: &dyn InputSurface) -> Self {
        let sheet = MeasurementSheet::read(SLEEVE_ROWS, input);
        let ahh = input
            .number("AhH")
            .filter(|v| v.is_finite())
            .map(|raw| Measurement::new(raw, number_or(input, "AhHEase", 0.0)));
        let ahc_default = sheet.raw("fAh") + sheet.raw("bAh");
        let ahc = Measurement::new(
            number_or(input, "AhC", ahc_default),
            number_or(input, "AhCEase", 0.0),
        );
        Self {
            sheet,
            ahh,
            ahc,
            cap_c_ease: number_or(input, "CapCEase", 0.0),
        }
    }

    /// Compute the derived construction values.
    pub fn derive(&self) -> SleeveDerived {
        let s = &self.sheet;
        let ahc = self.ahc.final_value();
        let cap_ease_pct = s.final_value("CapEasePct");
        let cap_ease_cm = ahc * cap_ease_pct / 100.0;
        SleeveDerived {
            ahh: self.ahh.map(|m| m.final_value()),
            f_ah: s.final_value("fAh"),
            b_ah: s.final_value("bAh"),
            ahc,
            sl_l: s.final_value("AL"),
            sl_w: s.final_value("upAC"),
            he_w: s.final_value("WrC"),
            cap_line_ease: s.raw("CapLineEase"),
            cap_ease_pct,
            cap_ease_cm,
            cap_c: ahc + cap_ease_cm + self.cap_c_ease,
            f_ap: s.raw("fAP"),
            b_ap: s.raw("bAP"),
        }
    }
}

impl Default for SleeveMeasurements {
    fn default() -> Self {
        Self::read(&crate::input::HeadlessInput::new())
    }
}

/// Construction values of a sleeve, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleeveDerived {
    /// Armhole height with ease.
    pub ahh: Option<f64>,
    /// Front armhole with ease.
    pub f_ah: f64,
    /// Back armhole with ease.
    pub b_ah: f64,
    /// Armhole circumference with ease.
    pub ahc: f64,
    /// Sleeve length.
    pub sl_l: f64,
    /// Sleeve width.
    pub sl_w: f64,
    /// Hem width.
    pub he_w: f64,
    /// Extra cap line length.
    pub cap_line_ease: f64,
    /// Cap ease in percent.
    pub cap_ease_pct: f64,
    /// Cap ease in cm.
    pub cap_ease_cm: f64,
    /// Cap circumference.
    pub cap_c: f64,
    /// Front notch distance along the cap.
    pub f_ap: f64,
    /// Back notch distance along the cap.
    pub b_ap: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::HeadlessInput;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_sleeve() {
        let d = SleeveMeasurements::default().derive();
        assert_eq!(d.ahh, None);
        assert_relative_eq!(d.ahc, 41.0);
        assert_relative_eq!(d.cap_ease_cm, 0.41);
        assert_relative_eq!(d.cap_c, 41.41, epsilon = 1e-9);
        assert_relative_eq!(d.sl_l, 60.0);
        assert_relative_eq!(d.sl_w, 29.0);
        assert_relative_eq!(d.he_w, 18.0);
    }

    #[test]
    fn test_manual_armhole_circumference() {
        let input = HeadlessInput::new()
            .with_number("AhC", 44.0)
            .with_number("AhCEase", 1.0)
            .with_number("CapEasePct", 5.0)
            .with_number("AhH", 17.0);
        let d = SleeveMeasurements::read(&input).derive();
        assert_relative_eq!(d.ahc, 45.0);
        assert_relative_eq!(d.cap_ease_cm, 2.25);
        assert_eq!(d.ahh, Some(17.0));
    }
}
