#![warn(missing_docs)]

//! Measurements and derived values for tailor drafts.
//!
//! A draft starts from a flat set of body measurements, each with an
//! optional ease delta. This crate reads them through an [`InputSurface`],
//! applies fit profiles, and computes the secondary values every draft
//! needs (half widths, balance, dart intakes).
//!
//! # Example
//!
//! ```
//! use tailor_measure::{BodiceMeasurements, HeadlessInput};
//!
//! let input = HeadlessInput::new().with_number("BrC", 92.0);
//! let derived = BodiceMeasurements::read(&input).derive();
//! assert_eq!(derived.brw, 49.0);
//! assert_eq!(derived.recommended_balance, Some(4.0));
//! ```

mod aldrich;
mod armstrong;
mod balance;
mod bodice;
mod error;
mod input;
mod measurement;
mod profile;
mod skirt;
mod sleeve;

pub use aldrich::{
    back_armhole_guide, bust_waist_difference, front_armhole_guide, front_neck_dart,
    AldrichDerived, AldrichMeasurements, WaistDarts, ALDRICH_ROWS, REDUCED_DARTING_FACTOR,
};
pub use armstrong::{
    inches, ArmstrongDerived, ArmstrongMeasurements, BustCup, ARMSTRONG_ROWS, CM_PER_INCH,
};
pub use balance::{format_value, normalize_note, recommended_optimal_balance, StickyAutofill};
pub use bodice::{
    BodiceDerived, BodiceMeasurements, BACK_SHOULDER_EASE, BALANCE_TOLERANCE, BODICE_ROWS,
    DEFAULT_OPTIMAL_BALANCE, SHAPING_ROWS,
};
pub use error::{MeasureError, Result};
pub use input::{FormInput, HeadlessInput, InputSurface, OPTIMAL_BALANCE_KEY};
pub use measurement::{Measurement, MeasurementRow, MeasurementSheet, Unit};
pub use profile::{ease_key, FitProfile, FitTable, DEFAULT_PROFILE};
pub use skirt::{
    DartIntakes, DartOverrides, HipProfile, SkirtDerived, SkirtMeasurements, SECOND_BACK_DART_MIN,
    SKIRT_ROWS,
};
pub use sleeve::{SleeveDerived, SleeveMeasurements, SLEEVE_ROWS};

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_form_drives_bodice() {
        init_logging();
        let mut form = FormInput::new(FitTable::default()).with_rows(BODICE_ROWS);
        form.select_default_profile().unwrap();
        form.refresh_balance();

        let derived = BodiceMeasurements::read(&form).derive();
        assert_eq!(derived.brw, 47.0);
        assert_eq!(derived.optimal_balance, 3.5);
        assert_eq!(form.field(OPTIMAL_BALANCE_KEY), Some("3.50"));
    }

    #[test]
    fn test_headless_and_form_agree() {
        init_logging();
        let headless = BodiceMeasurements::read(&HeadlessInput::new()).derive();
        let mut form = FormInput::new(FitTable::default()).with_rows(BODICE_ROWS);
        form.refresh_balance();
        let from_form = BodiceMeasurements::read(&form).derive();
        assert_eq!(headless, from_form);
    }
}
