//! Measurements of the inch-based front and back bodice.
//!
//! The rows are entered in inches, like the chart they come from, and are
//! converted to centimeters when derived so the draft shares the same
//! kernels and exports as every other garment.

use serde::{Deserialize, Serialize};

use crate::input::InputSurface;
use crate::measurement::{MeasurementRow, MeasurementSheet, Unit};

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Convert inches to centimeters.
pub fn inches(value: f64) -> f64 {
    value * CM_PER_INCH
}

const fn inch_row(key: &'static str, label: &'static str, default: f64) -> MeasurementRow {
    MeasurementRow::new(key, label, default).in_unit(Unit::Inches)
}

/// Bodice rows, size 12 defaults in inches.
///
/// A back row left at zero falls back to the matching front row.
pub const ARMSTRONG_ROWS: &[MeasurementRow] = &[
    inch_row("FullLength", "Full length", 18.0),
    inch_row("AcrossShoulder", "Across shoulder", 7.9375),
    inch_row("CentreFrontLength", "Centre front length", 14.875),
    inch_row("BustArc", "Bust arc", 10.375),
    inch_row("ShoulderSlope", "Shoulder slope", 18.125),
    inch_row("BustDepth", "Bust depth", 9.6875),
    inch_row("ShoulderLength", "Shoulder length", 5.375),
    inch_row("BustSpan", "Bust span", 4.0625),
    inch_row("AcrossChest", "Across chest", 6.9375),
    inch_row("DartPlacement", "Dart placement", 3.4375),
    inch_row("NewStrap", "New strap", 18.1875),
    inch_row("SideLength", "Side length", 8.5),
    inch_row("WaistArc", "Waist arc", 7.375),
    inch_row("FullLengthBack", "Back full length", 17.875),
    inch_row("AcrossShoulderBack", "Back across shoulder", 8.1875),
    inch_row("CentreBackLength", "Centre back length", 17.0),
    inch_row("BustArcBack", "Back arc", 9.0),
    inch_row("ShoulderSlopeBack", "Back shoulder slope", 17.375),
    inch_row("ShoulderLengthBack", "Back shoulder length", 5.375),
    inch_row("AcrossBack", "Across back", 7.1875),
    inch_row("DartPlacementBack", "Back dart placement", 3.4375),
    inch_row("SideLengthBack", "Back side length", 8.5),
    inch_row("WaistArcBack", "Back waist arc", 7.0),
    inch_row("BackNeck", "Back neck", 3.125),
];

/// Cup size, which sets how far the side seam swings out below the bust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BustCup {
    /// A cup.
    A,
    /// B cup.
    #[default]
    B,
    /// C cup.
    C,
    /// D cup.
    D,
}

impl BustCup {
    /// Parse a cup such as `"B Cup"`, `"c"` or `"D-cup"`.
    ///
    /// The word "cup" and anything that is not a letter are dropped and the
    /// first remaining letter decides. Anything unrecognized is a B cup.
    pub fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase().replace("CUP", "");
        match upper.chars().find(char::is_ascii_uppercase) {
            Some('A') => Self::A,
            Some('C') => Self::C,
            Some('D') => Self::D,
            _ => Self::B,
        }
    }

    /// Side seam offset in inches.
    pub fn offset_inches(self) -> f64 {
        match self {
            Self::A => 0.875,
            Self::B => 1.25,
            Self::C => 1.5,
            Self::D => 1.75,
        }
    }
}

/// Measurements read for the inch-based bodice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmstrongMeasurements {
    /// Regular rows, in inches.
    pub sheet: MeasurementSheet,
    /// Cup size.
    pub cup: BustCup,
}

impl ArmstrongMeasurements {
    /// Read the rows and the `BustCup` text.
    pub fn read(input: &dyn InputSurface) -> Self {
        Self {
            sheet: MeasurementSheet::read(ARMSTRONG_ROWS, input),
            cup: input
                .text("BustCup")
                .map(|t| BustCup::from_name(&t))
                .unwrap_or_default(),
        }
    }

    /// Convert every row to centimeters, resolving back rows.
    pub fn derive(&self) -> ArmstrongDerived {
        let cm = |key: &str| inches(self.sheet.raw(key));
        let back = |key: &str, front: &str| {
            let v = cm(key);
            if v != 0.0 {
                v
            } else {
                cm(front)
            }
        };
        ArmstrongDerived {
            full_length: cm("FullLength"),
            across_shoulder: cm("AcrossShoulder"),
            centre_front_length: cm("CentreFrontLength"),
            bust_arc: cm("BustArc"),
            shoulder_slope: cm("ShoulderSlope"),
            bust_depth: cm("BustDepth"),
            shoulder_length: cm("ShoulderLength"),
            bust_span: cm("BustSpan"),
            across_chest: cm("AcrossChest"),
            dart_placement: cm("DartPlacement"),
            new_strap: cm("NewStrap"),
            side_length: cm("SideLength"),
            waist_arc: cm("WaistArc"),
            back_full_length: back("FullLengthBack", "FullLength"),
            back_across_shoulder: back("AcrossShoulderBack", "AcrossShoulder"),
            centre_back_length: back("CentreBackLength", "CentreFrontLength"),
            back_arc: back("BustArcBack", "BustArc"),
            back_shoulder_slope: back("ShoulderSlopeBack", "ShoulderSlope"),
            back_shoulder_length: back("ShoulderLengthBack", "ShoulderLength"),
            across_back: back("AcrossBack", "AcrossChest"),
            back_dart_placement: back("DartPlacementBack", "DartPlacement"),
            back_side_length: back("SideLengthBack", "SideLength"),
            back_waist_arc: back("WaistArcBack", "WaistArc"),
            back_neck: cm("BackNeck"),
            cup_offset: inches(self.cup.offset_inches()),
            cup: self.cup,
        }
    }
}

impl Default for ArmstrongMeasurements {
    fn default() -> Self {
        Self::read(&crate::input::HeadlessInput::new())
    }
}

/// Construction values of the inch-based bodice, converted to cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmstrongDerived {
    /// Front full length.
    pub full_length: f64,
    /// Front across shoulder.
    pub across_shoulder: f64,
    /// Centre front length.
    pub centre_front_length: f64,
    /// Front bust arc.
    pub bust_arc: f64,
    /// Front shoulder slope.
    pub shoulder_slope: f64,
    /// Bust depth.
    pub bust_depth: f64,
    /// Front shoulder length.
    pub shoulder_length: f64,
    /// Bust span.
    pub bust_span: f64,
    /// Across chest.
    pub across_chest: f64,
    /// Front dart placement.
    pub dart_placement: f64,
    /// New strap.
    pub new_strap: f64,
    /// Front side length.
    pub side_length: f64,
    /// Front waist arc.
    pub waist_arc: f64,
    /// Back full length.
    pub back_full_length: f64,
    /// Back across shoulder.
    pub back_across_shoulder: f64,
    /// Centre back length.
    pub centre_back_length: f64,
    /// Back arc.
    pub back_arc: f64,
    /// Back shoulder slope.
    pub back_shoulder_slope: f64,
    /// Back shoulder length.
    pub back_shoulder_length: f64,
    /// Across back.
    pub across_back: f64,
    /// Back dart placement.
    pub back_dart_placement: f64,
    /// Back side length.
    pub back_side_length: f64,
    /// Back waist arc.
    pub back_waist_arc: f64,
    /// Back neck.
    pub back_neck: f64,
    /// Cup size.
    pub cup: BustCup,
    /// Side seam offset of the cup.
    pub cup_offset: f64,
}
