//! Garment selection and draft requests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use tailor_measure::{FitTable, HeadlessInput, InputSurface};

use crate::aldrich::draft_aldrich_bodice;
use crate::armstrong::draft_armstrong_bodice;
use crate::bodice::draft_casual_bodice;
use crate::context::DraftContext;
use crate::error::{DraftError, Result};
use crate::settings::DraftSettings;
use crate::shaping::draft_shaping_bodice;
use crate::skirt::draft_basic_skirt;
use crate::sleeve::draft_tight_sleeve;
use crate::types::Orientation;

/// The drafts this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Garment {
    /// Casual bodice block.
    #[default]
    CasualBodice,
    /// Shaping bodice with darts.
    ShapingBodice,
    /// Tight basic sleeve.
    TightSleeve,
    /// Basic straight skirt.
    BasicSkirt,
    /// Inch-based front and back bodice.
    ArmstrongBodice,
    /// Close-fitting bodice block.
    AldrichBodice,
}

impl Garment {
    /// Every garment, in menu order.
    pub const ALL: [Garment; 6] = [
        Garment::CasualBodice,
        Garment::ShapingBodice,
        Garment::TightSleeve,
        Garment::BasicSkirt,
        Garment::ArmstrongBodice,
        Garment::AldrichBodice,
    ];

    /// Stable name, also used as the draft's variant.
    pub fn name(self) -> &'static str {
        match self {
            Garment::CasualBodice => "casual-bodice",
            Garment::ShapingBodice => "shaping-bodice",
            Garment::TightSleeve => "tight-sleeve",
            Garment::BasicSkirt => "basic-skirt",
            Garment::ArmstrongBodice => "armstrong-bodice",
            Garment::AldrichBodice => "aldrich-bodice",
        }
    }

    /// Axis direction of the draft.
    pub fn orientation(self) -> Orientation {
        match self {
            Garment::TightSleeve => Orientation::YUp,
            _ => Orientation::YDown,
        }
    }

    /// Whether fit profile eases apply to this garment's rows.
    pub fn uses_fit_profiles(self) -> bool {
        matches!(self, Garment::CasualBodice | Garment::ShapingBodice)
    }

    /// Draft this garment.
    pub fn draft(self, input: &dyn InputSurface, settings: &DraftSettings) -> Result<DraftContext> {
        match self {
            Garment::CasualBodice => draft_casual_bodice(input, settings),
            Garment::ShapingBodice => draft_shaping_bodice(input, settings),
            Garment::TightSleeve => draft_tight_sleeve(input, settings),
            Garment::BasicSkirt => draft_basic_skirt(input, settings),
            Garment::ArmstrongBodice => draft_armstrong_bodice(input, settings),
            Garment::AldrichBodice => draft_aldrich_bodice(input, settings),
        }
    }
}

impl fmt::Display for Garment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Garment {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(&['_', ' '][..], "-");
        Garment::ALL
            .into_iter()
            .find(|g| g.name() == wanted)
            .ok_or_else(|| DraftError::UnknownGarment(s.to_string()))
    }
}

/// A garment plus the measurements to draft it with.
///
/// Loaded from TOML, for example:
///
/// ```toml
/// garment = "shaping-bodice"
/// profile = "Fit 2"
///
/// [numbers]
/// BrC = 92.0
/// ```
///
/// A profile writes its eases first, so explicit numbers win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftRequest {
    /// What to draft.
    pub garment: Garment,
    /// Fit profile to apply, by name.
    pub profile: Option<String>,
    /// Numeric measurement and ease overrides.
    pub numbers: BTreeMap<String, f64>,
    /// Text inputs such as the hip profile.
    pub texts: BTreeMap<String, String>,
    /// Flags that are switched on.
    pub flags: Vec<String>,
}

impl DraftRequest {
    /// A request for `garment` with default measurements.
    pub fn new(garment: Garment) -> Self {
        Self {
            garment,
            ..Default::default()
        }
    }

    /// Parse a request from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build the input surface, applying the profile from `table` first.
    pub fn input(&self, table: &FitTable) -> Result<HeadlessInput> {
        let mut input = HeadlessInput::new();
        if let Some(name) = &self.profile {
            let profile = table.get(name)?;
            if self.garment.uses_fit_profiles() {
                input.apply_profile(profile);
                debug!("applied fit profile '{name}' to {}", self.garment);
            } else {
                debug!("fit profile '{name}' has no rows in {}", self.garment);
            }
        }
        for (key, value) in &self.numbers {
            input.set_number(key.as_str(), *value);
        }
        for (key, value) in &self.texts {
            input = input.with_text(key.as_str(), value.as_str());
        }
        for flag in &self.flags {
            input = input.with_flag(flag.as_str());
        }
        Ok(input)
    }

    /// Draft the requested garment.
    pub fn run(&self, table: &FitTable, settings: &DraftSettings) -> Result<DraftContext> {
        let input = self.input(table)?;
        self.garment.draft(&input, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailor_measure::MeasureError;

    #[test]
    fn test_garment_names() {
        for g in Garment::ALL {
            assert_eq!(g.name().parse::<Garment>().unwrap(), g);
        }
        assert_eq!("Tight Sleeve".parse::<Garment>().unwrap(), Garment::TightSleeve);
        assert_eq!("basic_skirt".parse::<Garment>().unwrap(), Garment::BasicSkirt);
        assert_eq!(
            "Aldrich Bodice".parse::<Garment>().unwrap(),
            Garment::AldrichBodice
        );
        assert!(matches!(
            "cape".parse::<Garment>(),
            Err(DraftError::UnknownGarment(_))
        ));
    }

    #[test]
    fn test_every_garment_drafts_cleanly() {
        let _ = env_logger::builder().is_test(true).try_init();
        let settings = DraftSettings::default();
        for g in Garment::ALL {
            let ctx = g.draft(&HeadlessInput::new(), &settings).unwrap();
            assert_eq!(ctx.variant, g.name());
            assert_eq!(ctx.orientation, g.orientation());
            assert!(ctx.skipped().is_empty(), "{g}: {:?}", ctx.skipped());
            assert!(!ctx.measurements().is_empty());
        }
    }

    #[test]
    fn test_request_from_toml() {
        let request = DraftRequest::from_toml_str(
            "garment = \"basic-skirt\"\n[texts]\nHipProfile = \"Curvy\"\n[numbers]\nMoL = 60.0\n",
        )
        .unwrap();
        assert_eq!(request.garment, Garment::BasicSkirt);
        let ctx = request.run(&FitTable::hofenbitzer(), &DraftSettings::default()).unwrap();
        assert_eq!(ctx.point("2").unwrap().y, 60.0);
        assert!(!ctx.contains("15"));
    }

    #[test]
    fn test_inch_request_reads_cup() {
        let request = DraftRequest::from_toml_str(
            "garment = \"armstrong-bodice\"\n[texts]\nBustCup = \"C Cup\"\n",
        )
        .unwrap();
        let ctx = request.run(&FitTable::hofenbitzer(), &DraftSettings::default()).unwrap();
        assert!(ctx.skipped().is_empty());
        assert_eq!(ctx.value("BustCupOffset"), Some(1.5 * 2.54));
    }

    #[test]
    fn test_profile_then_numbers() {
        let mut request = DraftRequest::new(Garment::CasualBodice);
        request.profile = Some("Fit 0".into());
        request.numbers.insert("BrCEase".into(), 1.0);
        let input = request.input(&FitTable::hofenbitzer()).unwrap();
        assert_eq!(input.number("BrCEase"), Some(1.0));
        assert_eq!(input.number("AhDEase"), Some(0.25));
    }

    #[test]
    fn test_unknown_profile_is_an_error() {
        let mut request = DraftRequest::new(Garment::ShapingBodice);
        request.profile = Some("Fit 9".into());
        let err = request
            .run(&FitTable::hofenbitzer(), &DraftSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DraftError::Measure(MeasureError::UnknownProfile(_))
        ));
    }
}
