//! Fit profiles: named ease presets with ease-range notes.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, Result};

/// Name of the profile selected when none is given.
pub const DEFAULT_PROFILE: &str = "Fit 3";

/// Input key holding the ease for `measurement`, e.g. `BrC` -> `BrCEase`.
pub fn ease_key(measurement: &str) -> String {
    format!("{measurement}Ease")
}

/// A named set of ease values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitProfile {
    /// Display name, e.g. `"Fit 3"`.
    pub name: String,
    /// Ease per measurement key.
    pub ease: BTreeMap<String, f64>,
    /// Ease-range notes per measurement key.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl FitProfile {
    fn build(name: &str, ease: [f64; 8], notes: &[(&str, &str)]) -> Self {
        const KEYS: [&str; 8] = ["AhD", "BrC", "WaC", "HiC", "BG", "AG", "BrG", "ShG"];
        Self {
            name: name.to_string(),
            ease: KEYS.iter().map(|k| k.to_string()).zip(ease).collect(),
            notes: notes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Ease defined for `key`.
    pub fn ease_for(&self, key: &str) -> Option<f64> {
        self.ease.get(key).copied()
    }

    /// Note for `key`, if the profile carries one.
    pub fn note_for(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Call `set(ease_input_key, value)` for every ease this profile defines.
    ///
    /// Keys the profile does not define are never touched.
    pub fn apply(&self, mut set: impl FnMut(&str, f64)) {
        for (key, value) in &self.ease {
            set(&ease_key(key), *value);
        }
        debug!("applied fit profile {} ({} keys)", self.name, self.ease.len());
    }
}

/// An ordered table of fit profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitTable {
    /// Profile selected by default.
    #[serde(default = "default_profile_name")]
    pub default: String,
    /// Profiles in display order.
    #[serde(rename = "profile")]
    pub profiles: Vec<FitProfile>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Default for FitTable {
    fn default() -> Self {
        Self::hofenbitzer()
    }
}

impl FitTable {
    /// The seven bodice profiles, from skin tight to loose.
    pub fn hofenbitzer() -> Self {
        let profiles = vec![
            FitProfile::build(
                "Fit 0",
                [0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                &[("AhD", "0 - 0.5 cm"), ("BrC", "0 cm"), ("WaC", "0 cm"), ("HiC", "0 cm")],
            ),
            FitProfile::build(
                "Fit 1",
                [0.45, 2.0, 1.0, 1.0, 0.1, 0.3, 0.6, 0.1],
                &[("AhD", "0.2 - 0.7 cm"), ("BrC", "2 cm"), ("WaC", "0 - 2 cm"), ("HiC", "0 - 2 cm")],
            ),
            FitProfile::build(
                "Fit 2",
                [0.75, 4.0, 3.0, 3.0, 0.3, 0.9, 0.8, 0.2],
                &[("AhD", "0.5 - 1.0 cm"), ("BrC", "4 cm"), ("WaC", "2 - 4 cm"), ("HiC", "2 - 4 cm")],
            ),
            FitProfile::build(
                "Fit 3",
                [1.3, 6.0, 5.0, 5.0, 0.5, 1.5, 1.0, 0.3],
                &[("BrC", "6 cm"), ("WaC", "4 - 6 cm"), ("HiC", "4 - 6 cm")],
            ),
            FitProfile::build(
                "Fit 4",
                [1.7, 8.0, 6.0, 6.0, 0.8, 2.0, 1.2, 0.4],
                &[("BrC", "8 cm"), ("WaC", "4 - 8 cm"), ("HiC", "4 - 8 cm")],
            ),
            FitProfile::build(
                "Fit 5",
                [2.1, 10.0, 10.0, 7.0, 1.1, 2.5, 1.4, 0.5],
                &[("BrC", "10 cm"), ("WaC", "8 - 12 cm"), ("HiC", "6 - 8 cm")],
            ),
            FitProfile::build(
                "Fit 6",
                [2.5, 12.0, 12.0, 8.0, 1.4, 3.0, 1.6, 0.6],
                &[("BrC", "12 cm"), ("WaC", "8 - 16 cm"), ("HiC", "6 - 10 cm")],
            ),
        ];
        Self {
            default: default_profile_name(),
            profiles,
        }
    }

    /// Parse a table from TOML and validate it.
    ///
    /// ```toml
    /// default = "Snug"
    ///
    /// [[profile]]
    /// name = "Snug"
    /// ease = { BrC = 4.0, WaC = 3.0 }
    /// notes = { BrC = "4 cm" }
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: Self = toml::from_str(text)?;
        table.validate()?;
        Ok(table)
    }

    /// Check that the table is non-empty, names are unique, the default
    /// exists and every ease is finite.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(MeasureError::InvalidSettings(
                "fit table has no profiles".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.name.as_str()) {
                return Err(MeasureError::InvalidSettings(format!(
                    "duplicate fit profile {}",
                    profile.name
                )));
            }
            if let Some((key, _)) = profile.ease.iter().find(|(_, v)| !v.is_finite()) {
                return Err(MeasureError::InvalidSettings(format!(
                    "profile {} has non-finite ease for {key}",
                    profile.name
                )));
            }
        }
        if !seen.contains(self.default.as_str()) {
            return Err(MeasureError::UnknownProfile(self.default.clone()));
        }
        Ok(())
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Result<&FitProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MeasureError::UnknownProfile(name.to_string()))
    }

    /// The default profile.
    pub fn default_profile(&self) -> Result<&FitProfile> {
        self.get(&self.default)
    }

    /// Profile names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(profile: &FitProfile, into: &mut BTreeMap<String, f64>) {
        profile.apply(|k, v| {
            into.insert(k.to_string(), v);
        });
    }

    #[test]
    fn test_builtin_table() {
        let table = FitTable::hofenbitzer();
        assert!(table.validate().is_ok());
        assert_eq!(table.names().count(), 7);
        let fit3 = table.default_profile().unwrap();
        assert_eq!(fit3.name, "Fit 3");
        assert_eq!(fit3.ease_for("BrC"), Some(6.0));
        assert_eq!(fit3.ease_for("AhD"), Some(1.3));
        assert_eq!(fit3.note_for("AhD"), None);
        assert_eq!(table.get("Fit 2").unwrap().note_for("AhD"), Some("0.5 - 1.0 cm"));
    }

    #[test]
    fn test_unknown_profile() {
        let table = FitTable::default();
        assert!(matches!(table.get("Fit 9"), Err(MeasureError::UnknownProfile(_))));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let profile = FitTable::default().get("Fit 5").unwrap().clone();
        let mut once = BTreeMap::new();
        collect(&profile, &mut once);
        let mut twice = once.clone();
        collect(&profile, &mut twice);
        assert_eq!(once, twice);
        assert_eq!(once.get("WaCEase"), Some(&10.0));
    }

    #[test]
    fn test_apply_leaves_undefined_keys() {
        let table = FitTable::from_toml_str(
            r#"
            default = "Snug"

            [[profile]]
            name = "Snug"
            ease = { BrC = 4.0 }
            "#,
        )
        .unwrap();
        let mut fields = BTreeMap::from([("WaCEase".to_string(), 9.0)]);
        collect(table.default_profile().unwrap(), &mut fields);
        assert_eq!(fields.get("BrCEase"), Some(&4.0));
        assert_eq!(fields.get("WaCEase"), Some(&9.0));
    }

    #[test]
    fn test_toml_errors() {
        assert!(matches!(
            FitTable::from_toml_str("profile = 3"),
            Err(MeasureError::ProfileTable(_))
        ));
        assert!(matches!(
            FitTable::from_toml_str("profile = []"),
            Err(MeasureError::InvalidSettings(_))
        ));
        let missing_default = r#"
            [[profile]]
            name = "Only"
            ease = {}
        "#;
        assert!(matches!(
            FitTable::from_toml_str(missing_default),
            Err(MeasureError::UnknownProfile(_))
        ));
    }
}
