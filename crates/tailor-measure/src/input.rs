//! Measurement input surfaces.
//!
//! Drafts never read a form directly. They read through [`InputSurface`],
//! which has a headless implementation for programmatic use and a form
//! model that mirrors an interactive measurement dialog.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::balance::{format_value, normalize_note, recommended_optimal_balance, StickyAutofill};
use crate::error::Result;
use crate::measurement::MeasurementRow;
use crate::profile::{FitProfile, FitTable};

/// Input key of the user-editable optimal balance field.
pub const OPTIMAL_BALANCE_KEY: &str = "OptimalBalance";

/// Source of measurement values.
pub trait InputSurface {
    /// Numeric value of `key`, or `None` when absent or unparseable.
    fn number(&self, key: &str) -> Option<f64>;

    /// Text value of `key`.
    fn text(&self, key: &str) -> Option<String>;

    /// Boolean flag; absent flags are off.
    fn flag(&self, key: &str) -> bool;
}

/// Input backed by plain maps. Missing keys fall back to row defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlessInput {
    #[serde(default)]
    numbers: BTreeMap<String, f64>,
    #[serde(default)]
    texts: BTreeMap<String, String>,
    #[serde(default)]
    flags: BTreeSet<String>,
}

impl HeadlessInput {
    /// Empty input: every draft uses its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style numeric override.
    pub fn with_number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set_number(key, value);
        self
    }

    /// Builder-style text override.
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.insert(key.into(), value.into());
        self
    }

    /// Builder-style flag.
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.flags.insert(key.into());
        self
    }

    /// Set a numeric override.
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        self.numbers.insert(key.into(), value);
    }

    /// Write every ease the profile defines.
    pub fn apply_profile(&mut self, profile: &FitProfile) {
        profile.apply(|key, value| {
            self.numbers.insert(key.to_string(), value);
        });
    }
}

impl InputSurface for HeadlessInput {
    fn number(&self, key: &str) -> Option<f64> {
        self.numbers.get(key).copied()
    }

    fn text(&self, key: &str) -> Option<String> {
        self.texts.get(key).cloned()
    }

    fn flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
}

/// Parse the leading number of a form field, ignoring trailing text such as units.
fn parse_field(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<f64>() {
        return Some(v);
    }
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map_or(text.len(), |(i, _)| i);
    (1..=end)
        .rev()
        .find_map(|n| text[..n].parse::<f64>().ok())
}

/// Interactive form model.
///
/// Fields hold the text the user typed. Selecting a fit profile rewrites
/// the ease fields it defines, and [`FormInput::refresh_balance`] keeps the
/// optimal balance field in sync with bust circumference until the user
/// edits it.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    fields: BTreeMap<String, String>,
    notes: BTreeMap<String, String>,
    flags: BTreeSet<String>,
    profiles: FitTable,
    active: Option<String>,
    balance: StickyAutofill,
}

impl FormInput {
    /// An empty form over a profile table.
    pub fn new(profiles: FitTable) -> Self {
        Self {
            profiles,
            ..Default::default()
        }
    }

    /// Pre-fill raw and ease fields with row defaults.
    pub fn with_rows(mut self, rows: &[MeasurementRow]) -> Self {
        for row in rows {
            self.fields.insert(row.key.to_string(), row.default.to_string());
            if let Some(ease) = row.ease_key {
                self.fields.insert(ease.to_string(), row.default_ease.to_string());
            }
        }
        self
    }

    /// Replace the text of a field.
    pub fn set_field(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.fields.insert(key.into(), text.into());
    }

    /// Current text of a field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Set or clear a flag.
    pub fn set_flag(&mut self, key: impl Into<String>, on: bool) {
        let key = key.into();
        if on {
            self.flags.insert(key);
        } else {
            self.flags.remove(&key);
        }
    }

    /// Ease-range note shown next to a measurement.
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Name of the selected profile.
    pub fn active_profile(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Select a profile by name and write its ease values and notes.
    pub fn select_profile(&mut self, name: &str) -> Result<()> {
        let profile = self.profiles.get(name)?.clone();
        profile.apply(|key, value| {
            self.fields.insert(key.to_string(), format_value(value));
        });
        for key in profile.ease.keys() {
            match profile.note_for(key).map(normalize_note) {
                Some(note) if !note.is_empty() => {
                    self.notes.insert(key.clone(), note);
                }
                _ => {
                    self.notes.remove(key);
                }
            }
        }
        self.active = Some(profile.name);
        Ok(())
    }

    /// Select the table's default profile.
    pub fn select_default_profile(&mut self) -> Result<()> {
        let name = self.profiles.default.clone();
        self.select_profile(&name)
    }

    /// Recompute the recommended balance from the raw bust circumference
    /// and apply it to the optimal balance field. Returns whether the field changed.
    pub fn refresh_balance(&mut self) -> bool {
        let recommended = self.number("BrC").and_then(recommended_optimal_balance);
        let field = self.fields.entry(OPTIMAL_BALANCE_KEY.to_string()).or_default();
        let changed = self.balance.refresh(field, recommended);
        if changed {
            debug!("optimal balance autofilled to {field}");
        }
        changed
    }
}

impl InputSurface for FormInput {
    fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(|t| parse_field(t))
    }

    fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).cloned()
    }

    fn flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
}
