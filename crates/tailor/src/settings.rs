//! Export settings.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Drawing parameters shared by the SVG and DXF writers. Lengths are in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Blank border around the draft bounds.
    pub margin: f64,
    /// Stroke width of every path.
    pub stroke_width: f64,
    /// Dash and gap lengths for dashed strokes.
    pub dash_pattern: Vec<f64>,
    /// Radius of a point marker.
    pub marker_radius: f64,
    /// Font size of marker labels. Zero hides labels.
    pub label_font_size: f64,
    /// Line segments per cubic when curves are flattened for DXF.
    pub flatten_steps: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            margin: 2.0,
            stroke_width: 0.1,
            dash_pattern: vec![0.5, 0.3],
            marker_radius: 0.15,
            label_font_size: 0.6,
            flatten_steps: 16,
        }
    }
}

impl ExportSettings {
    /// Parse settings from TOML; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.margin >= 0.0) || !self.margin.is_finite() {
            return Err(ExportError::InvalidSettings(
                "margin must be finite and non-negative".into(),
            ));
        }
        if !(self.stroke_width > 0.0) {
            return Err(ExportError::InvalidSettings(
                "stroke_width must be positive".into(),
            ));
        }
        if self.dash_pattern.iter().any(|d| !(*d > 0.0)) {
            return Err(ExportError::InvalidSettings(
                "dash_pattern entries must be positive".into(),
            ));
        }
        if !(self.marker_radius >= 0.0) {
            return Err(ExportError::InvalidSettings(
                "marker_radius must be non-negative".into(),
            ));
        }
        if !(self.label_font_size >= 0.0) {
            return Err(ExportError::InvalidSettings(
                "label_font_size must be non-negative".into(),
            ));
        }
        if self.flatten_steps == 0 {
            return Err(ExportError::InvalidSettings(
                "flatten_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Dash pattern as an SVG `stroke-dasharray` value.
    pub fn dash_array(&self) -> String {
        self.dash_pattern
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let s = ExportSettings::default();
        s.validate().unwrap();
        assert_eq!(s.dash_array(), "0.5 0.3");
    }

    #[test]
    fn test_from_toml() {
        let s = ExportSettings::from_toml_str("margin = 1.0\ndash_pattern = [1.0]\n").unwrap();
        assert_eq!(s.margin, 1.0);
        assert_eq!(s.dash_array(), "1");
        assert_eq!(s.flatten_steps, 16);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ExportSettings::from_toml_str("flatten_steps = 0"),
            Err(ExportError::InvalidSettings(_))
        ));
        assert!(matches!(
            ExportSettings::from_toml_str("dash_pattern = [0.5, -1.0]"),
            Err(ExportError::InvalidSettings(_))
        ));
        assert!(matches!(
            ExportSettings::from_toml_str("margin = \"wide\""),
            Err(ExportError::SettingsFile(_))
        ));
    }
}
