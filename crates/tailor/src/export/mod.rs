//! Export formats for finished drafts.
//!
//! - SVG ([`svg::SvgDocument`]) for screen and 1:1 printing
//! - DXF R12 ([`dxf::DxfDocument`]) for plotters and pattern CAD
//! - JSON, the serialized [`DraftContext`]

pub mod dxf;
pub mod svg;

use std::fs;
use std::path::Path;

use log::info;
use tailor_draft::DraftContext;

use crate::error::{ExportError, Result};
use crate::settings::ExportSettings;

/// Output format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Scalable Vector Graphics.
    Svg,
    /// AutoCAD DXF R12.
    Dxf,
    /// Serialized draft.
    Json,
}

impl Format {
    /// Format for the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Format::Svg),
            "dxf" => Ok(Format::Dxf),
            "json" => Ok(Format::Json),
            _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Write `ctx` to `path` in the format its extension names.
pub fn write_draft(
    ctx: &DraftContext,
    path: impl AsRef<Path>,
    settings: &ExportSettings,
) -> Result<Format> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    match format {
        Format::Svg => svg::SvgDocument::from_draft(ctx, settings)?.save(path)?,
        Format::Dxf => dxf::DxfDocument::from_draft(ctx, settings)?.export(path)?,
        Format::Json => fs::write(path, serde_json::to_string_pretty(ctx)?)?,
    }
    info!("wrote {} as {:?} to {}", ctx.variant, format, path.display());
    Ok(format)
}

/// Read a draft written as JSON.
pub fn read_draft_json(path: impl AsRef<Path>) -> Result<DraftContext> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tailor_draft::{DraftSettings, Garment};
    use tailor_measure::HeadlessInput;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.SVG")).unwrap(), Format::Svg);
        assert_eq!(Format::from_path(Path::new("b.dxf")).unwrap(), Format::Dxf);
        assert!(matches!(
            Format::from_path(Path::new("b.pdf")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(Format::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_json_round_trip_on_disk() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = Garment::CasualBodice
            .draft(&HeadlessInput::new(), &DraftSettings::default())
            .unwrap();
        let path = std::env::temp_dir().join("tailor_test_bodice.json");
        assert_eq!(
            write_draft(&ctx, &path, &ExportSettings::default()).unwrap(),
            Format::Json
        );
        let back = read_draft_json(&path).unwrap();
        assert_eq!(back.points().len(), ctx.points().len());
        for (a, b) in back.points().iter().zip(ctx.points()) {
            assert_eq!(a.label, b.label);
            assert_abs_diff_eq!(a.point.x, b.point.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.point.y, b.point.y, epsilon = 1e-9);
        }
        assert_eq!(back.paths().len(), ctx.paths().len());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("tailor_no_such_draft.json");
        let _ = fs::remove_file(&path);
        assert!(matches!(read_draft_json(&path), Err(ExportError::Io(_))));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        let path = std::env::temp_dir().join("tailor_test_bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_draft_json(&path), Err(ExportError::Json(_))));
    }
}
