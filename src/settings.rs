use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// File looked up in the working directory at start-up.
pub const SETTINGS_FILE: &str = "rusty-eda.json";

/// Application settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Exported figure width in inches.
    pub figure_width_in: f32,
    /// Exported figure height in inches.
    pub figure_height_in: f32,
    /// Export resolution.
    pub dpi: u32,
    pub histogram_color: Rgb,
    pub histogram_opacity: f32,
    pub histogram_bins: usize,
    pub bar_opacity: f32,
    /// Head rows shown when the dataframe preview is first enabled.
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            figure_width_in: 9.0,
            figure_height_in: 7.0,
            dpi: 300,
            histogram_color: Rgb::HISTOGRAM_BLUE,
            histogram_opacity: 0.5,
            histogram_bins: 30,
            bar_opacity: 1.0,
            preview_rows: 1,
        }
    }
}

impl Settings {
    /// Read settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings.sanitized())
    }

    /// Like [`Settings::load`] but never fails: errors are logged and the
    /// defaults are used.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::debug!("Using settings {settings:?}");
                settings
            }
            Err(e) => {
                log::error!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    /// Pixel size of an exported figure.
    pub fn export_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f32;
        (
            (self.figure_width_in * dpi).round() as u32,
            (self.figure_height_in * dpi).round() as u32,
        )
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.figure_width_in > 0.0) {
            self.figure_width_in = defaults.figure_width_in;
        }
        if !(self.figure_height_in > 0.0) {
            self.figure_height_in = defaults.figure_height_in;
        }
        self.dpi = self.dpi.clamp(50, 600);
        self.histogram_opacity = self.histogram_opacity.clamp(0.0, 1.0);
        self.bar_opacity = self.bar_opacity.clamp(0.0, 1.0);
        self.histogram_bins = self.histogram_bins.clamp(5, 100);
        self.preview_rows = self.preview_rows.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_export_is_9_by_7_inches_at_300_dpi() {
        assert_eq!(Settings::default().export_size(), (2700, 2100));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r##"{"dpi": 100, "histogram_color": "#FF0000", "histogram_bins": 500}"##)
            .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.dpi, 100);
        assert_eq!(settings.histogram_color, Rgb(255, 0, 0));
        assert_eq!(settings.histogram_bins, 100);
        assert_eq!(settings.figure_width_in, 9.0);
    }

    #[test]
    fn malformed_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{not json").unwrap();

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }
}
