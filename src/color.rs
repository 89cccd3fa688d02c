use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Rgb – a chart fill colour
// ---------------------------------------------------------------------------

/// An opaque 8-bit sRGB colour, written as `#RRGGBB` in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Default histogram fill.
    pub const HISTOGRAM_BLUE: Rgb = Rgb(0x4E, 0x99, 0xF1);

    pub fn from_hex(hex: &str) -> Result<Self> {
        let srgb = Srgb::<u8>::from_str(hex.trim())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("'{hex}' is not a #RRGGBB colour"))?;
        Ok(Rgb(srgb.red, srgb.green, srgb.blue))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgb(self.0, self.1, self.2)
    }

    /// Same colour with `opacity` in `[0, 1]` applied, for on-screen plots.
    pub fn with_opacity(self, opacity: f32) -> Color32 {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(self.0, self.1, self.2, alpha)
    }
}

impl From<Color32> for Rgb {
    fn from(c: Color32) -> Self {
        Rgb(c.r(), c.g(), c.b())
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        assert_eq!(Rgb::from_hex("#4E99F1").unwrap(), Rgb::HISTOGRAM_BLUE);
        assert_eq!(Rgb::from_hex("4e99f1").unwrap(), Rgb::HISTOGRAM_BLUE);
        assert!(Rgb::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn hex_round_trip_through_serde() {
        let json = serde_json::to_string(&Rgb(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102FF\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb(1, 2, 255));
    }

    #[test]
    fn palette_is_distinct() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn opacity_maps_to_alpha() {
        assert_eq!(Rgb(10, 20, 30).with_opacity(1.0).a(), 255);
        assert_eq!(Rgb(10, 20, 30).with_opacity(0.0).a(), 0);
    }
}
