use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::config::PaletteConfig;

// ---------------------------------------------------------------------------
// Color parsing / generation
// ---------------------------------------------------------------------------

/// Parse `#D22D49`, `D22D49`, `#fff` or a CSS color name (`darkkhaki`).
pub fn parse_color(text: &str) -> Result<Color32> {
    let text = text.trim();
    let rgb: Srgb<u8> = if text.starts_with('#') || text.chars().all(|c| c.is_ascii_hexdigit()) {
        text.parse::<Srgb<u8>>()
            .map_err(|e| anyhow!("invalid hex color '{text}': {e}"))?
    } else {
        palette::named::from_str(&text.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("unknown color name '{text}'"))?
    };
    Ok(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pitch palette: pitch name → Color32
// ---------------------------------------------------------------------------

/// Fixed pitch-name colours for the location chart.
#[derive(Debug, Clone)]
pub struct PitchPalette {
    mapping: BTreeMap<String, Color32>,
    other: Color32,
}

impl PitchPalette {
    /// Build from config. Entries whose colour does not parse get an evenly
    /// spaced hue instead, so every listed pitch stays distinguishable.
    pub fn from_config(config: &PaletteConfig) -> Self {
        let fallback = generate_palette(config.pitches.len());
        let mapping = config
            .pitches
            .iter()
            .zip(fallback)
            .map(|(entry, generated)| {
                let color = parse_color(&entry.color).unwrap_or_else(|e| {
                    log::warn!("Palette entry '{}': {e:#}", entry.pitch);
                    generated
                });
                (entry.pitch.clone(), color)
            })
            .collect();
        let other = parse_color(&config.other).unwrap_or_else(|e| {
            log::warn!("Palette 'other': {e:#}");
            Color32::BLACK
        });
        PitchPalette { mapping, other }
    }

    /// Colour for a pitch name; anything unlisted is drawn as "Other".
    pub fn color_for(&self, pitch: &str) -> Color32 {
        self.mapping.get(pitch).copied().unwrap_or(self.other)
    }

    pub fn other(&self) -> Color32 {
        self.other
    }

    /// Legend entries (pitch name → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(name, c)| (name.clone(), *c))
            .chain(std::iter::once(("Other".to_string(), self.other)))
            .collect()
    }
}

impl Default for PitchPalette {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PitchColor;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(parse_color("#D22D49").unwrap(), Color32::from_rgb(0xD2, 0x2D, 0x49));
        assert_eq!(parse_color("teal").unwrap(), Color32::from_rgb(0, 128, 128));
        assert_eq!(parse_color("DarkKhaki").unwrap(), Color32::from_rgb(189, 183, 107));
        assert!(parse_color("not-a-color").is_err());
    }

    #[test]
    fn unknown_pitches_use_other() {
        let palette = PitchPalette::default();
        assert_eq!(palette.color_for("Sinker"), Color32::from_rgb(0xFE, 0x9D, 0x00));
        assert_eq!(palette.color_for("Eephus"), palette.other());
        assert_eq!(palette.other(), Color32::from_rgb(0, 0, 0));
    }

    #[test]
    fn unparsable_entry_gets_generated_colour() {
        let config = PaletteConfig {
            pitches: vec![PitchColor {
                pitch: "Knuckleball".to_string(),
                color: "mauve-ish".to_string(),
            }],
            other: "black".to_string(),
        };
        let palette = PitchPalette::from_config(&config);
        assert_eq!(palette.color_for("Knuckleball"), generate_palette(1)[0]);
        assert_eq!(palette.legend_entries().len(), 2);
    }
}
