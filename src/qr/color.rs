//! Fill and background colors for rendered QR images

use crate::error::{Error, Result};
use image::{Rgb, Rgba};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An RGBA color used to paint dark modules or the background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 is fully opaque
    pub a: u8,
}

const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("navy", Color::rgb(0, 0, 128)),
    ("transparent", Color::TRANSPARENT),
];

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// White with zero alpha, so grayscale conversion still reads as light
    pub const TRANSPARENT: Color = Color::rgba(255, 255, 255, 0);

    /// Opaque color from RGB channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color name (`black`, `navy`, ...) or hex literal (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let lowered = trimmed.to_ascii_lowercase();

        if let Some((_, color)) = NAMED.iter().find(|(name, _)| *name == lowered) {
            return Ok(*color);
        }

        let digits = lowered.strip_prefix('#').unwrap_or(&lowered);
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 | 8 => digits.to_string(),
            _ => {
                return Err(Error::Config(format!(
                    "Unknown color '{trimmed}', expected a color name or #rrggbb"
                )));
            }
        };

        let bytes = hex::decode(&expanded)
            .map_err(|e| Error::Config(format!("Invalid hex color '{trimmed}': {e}")))?;

        match bytes.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            _ => Err(Error::Config(format!("Invalid hex color '{trimmed}'"))),
        }
    }

    /// Whether the color has no transparency
    pub fn is_opaque(&self) -> bool {
        self.a == u8::MAX
    }

    /// Color as an `image` RGB pixel, alpha discarded
    pub fn to_rgb(&self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    /// Color as an `image` RGBA pixel
    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
        } else {
            write!(f, "#{}", hex::encode([self.r, self.g, self.b, self.a]))
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::parse("black").unwrap(), Color::BLACK);
        assert_eq!(Color::parse(" White ").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("grey").unwrap(), Color::parse("gray").unwrap());
        assert!(!Color::parse("transparent").unwrap().is_opaque());
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::parse("#1e90ff").unwrap(), Color::rgb(0x1e, 0x90, 0xff));
        assert_eq!(Color::parse("1E90FF").unwrap(), Color::rgb(0x1e, 0x90, 0xff));
        assert_eq!(Color::parse("#fa0").unwrap(), Color::rgb(0xff, 0xaa, 0x00));
        assert_eq!(
            Color::parse("#00000080").unwrap(),
            Color::rgba(0, 0, 0, 0x80)
        );
    }

    #[test]
    fn test_invalid_colors() {
        assert!(matches!(Color::parse("chartreuse-ish"), Err(Error::Config(_))));
        assert!(matches!(Color::parse("#12345"), Err(Error::Config(_))));
        assert!(matches!(Color::parse("#zzzzzz"), Err(Error::Config(_))));
    }

    #[test]
    fn test_display_is_parseable() {
        for color in [Color::BLACK, Color::rgb(1, 2, 3), Color::TRANSPARENT] {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }
}
