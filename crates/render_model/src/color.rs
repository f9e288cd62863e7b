//! Annotation colors
//!
//! Hosts exchange colors as six hex digits with no leading marker
//! (`"FFFF00"`). A leading `#` is accepted on input but never produced.

use crate::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Parse six hex digits, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RenderError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| RenderError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Six uppercase hex digits, no prefix
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// CSS `rgba()` value with the given opacity, clamped to `[0, 1]`
    pub fn to_css_rgba(&self, opacity: f32) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            clamp_opacity(opacity)
        )
    }
}

/// Clamp an opacity into `[0, 1]`; NaN becomes fully opaque
pub fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

impl FromStr for Rgb {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::from_hex("FFFF00").unwrap(), Rgb::YELLOW);
        assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255, 128, 0));
    }

    #[test]
    fn test_reject_malformed_hex() {
        assert!(Rgb::from_hex("FFF").is_err());
        assert!(Rgb::from_hex("GGGGGG").is_err());
        assert!(Rgb::from_hex("FFFF0000").is_err());
        assert!(Rgb::from_hex("ÿÿÿ").is_err());
    }

    #[test]
    fn test_hex_has_no_prefix() {
        assert_eq!(Rgb::new(1, 171, 255).to_hex(), "01ABFF");
    }

    #[test]
    fn test_css_rgba_clamps_opacity() {
        assert_eq!(Rgb::YELLOW.to_css_rgba(0.5), "rgba(255, 255, 0, 0.5)");
        assert_eq!(Rgb::YELLOW.to_css_rgba(3.0), "rgba(255, 255, 0, 1)");
        assert_eq!(Rgb::YELLOW.to_css_rgba(-1.0), "rgba(255, 255, 0, 0)");
        assert_eq!(clamp_opacity(f32::NAN), 1.0);
    }

    #[test]
    fn test_serde_uses_bare_hex() {
        let json = serde_json::to_string(&Rgb::new(0, 255, 0)).unwrap();
        assert_eq!(json, "\"00FF00\"");
        let parsed: Rgb = serde_json::from_str("\"00ff00\"").unwrap();
        assert_eq!(parsed, Rgb::new(0, 255, 0));
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }
}
