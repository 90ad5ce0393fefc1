//! Straight-alpha RGBA colors with float channels in `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// True when every channel is finite and within `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Parses an `AARRGGBB` hex string. Each byte maps to `byte / 255`.
    pub fn from_argb_hex(s: &str) -> Result<Self, ColorParseError> {
        let s = s.trim();
        if s.len() != 8 {
            return Err(ColorParseError::BadLength {
                input: s.to_string(),
                len: s.chars().count(),
            });
        }
        // from_str_radix alone would accept a leading '+'
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let word =
            u32::from_str_radix(s, 16).map_err(|_| ColorParseError::BadDigit(s.to_string()))?;
        let channel = |shift: u32| ((word >> shift) & 0xFF) as f64 / 255.0;
        Ok(Self {
            a: channel(24),
            r: channel(16),
            g: channel(8),
            b: channel(0),
        })
    }

    /// Formats as `AARRGGBB`, rounding each channel to the nearest byte.
    pub fn to_argb_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "{:02X}{:02X}{:02X}{:02X}",
            byte(self.a),
            byte(self.r),
            byte(self.g),
            byte(self.b)
        )
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_argb_hex(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argb() {
        let c = Rgba::from_argb_hex("80FF0000").unwrap();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_short_and_bad_digits() {
        assert!(matches!(
            Rgba::from_argb_hex("FF0000"),
            Err(ColorParseError::BadLength { len: 6, .. })
        ));
        assert!(matches!(
            Rgba::from_argb_hex("FFGG0000"),
            Err(ColorParseError::BadDigit(_))
        ));
        assert!(Rgba::from_argb_hex("+FF00000").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Rgba::from_argb_hex("ff102030").unwrap();
        assert_eq!(c.to_argb_hex(), "FF102030");
    }
}
