//! Unit conversion utilities
//!
//! Scripts are dimensioned in millimeters; output surfaces are sized in
//! typographic points (1/72 in) or device pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnitParseError;

pub const MM_PER_INCH: f64 = 25.4;
pub const PT_PER_INCH: f64 = 72.0;

/// Physical length unit accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Millimeter,
    Inch,
    #[default]
    Point,
}

impl LengthUnit {
    /// Converts `value` in this unit to points.
    pub fn to_points(self, value: f64) -> f64 {
        match self {
            Self::Millimeter => mm_to_pt(value),
            Self::Inch => value * PT_PER_INCH,
            Self::Point => value,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeter => write!(f, "mm"),
            Self::Inch => write!(f, "in"),
            Self::Point => write!(f, "pt"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm" => Ok(Self::Millimeter),
            "in" | "inch" => Ok(Self::Inch),
            "pt" | "" => Ok(Self::Point),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * PT_PER_INCH
}

pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_INCH * MM_PER_INCH
}

/// Whole device pixels covering `pts` points at `dpi`.
pub fn pt_to_pixel(pts: f64, dpi: f64) -> i32 {
    (pts * dpi / PT_PER_INCH) as i32
}

/// Device units per millimeter at `dpi`.
pub fn px_per_mm(dpi: f64) -> f64 {
    dpi / MM_PER_INCH
}

/// Parses a length such as `210mm`, `8.5in`, `612pt` or `612` into points.
///
/// A bare number is taken as points.
pub fn parse_length(input: &str) -> Result<f64, UnitParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitParseError::Empty);
    }

    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, suffix) = input.split_at(split);
    let unit = LengthUnit::from_str(suffix).map_err(|_| UnitParseError::UnknownUnit {
        input: input.to_string(),
        unit: suffix.to_string(),
    })?;
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| UnitParseError::InvalidNumber(input.to_string()))?;

    Ok(unit.to_points(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("72").unwrap(), 72.0);
        assert_eq!(parse_length("72pt").unwrap(), 72.0);
        assert_eq!(parse_length("2in").unwrap(), 144.0);
        assert!((parse_length("25.4mm").unwrap() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_length_errors() {
        assert_eq!(parse_length("  "), Err(UnitParseError::Empty));
        assert!(matches!(
            parse_length("3cm"),
            Err(UnitParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_length("mm"),
            Err(UnitParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_pixels() {
        assert_eq!(pt_to_pixel(72.0, 96.0), 96);
        assert!((px_per_mm(25.4) - 1.0).abs() < 1e-12);
    }
}
