//! Error types for the core crate.

use thiserror::Error;

/// Errors produced while parsing a color from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// The input was not exactly eight hex digits.
    #[error("expected 8 hex digits (AARRGGBB), got {len} characters in '{input}'")]
    BadLength { input: String, len: usize },

    /// The input contained a non-hex character.
    #[error("invalid hex digit in color '{0}'")]
    BadDigit(String),
}

/// Errors produced while parsing a length with a unit suffix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitParseError {
    /// Empty input.
    #[error("empty length")]
    Empty,

    /// The numeric part could not be parsed.
    #[error("invalid length '{0}'")]
    InvalidNumber(String),

    /// The suffix is not a known unit.
    #[error("unknown unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_error_display() {
        let err = ColorParseError::BadLength {
            input: "fff".to_string(),
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "expected 8 hex digits (AARRGGBB), got 3 characters in 'fff'"
        );
    }

    #[test]
    fn test_unit_error_display() {
        let err = UnitParseError::UnknownUnit {
            input: "3furlong".to_string(),
            unit: "furlong".to_string(),
        };
        assert_eq!(err.to_string(), "unknown unit 'furlong' in '3furlong'");
    }
}
