//! Error types for the parameter crate.

use sketchbox_core::{ColorParseError, Rgba};
use thiserror::Error;

/// A parameter declaration was rejected.
///
/// Raised synchronously while the init phase runs, so scripts see it as an
/// init failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterValidationError {
    /// `define` was called twice with the same name.
    #[error("parameter '{0}' is already defined")]
    Duplicate(String),

    /// A bound, step or default is NaN or infinite.
    #[error("{what} must be finite")]
    NotFinite { what: &'static str },

    /// Lower bound above upper bound.
    #[error("bounds [{lower}, {upper}] are inverted")]
    InvertedBounds { lower: f64, upper: f64 },

    /// Default outside the declared range.
    #[error("default {default} not in range [{lower}, {upper}]")]
    DefaultOutOfRange { default: f64, lower: f64, upper: f64 },

    /// Non-positive step.
    #[error("step must be positive, got {0}")]
    BadStep(f64),

    /// A color channel outside `[0, 1]`.
    #[error("color channels must lie in [0, 1]: {0}")]
    BadColor(Rgba),

    /// A choice without alternatives.
    #[error("choice needs at least one alternative")]
    EmptyChoice,

    /// The choice default is not one of the alternatives.
    #[error("default '{0}' is not among the alternatives")]
    UnknownDefault(String),

    /// Choice alternatives of different types.
    #[error("choice alternatives mix types: {first} and {other}")]
    MixedChoice {
        first: &'static str,
        other: &'static str,
    },

    /// Two alternatives render to the same label.
    #[error("duplicate choice label '{0}'")]
    DuplicateLabel(String),

    /// A table without columns.
    #[error("table needs at least one column")]
    EmptyTable,

    /// A table row does not match the column types.
    #[error("table row {row}: {reason}")]
    BadRow { row: usize, reason: String },

    /// Unknown table column type name.
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),

    /// Resolution with a non-positive side.
    #[error("resolution must be positive, got {width}x{height}")]
    BadResolution { width: i64, height: i64 },

    /// A script passed a value of the wrong type to a constructor.
    #[error("expected {expected}, got {got}")]
    WrongType {
        expected: &'static str,
        got: String,
    },
}

/// An override text could not be turned into a value for its parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterParseError {
    #[error("parameter '{name}': '{text}' is not a number")]
    NotANumber { name: String, text: String },

    #[error("parameter '{name}': {value} not in range [{lower}, {upper}]")]
    OutOfRange {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("parameter '{name}': expected 'true' or 'false', got '{text}'")]
    NotABool { name: String, text: String },

    #[error("parameter '{name}': {source}")]
    Color {
        name: String,
        #[source]
        source: ColorParseError,
    },

    #[error("parameter '{name}': '{text}' is not one of {choices}")]
    UnknownChoice {
        name: String,
        text: String,
        choices: String,
    },

    #[error("parameter '{name}': expected 'x,y', got '{text}'")]
    NotAPoint { name: String, text: String },

    #[error("parameter '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

impl ParameterParseError {
    /// Name of the parameter whose override failed.
    pub fn name(&self) -> &str {
        match self {
            Self::NotANumber { name, .. }
            | Self::OutOfRange { name, .. }
            | Self::NotABool { name, .. }
            | Self::Color { name, .. }
            | Self::UnknownChoice { name, .. }
            | Self::NotAPoint { name, .. }
            | Self::Invalid { name, .. } => name,
        }
    }
}

pub type ValidationResult<T> = Result<T, ParameterValidationError>;

pub type ParseResult<T> = Result<T, ParameterParseError>;
