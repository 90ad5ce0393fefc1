//! # Sketchbox Params
//!
//! The typed parameter model scripts declare during their init phase:
//! the closed [`ParameterKind`] set, the ordered [`ParameterGroup`]
//! registry, and the [`ValueSource`] backends (defaults, environment/text
//! overrides, live widget values) that produce a fresh value snapshot for
//! every rendered frame.

pub mod drag;
pub mod error;
pub mod group;
pub mod kind;
pub mod source;
pub mod value;

pub use drag::{DragRule, ParameterDrag};
pub use error::{ParameterParseError, ParameterValidationError, ParseResult, ValidationResult};
pub use group::{Parameter, ParameterGroup, ParameterValues, Resolution};
pub use kind::{
    wrap_angle, Constraints, ParameterKind, DEFAULT_FONT, DEFAULT_INFINITE_RATE,
    DEFAULT_NUMERIC_STEP, DEFAULT_NUMERIC_VALUE,
};
pub use source::{Defaults, LiveValues, TextSource, ValueSource};
pub use value::{ColumnType, ImageSource, Value};
