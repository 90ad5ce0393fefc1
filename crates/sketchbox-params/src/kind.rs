//! The closed set of parameter variants.
//!
//! Every variant carries its own default and constraints. Constructors
//! validate eagerly; [`ParameterKind::validate`] is re-run by
//! `ParameterGroup::define` so a hand-built kind cannot bypass the checks.

use sketchbox_core::{Point, Rgba};
use std::f64::consts::TAU;
use std::fmt;
use std::path::PathBuf;

use crate::error::{
    ParameterParseError, ParameterValidationError, ParseResult, ValidationResult,
};
use crate::value::{ColumnType, ImageSource, Value};

pub const DEFAULT_NUMERIC_STEP: f64 = 1.0 / 128.0;
pub const DEFAULT_NUMERIC_VALUE: f64 = 0.5;
pub const DEFAULT_INFINITE_RATE: f64 = 0.125;
pub const DEFAULT_FONT: &str = "monospace";

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterKind {
    Numeric {
        lower: f64,
        upper: f64,
        step: f64,
        default: f64,
    },
    Infinite {
        default: f64,
        rate: f64,
    },
    /// Radians in `[0, 2π]`.
    Angle {
        default: f64,
    },
    Toggle {
        default: bool,
    },
    Color {
        default: Rgba,
    },
    Text {
        default: String,
        multiline: bool,
    },
    Choice {
        /// `(label, value)` pairs in display order.
        alternatives: Vec<(String, Value)>,
        default: usize,
        with_entry: bool,
    },
    Font {
        default: String,
    },
    Image {
        default: ImageSource,
    },
    Point {
        default: Point,
    },
    Table {
        columns: Vec<ColumnType>,
        rows: Vec<Vec<Value>>,
    },
    Script {
        default: PathBuf,
    },
    /// Opaque value supplied by the script. Overrides are read as JSON.
    Custom {
        default: Value,
    },
}

fn finite(value: f64, what: &'static str) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterValidationError::NotFinite { what })
    }
}

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

impl ParameterKind {
    pub fn numeric(lower: f64, upper: f64, step: f64, default: f64) -> ValidationResult<Self> {
        let kind = Self::Numeric {
            lower,
            upper,
            step,
            default,
        };
        kind.validate()?;
        Ok(kind)
    }

    pub fn infinite(default: f64, rate: f64) -> ValidationResult<Self> {
        let kind = Self::Infinite { default, rate };
        kind.validate()?;
        Ok(kind)
    }

    pub fn angle(default: f64) -> ValidationResult<Self> {
        let kind = Self::Angle { default };
        kind.validate()?;
        Ok(kind)
    }

    pub fn toggle(default: bool) -> Self {
        Self::Toggle { default }
    }

    pub fn color(default: Rgba) -> ValidationResult<Self> {
        let kind = Self::Color { default };
        kind.validate()?;
        Ok(kind)
    }

    pub fn text(default: impl Into<String>, multiline: bool) -> Self {
        Self::Text {
            default: default.into(),
            multiline,
        }
    }

    /// A choice over plain values, labelled by their display form.
    pub fn choice_list(
        values: Vec<Value>,
        default: &Value,
        with_entry: bool,
    ) -> ValidationResult<Self> {
        let index = values
            .iter()
            .position(|v| v == default)
            .ok_or_else(|| ParameterValidationError::UnknownDefault(default.to_string()))?;
        let alternatives = values.into_iter().map(|v| (v.to_string(), v)).collect();
        let kind = Self::Choice {
            alternatives,
            default: index,
            with_entry,
        };
        kind.validate()?;
        Ok(kind)
    }

    /// A choice over labelled values; `default` names a label.
    pub fn choice_map(
        entries: Vec<(String, Value)>,
        default: &str,
        with_entry: bool,
    ) -> ValidationResult<Self> {
        let index = entries
            .iter()
            .position(|(label, _)| label == default)
            .ok_or_else(|| ParameterValidationError::UnknownDefault(default.to_string()))?;
        let kind = Self::Choice {
            alternatives: entries,
            default: index,
            with_entry,
        };
        kind.validate()?;
        Ok(kind)
    }

    pub fn font(default: impl Into<String>) -> Self {
        Self::Font {
            default: default.into(),
        }
    }

    pub fn image(default: ImageSource) -> Self {
        Self::Image { default }
    }

    pub fn point(default: Point) -> ValidationResult<Self> {
        let kind = Self::Point { default };
        kind.validate()?;
        Ok(kind)
    }

    pub fn table(columns: Vec<ColumnType>, rows: Vec<Vec<Value>>) -> ValidationResult<Self> {
        let kind = Self::Table { columns, rows };
        kind.validate()?;
        Ok(kind)
    }

    pub fn script(default: impl Into<PathBuf>) -> Self {
        Self::Script {
            default: default.into(),
        }
    }

    pub fn custom(default: Value) -> Self {
        Self::Custom { default }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Numeric { .. } => "numeric",
            Self::Infinite { .. } => "infinite",
            Self::Angle { .. } => "angle",
            Self::Toggle { .. } => "toggle",
            Self::Color { .. } => "color",
            Self::Text { .. } => "text",
            Self::Choice { .. } => "choice",
            Self::Font { .. } => "font",
            Self::Image { .. } => "image",
            Self::Point { .. } => "point",
            Self::Table { .. } => "table",
            Self::Script { .. } => "script",
            Self::Custom { .. } => "custom",
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Numeric {
                lower,
                upper,
                step,
                default,
            } => {
                finite(*lower, "lower bound")?;
                finite(*upper, "upper bound")?;
                finite(*step, "step")?;
                finite(*default, "default")?;
                if lower > upper {
                    return Err(ParameterValidationError::InvertedBounds {
                        lower: *lower,
                        upper: *upper,
                    });
                }
                if *step <= 0.0 {
                    return Err(ParameterValidationError::BadStep(*step));
                }
                if default < lower || default > upper {
                    return Err(ParameterValidationError::DefaultOutOfRange {
                        default: *default,
                        lower: *lower,
                        upper: *upper,
                    });
                }
                Ok(())
            }
            Self::Infinite { default, rate } => {
                finite(*default, "default")?;
                finite(*rate, "rate")
            }
            Self::Angle { default } => {
                finite(*default, "default")?;
                if !(0.0..=TAU).contains(default) {
                    return Err(ParameterValidationError::DefaultOutOfRange {
                        default: *default,
                        lower: 0.0,
                        upper: TAU,
                    });
                }
                Ok(())
            }
            Self::Color { default } => {
                if default.is_valid() {
                    Ok(())
                } else {
                    Err(ParameterValidationError::BadColor(*default))
                }
            }
            Self::Choice {
                alternatives,
                default,
                ..
            } => {
                let (_, first) = alternatives
                    .first()
                    .ok_or(ParameterValidationError::EmptyChoice)?;
                for (i, (label, value)) in alternatives.iter().enumerate() {
                    if value.type_name() != first.type_name() {
                        return Err(ParameterValidationError::MixedChoice {
                            first: first.type_name(),
                            other: value.type_name(),
                        });
                    }
                    if alternatives[..i].iter().any(|(other, _)| other == label) {
                        return Err(ParameterValidationError::DuplicateLabel(label.clone()));
                    }
                }
                if *default >= alternatives.len() {
                    return Err(ParameterValidationError::UnknownDefault(default.to_string()));
                }
                Ok(())
            }
            Self::Point { default } => {
                finite(default.x, "x")?;
                finite(default.y, "y")
            }
            Self::Table { columns, rows } => {
                if columns.is_empty() {
                    return Err(ParameterValidationError::EmptyTable);
                }
                for (row, cells) in rows.iter().enumerate() {
                    check_row(columns, cells)
                        .map_err(|reason| ParameterValidationError::BadRow { row, reason })?;
                }
                Ok(())
            }
            Self::Toggle { .. }
            | Self::Text { .. }
            | Self::Font { .. }
            | Self::Image { .. }
            | Self::Script { .. }
            | Self::Custom { .. } => Ok(()),
        }
    }

    /// The value used when no source overrides this parameter.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Numeric { default, .. }
            | Self::Infinite { default, .. }
            | Self::Angle { default } => Value::Number(*default),
            Self::Toggle { default } => Value::Bool(*default),
            Self::Color { default } => Value::Color(*default),
            Self::Text { default, .. } | Self::Font { default } => Value::Text(default.clone()),
            Self::Choice {
                alternatives,
                default,
                ..
            } => alternatives
                .get(*default)
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::List(Vec::new())),
            Self::Image { default } => Value::Image(default.clone()),
            Self::Point { default } => Value::Point(*default),
            Self::Table { rows, .. } => {
                Value::List(rows.iter().map(|r| Value::List(r.clone())).collect())
            }
            Self::Script { default } => Value::Script(default.clone()),
            Self::Custom { default } => default.clone(),
        }
    }

    /// Parses override text with this variant's grammar.
    pub fn parse_text(&self, name: &str, text: &str) -> ParseResult<Value> {
        let number = |text: &str| -> ParseResult<f64> {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| ParameterParseError::NotANumber {
                    name: name.to_string(),
                    text: text.to_string(),
                })
        };

        match self {
            Self::Numeric { lower, upper, .. } => {
                let value = number(text)?;
                if value < *lower || value > *upper {
                    return Err(ParameterParseError::OutOfRange {
                        name: name.to_string(),
                        value,
                        lower: *lower,
                        upper: *upper,
                    });
                }
                Ok(Value::Number(value))
            }
            Self::Infinite { .. } => Ok(Value::Number(number(text)?)),
            Self::Angle { .. } => Ok(Value::Number(wrap_angle(number(text)?))),
            Self::Toggle { .. } => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ParameterParseError::NotABool {
                    name: name.to_string(),
                    text: text.to_string(),
                }),
            },
            Self::Color { .. } => Rgba::from_argb_hex(text)
                .map(Value::Color)
                .map_err(|source| ParameterParseError::Color {
                    name: name.to_string(),
                    source,
                }),
            Self::Text { .. } | Self::Font { .. } => Ok(Value::Text(text.to_string())),
            Self::Choice { alternatives, .. } => alternatives
                .iter()
                .find(|(label, _)| label == text)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| ParameterParseError::UnknownChoice {
                    name: name.to_string(),
                    text: text.to_string(),
                    choices: alternatives
                        .iter()
                        .map(|(label, _)| label.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            Self::Image { .. } => {
                if text.is_empty() {
                    Ok(Value::Image(ImageSource::Empty))
                } else {
                    Ok(Value::Image(ImageSource::File(PathBuf::from(text))))
                }
            }
            Self::Point { .. } => {
                let not_a_point = || ParameterParseError::NotAPoint {
                    name: name.to_string(),
                    text: text.to_string(),
                };
                let coordinate = |part: &str| {
                    part.trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .ok_or_else(not_a_point)
                };
                let (x, y) = text.split_once(',').ok_or_else(not_a_point)?;
                Ok(Value::Point(Point::new(coordinate(x)?, coordinate(y)?)))
            }
            Self::Table { columns, .. } => parse_table(name, columns, text),
            Self::Script { .. } => Ok(Value::Script(PathBuf::from(text))),
            Self::Custom { .. } => {
                let json: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| ParameterParseError::Invalid {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Value::from_json(&json).ok_or_else(|| ParameterParseError::Invalid {
                    name: name.to_string(),
                    reason: "objects and null are not supported".to_string(),
                })
            }
        }
    }

    /// Text that [`ParameterKind::parse_text`] reads back as `value`.
    pub fn format_text(&self, value: &Value) -> String {
        match (self, value) {
            (Self::Choice { alternatives, .. }, value) => alternatives
                .iter()
                .find(|(_, v)| v == value)
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| value.to_string()),
            (Self::Table { .. } | Self::Custom { .. }, value) => value.to_json().to_string(),
            (_, value) => value.to_string(),
        }
    }

    /// Summary of the declared constraints.
    pub fn describe(&self) -> Constraints {
        let mut constraints = Constraints {
            kind: self.type_name(),
            range: None,
            step: None,
            options: Vec::new(),
        };
        match self {
            Self::Numeric {
                lower, upper, step, ..
            } => {
                constraints.range = Some((*lower, *upper));
                constraints.step = Some(*step);
            }
            Self::Angle { .. } => constraints.range = Some((0.0, TAU)),
            Self::Infinite { rate, .. } => constraints.step = Some(*rate),
            Self::Choice { alternatives, .. } => {
                constraints.options = alternatives.iter().map(|(l, _)| l.clone()).collect();
            }
            Self::Table { columns, .. } => {
                constraints.options = columns.iter().map(|c| c.to_string()).collect();
            }
            _ => {}
        }
        constraints
    }
}

fn check_row(columns: &[ColumnType], cells: &[Value]) -> Result<(), String> {
    if cells.len() != columns.len() {
        return Err(format!(
            "expected {} cells, got {}",
            columns.len(),
            cells.len()
        ));
    }
    for (col, (ty, cell)) in columns.iter().zip(cells).enumerate() {
        if !ty.accepts(cell) {
            return Err(format!("column {} expects {}, got {}", col, ty, cell));
        }
    }
    Ok(())
}

fn parse_table(name: &str, columns: &[ColumnType], text: &str) -> ParseResult<Value> {
    let invalid = |reason: String| ParameterParseError::Invalid {
        name: name.to_string(),
        reason,
    };
    let json: serde_json::Value = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
    let rows = json
        .as_array()
        .ok_or_else(|| invalid("expected a JSON array of rows".to_string()))?;

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or_else(|| invalid(format!("row {} is not an array", i)))?;
        if cells.len() != columns.len() {
            return Err(invalid(format!(
                "row {}: expected {} cells, got {}",
                i,
                columns.len(),
                cells.len()
            )));
        }
        let values = columns
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(col, (ty, cell))| {
                ty.from_json(cell)
                    .ok_or_else(|| invalid(format!("row {} column {}: expected {}", i, col, ty)))
            })
            .collect::<ParseResult<Vec<_>>>()?;
        out.push(Value::List(values));
    }
    Ok(Value::List(out))
}

/// Declared constraints of a parameter, used for tooltips and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub kind: &'static str,
    pub range: Option<(f64, f64)>,
    pub step: Option<f64>,
    pub options: Vec<String>,
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some((lower, upper)) = self.range {
            write!(f, " in [{}, {}]", lower, upper)?;
        }
        if let Some(step) = self.step {
            write!(f, " step {}", step)?;
        }
        if !self.options.is_empty() {
            write!(f, " of {}", self.options.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(-1e-18), 0.0);
        assert!((wrap_angle(-std::f64::consts::FRAC_PI_2) - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!(wrap_angle(TAU) < TAU);
    }

    #[test]
    fn test_describe_numeric() {
        let kind = ParameterKind::numeric(0.0, 10.0, 0.5, 1.0).unwrap();
        assert_eq!(kind.describe().to_string(), "numeric in [0, 10] step 0.5");
    }

    #[test]
    fn test_table_text_grammar() {
        let kind =
            ParameterKind::table(vec![ColumnType::String, ColumnType::Point], Vec::new()).unwrap();
        let value = kind
            .parse_text("t", r#"[["a", [1, 2]], ["b", [3, 4]]]"#)
            .unwrap();
        match value {
            Value::List(rows) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(kind.parse_text("t", r#"[["a"]]"#).is_err());
        assert!(kind.parse_text("t", "not json").is_err());
    }

    #[test]
    fn test_format_text_reads_back() {
        let table = ParameterKind::table(
            vec![ColumnType::String, ColumnType::Point, ColumnType::Color],
            vec![vec![
                Value::Text("a".into()),
                Value::Point(Point::new(1.0, 2.5)),
                Value::Color(Rgba::rgb(1.0, 0.0, 0.0)),
            ]],
        )
        .unwrap();
        let text = table.format_text(&table.default_value());
        assert_eq!(table.parse_text("t", &text).unwrap(), table.default_value());

        let choice = ParameterKind::choice_map(
            vec![("small".into(), Value::Number(1.0)), ("large".into(), Value::Number(9.0))],
            "large",
            false,
        )
        .unwrap();
        assert_eq!(choice.format_text(&Value::Number(9.0)), "large");

        let point = ParameterKind::point(Point::new(-3.0, 4.0)).unwrap();
        assert_eq!(point.format_text(&point.default_value()), "-3,4");
    }

    #[test]
    fn test_point_text_must_be_finite() {
        let point = ParameterKind::point(Point::ORIGIN).unwrap();
        assert_eq!(
            point.parse_text("p", " 1.5, -2 ").unwrap(),
            Value::Point(Point::new(1.5, -2.0))
        );
        for text in ["inf,0", "1,NaN", "-infinity, 3", "1;2", "1,"] {
            assert!(
                matches!(
                    point.parse_text("p", text),
                    Err(ParameterParseError::NotAPoint { .. })
                ),
                "{text}"
            );
        }
    }
}
