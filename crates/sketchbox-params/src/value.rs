//! Resolved parameter values.

use serde::{Deserialize, Serialize};
use sketchbox_core::{Point, Rgba};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ParameterValidationError;

/// Where an image parameter gets its pixels from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// No image selected; draws as a transparent pattern.
    #[default]
    Empty,
    File(PathBuf),
}

/// The current value of a parameter as handed to the render phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Color(Rgba),
    Point(Point),
    Image(ImageSource),
    Script(PathBuf),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Color(_) => "color",
            Self::Point(_) => "point",
            Self::Image(_) => "image",
            Self::Script(_) => "script",
            Self::List(_) => "list",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value. Objects and `null` have no counterpart.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }

    /// JSON form accepted back by [`Value::from_json`] and the table and
    /// custom text grammars. Points become `[x, y]`, colors `AARRGGBB`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Color(c) => serde_json::Value::String(c.to_argb_hex()),
            Self::Point(p) => serde_json::json!([p.x, p.y]),
            Self::Image(ImageSource::Empty) => serde_json::Value::String(String::new()),
            Self::Image(ImageSource::File(path)) | Self::Script(path) => {
                serde_json::Value::String(path.display().to_string())
            }
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

/// Labels used for choice alternatives and in the parameter panel.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{}", s),
            Self::Color(c) => write!(f, "{}", c.to_argb_hex()),
            Self::Point(p) => write!(f, "{},{}", p.x, p.y),
            Self::Image(ImageSource::Empty) => write!(f, ""),
            Self::Image(ImageSource::File(path)) | Self::Script(path) => {
                write!(f, "{}", path.display())
            }
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Cell type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Float,
    Bool,
    Point,
    Color,
}

impl ColumnType {
    /// Whether `value` may be stored in a column of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::Text(_)) => true,
            (Self::Int, Value::Number(n)) => n.is_finite() && n.fract() == 0.0,
            (Self::Float, Value::Number(n)) => n.is_finite(),
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Point, Value::Point(_)) => true,
            (Self::Color, Value::Color(_)) => true,
            _ => false,
        }
    }

    /// Coerces a JSON cell into this column's value type.
    pub fn from_json(&self, json: &serde_json::Value) -> Option<Value> {
        let value = match (self, json) {
            (Self::Point, serde_json::Value::Array(xy)) if xy.len() == 2 => {
                Value::Point(Point::new(xy[0].as_f64()?, xy[1].as_f64()?))
            }
            (Self::Color, serde_json::Value::String(hex)) => {
                Value::Color(Rgba::from_argb_hex(hex).ok()?)
            }
            _ => Value::from_json(json)?,
        };
        self.accepts(&value).then_some(value)
    }

    /// Default cell for a freshly added row.
    pub fn blank(&self) -> Value {
        match self {
            Self::String => Value::Text(String::new()),
            Self::Int | Self::Float => Value::Number(0.0),
            Self::Bool => Value::Bool(false),
            Self::Point => Value::Point(Point::ORIGIN),
            Self::Color => Value::Color(Rgba::BLACK),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Point => "point",
            Self::Color => "color",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ColumnType {
    type Err = ParameterValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" | "text" => Ok(Self::String),
            "int" | "integer" => Ok(Self::Int),
            "float" | "number" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "point" => Ok(Self::Point),
            "color" => Ok(Self::Color),
            _ => Err(ParameterValidationError::UnknownColumnType(s.to_string())),
        }
    }
}
