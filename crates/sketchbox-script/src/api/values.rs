//! Conversions between parameter values and script values.

use rhai::{Array, Dynamic};

use sketchbox_core::{Point, Rgba};
use sketchbox_params::{ImageSource, Value};

use crate::draw::ImageCache;

/// Script form of a resolved parameter value. Image parameters become
/// decoded patterns, or `()` when nothing usable is selected.
pub(crate) fn value_to_dynamic(value: &Value, images: &ImageCache) -> Dynamic {
    match value {
        Value::Number(n) => Dynamic::from_float(*n),
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Text(s) => Dynamic::from(s.clone()),
        Value::Color(c) => Dynamic::from(*c),
        Value::Point(p) => Dynamic::from(*p),
        Value::Image(ImageSource::Empty) => Dynamic::UNIT,
        Value::Image(ImageSource::File(path)) => images
            .get(path)
            .map(Dynamic::from)
            .unwrap_or(Dynamic::UNIT),
        Value::Script(path) => Dynamic::from(path.display().to_string()),
        Value::List(items) => Dynamic::from_array(
            items
                .iter()
                .map(|item| value_to_dynamic(item, images))
                .collect(),
        ),
    }
}

/// Parameter value for a script literal, as used by `Choice`, `Table`
/// and `Custom` defaults.
pub(crate) fn dynamic_to_value(value: &Dynamic) -> Result<Value, String> {
    if let Ok(n) = value.as_float() {
        return Ok(Value::Number(n));
    }
    if let Ok(n) = value.as_int() {
        return Ok(Value::Number(n as f64));
    }
    if let Ok(b) = value.as_bool() {
        return Ok(Value::Bool(b));
    }
    if value.is_string() {
        return value
            .clone()
            .into_string()
            .map(Value::Text)
            .map_err(|e| e.to_string());
    }
    if let Some(color) = value.clone().try_cast::<Rgba>() {
        return Ok(Value::Color(color));
    }
    if let Some(point) = value.clone().try_cast::<Point>() {
        return Ok(Value::Point(point));
    }
    if let Some(items) = value.clone().try_cast::<Array>() {
        return items
            .iter()
            .map(dynamic_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List);
    }
    Err(format!("unsupported value of type {}", value.type_name()))
}
