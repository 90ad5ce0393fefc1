//! Rhai bindings for the two script phases.
//!
//! Both engines share the geometry, color and parameter-constructor
//! bindings. Only the init engine knows the parameter registry and only the
//! render engine knows the drawing context.

mod drawing;
mod geometry;
mod params;
mod values;

use rhai::{Dynamic, Engine, EvalAltResult};
use std::fmt;
use tracing::{debug, info};

pub use drawing::Helpers;
pub(crate) use drawing::ContextSlot;
pub use params::ParameterRegistry;
pub(crate) use values::{dynamic_to_value, value_to_dynamic};

pub(crate) type Fallible<T> = Result<T, Box<EvalAltResult>>;

/// Wraps a host error so it surfaces as a script runtime error.
pub(crate) fn script_error(err: impl fmt::Display) -> Box<EvalAltResult> {
    err.to_string().into()
}

/// Accepts both integer and float script values.
pub(crate) fn number(value: &Dynamic) -> Fallible<f64> {
    if let Ok(f) = value.as_float() {
        return Ok(f);
    }
    if let Ok(i) = value.as_int() {
        return Ok(i as f64);
    }
    Err(script_error(format!(
        "expected a number, got {}",
        value.type_name()
    )))
}

/// A number that cairo can use; NaN and infinities would leave the
/// context in a sticky error state.
pub(crate) fn finite(value: &Dynamic) -> Fallible<f64> {
    let n = number(value)?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(script_error(format!("expected a finite number, got {}", n)))
    }
}

pub(crate) fn index(value: i64) -> Fallible<usize> {
    usize::try_from(value).map_err(|_| script_error(format!("negative index {}", value)))
}

fn base_engine() -> Engine {
    let mut engine = Engine::new();
    engine.on_print(|text| info!(target: "script", "{}", text));
    engine.on_debug(|text, source, pos| {
        debug!(
            target: "script",
            source = source.unwrap_or(""),
            line = pos.line(),
            "{}",
            text
        )
    });
    geometry::register(&mut engine);
    params::register_constructors(&mut engine);
    engine
}

pub(crate) fn init_engine() -> Engine {
    let mut engine = base_engine();
    params::register_registry(&mut engine);
    engine
}

pub(crate) fn render_engine(slot: ContextSlot) -> Engine {
    let mut engine = base_engine();
    drawing::register(&mut engine, slot);
    engine
}
