//! Parameter constructors and the init-phase registry.

use rhai::{Array, Dynamic, Engine, Map};
use std::cell::RefCell;
use std::rc::Rc;

use sketchbox_core::{Point, Rgba};
use sketchbox_params::{
    ColumnType, ImageSource, ParameterGroup, ParameterKind, Value, DEFAULT_FONT,
    DEFAULT_INFINITE_RATE, DEFAULT_NUMERIC_STEP, DEFAULT_NUMERIC_VALUE,
};

use super::{dynamic_to_value, number, script_error, Fallible};

/// The `params` object of the init phase.
///
/// Clones share one group, so definitions made before a script error are
/// still visible to the host afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    group: Rc<RefCell<ParameterGroup>>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ParameterGroup {
        self.group.borrow().clone()
    }

    pub(crate) fn take(&self) -> ParameterGroup {
        std::mem::take(&mut *self.group.borrow_mut())
    }
}

fn value(d: &Dynamic) -> Fallible<Value> {
    dynamic_to_value(d).map_err(script_error)
}

fn numeric(lower: f64, upper: f64, step: f64, default: f64) -> Fallible<ParameterKind> {
    ParameterKind::numeric(lower, upper, step, default).map_err(script_error)
}

/// The implicit numeric default, pulled into range when the range
/// excludes it.
fn implicit_default(lower: f64, upper: f64) -> f64 {
    if lower <= upper {
        DEFAULT_NUMERIC_VALUE.clamp(lower, upper)
    } else {
        DEFAULT_NUMERIC_VALUE
    }
}

fn color(default: Rgba) -> Fallible<ParameterKind> {
    ParameterKind::color(default).map_err(script_error)
}

fn choice_list(values: Array, default: Dynamic, with_entry: bool) -> Fallible<ParameterKind> {
    let values = values.iter().map(value).collect::<Fallible<Vec<_>>>()?;
    let default = value(&default)?;
    ParameterKind::choice_list(values, &default, with_entry).map_err(script_error)
}

/// Map alternatives are offered in key order.
fn choice_map(entries: Map, default: &str, with_entry: bool) -> Fallible<ParameterKind> {
    let entries = entries
        .iter()
        .map(|(label, v)| Ok((label.to_string(), value(v)?)))
        .collect::<Fallible<Vec<_>>>()?;
    ParameterKind::choice_map(entries, default, with_entry).map_err(script_error)
}

fn table(columns: Array, rows: Array) -> Fallible<ParameterKind> {
    let columns = columns
        .iter()
        .map(|c| {
            let name = c
                .clone()
                .into_string()
                .map_err(|_| script_error("table columns are type names"))?;
            name.parse::<ColumnType>().map_err(script_error)
        })
        .collect::<Fallible<Vec<_>>>()?;
    let rows = rows
        .iter()
        .map(|row| match value(row)? {
            Value::List(cells) => Ok(cells),
            other => Err(script_error(format!("table row must be an array, got {}", other))),
        })
        .collect::<Fallible<Vec<_>>>()?;
    ParameterKind::table(columns, rows).map_err(script_error)
}

fn image(path: &str) -> ParameterKind {
    if path.is_empty() {
        ParameterKind::image(ImageSource::Empty)
    } else {
        ParameterKind::image(ImageSource::File(path.into()))
    }
}

pub(super) fn register_constructors(engine: &mut Engine) {
    engine
        .register_type_with_name::<ParameterKind>("Parameter")
        .register_fn("to_string", |k: &mut ParameterKind| k.describe().to_string())
        .register_fn("to_debug", |k: &mut ParameterKind| format!("{:?}", k))
        .register_fn("Numeric", |lower: Dynamic, upper: Dynamic| -> Fallible<ParameterKind> {
            let (lower, upper) = (number(&lower)?, number(&upper)?);
            numeric(lower, upper, DEFAULT_NUMERIC_STEP, implicit_default(lower, upper))
        })
        .register_fn(
            "Numeric",
            |lower: Dynamic, upper: Dynamic, step: Dynamic| -> Fallible<ParameterKind> {
                let (lower, upper) = (number(&lower)?, number(&upper)?);
                numeric(lower, upper, number(&step)?, implicit_default(lower, upper))
            },
        )
        .register_fn(
            "Numeric",
            |lower: Dynamic, upper: Dynamic, step: Dynamic, default: Dynamic| -> Fallible<ParameterKind> {
                numeric(number(&lower)?, number(&upper)?, number(&step)?, number(&default)?)
            },
        )
        .register_fn("Infinite", |default: Dynamic| -> Fallible<ParameterKind> {
            ParameterKind::infinite(number(&default)?, DEFAULT_INFINITE_RATE).map_err(script_error)
        })
        .register_fn("Infinite", |default: Dynamic, rate: Dynamic| -> Fallible<ParameterKind> {
            ParameterKind::infinite(number(&default)?, number(&rate)?).map_err(script_error)
        })
        .register_fn("Angle", || -> Fallible<ParameterKind> {
            ParameterKind::angle(0.0).map_err(script_error)
        })
        .register_fn("Angle", |default: Dynamic| -> Fallible<ParameterKind> {
            ParameterKind::angle(number(&default)?).map_err(script_error)
        })
        .register_fn("Toggle", ParameterKind::toggle)
        .register_fn("Color", || color(Rgba::BLACK))
        .register_fn("Color", color)
        .register_fn("Color", |r: Dynamic, g: Dynamic, b: Dynamic| -> Fallible<ParameterKind> {
            color(Rgba::rgb(number(&r)?, number(&g)?, number(&b)?))
        })
        .register_fn(
            "Color",
            |r: Dynamic, g: Dynamic, b: Dynamic, a: Dynamic| -> Fallible<ParameterKind> {
                color(Rgba::new(number(&r)?, number(&g)?, number(&b)?, number(&a)?))
            },
        )
        .register_fn("Text", || ParameterKind::text("", false))
        .register_fn("Text", |default: &str| ParameterKind::text(default, false))
        .register_fn("Text", |default: &str, multiline: bool| {
            ParameterKind::text(default, multiline)
        })
        .register_fn("Choice", |values: Array, default: Dynamic| {
            choice_list(values, default, false)
        })
        .register_fn("Choice", choice_list)
        .register_fn("Choice", |entries: Map, default: &str| {
            choice_map(entries, default, false)
        })
        .register_fn("Choice", |entries: Map, default: &str, with_entry: bool| {
            choice_map(entries, default, with_entry)
        })
        .register_fn("Font", || ParameterKind::font(DEFAULT_FONT))
        .register_fn("Font", |default: &str| ParameterKind::font(default))
        .register_fn("Image", || ParameterKind::image(ImageSource::Empty))
        .register_fn("Image", image)
        .register_fn("Point", || -> Fallible<ParameterKind> {
            ParameterKind::point(Point::ORIGIN).map_err(script_error)
        })
        .register_fn("Point", |default: Point| -> Fallible<ParameterKind> {
            ParameterKind::point(default).map_err(script_error)
        })
        .register_fn("Table", |columns: Array| table(columns, Array::new()))
        .register_fn("Table", table)
        .register_fn("Script", |path: &str| ParameterKind::script(path))
        .register_fn("Custom", |default: Dynamic| -> Fallible<ParameterKind> {
            Ok(ParameterKind::custom(value(&default)?))
        });
}

pub(super) fn register_registry(engine: &mut Engine) {
    engine
        .register_type_with_name::<ParameterRegistry>("ParameterRegistry")
        .register_fn(
            "define",
            |registry: &mut ParameterRegistry, name: &str, kind: ParameterKind| -> Fallible<()> {
                registry
                    .group
                    .borrow_mut()
                    .define(name, kind)
                    .map_err(|e| script_error(format!("cannot define '{}': {}", name, e)))
            },
        )
        .register_fn(
            "set_resolution",
            |registry: &mut ParameterRegistry, width: i64, height: i64| -> Fallible<()> {
                registry
                    .group
                    .borrow_mut()
                    .set_resolution(width, height)
                    .map_err(script_error)
            },
        )
        .register_fn("len", |registry: &mut ParameterRegistry| {
            registry.group.borrow().len() as i64
        })
        .register_fn("contains", |registry: &mut ParameterRegistry, name: &str| {
            registry.group.borrow().get(name).is_some()
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Scope;

    fn run(script: &str) -> (ParameterRegistry, Result<(), Box<rhai::EvalAltResult>>) {
        let mut engine = Engine::new();
        super::super::geometry::register(&mut engine);
        register_constructors(&mut engine);
        register_registry(&mut engine);
        let registry = ParameterRegistry::new();
        let mut scope = Scope::new();
        scope.push("params", registry.clone());
        let result = engine.run_with_scope(&mut scope, script);
        (registry, result)
    }

    #[test]
    fn test_every_constructor() {
        let (registry, result) = run(r#"
            params.define("numeric", Numeric(0, 10));
            params.define("stepped", Numeric(0, 10, 0.5, 2));
            params.define("infinite", Infinite(1.5));
            params.define("angle", Angle(1));
            params.define("toggle", Toggle(true));
            params.define("color", Color(1, 0, 0));
            params.define("text", Text("hi", true));
            params.define("list", Choice([1, 2, 3], 2));
            params.define("map", Choice(#{ small: 1, large: 10 }, "large"));
            params.define("font", Font("Sans 12"));
            params.define("image", Image());
            params.define("point", Point(Point(1, 2)));
            params.define("table", Table(["string", "int"], [["a", 1]]));
            params.define("script", Script("child.rhai"));
            params.define("custom", Custom([1, "x"]));
            params.set_resolution(320, 200);
        "#);
        result.unwrap();
        let group = registry.snapshot();
        assert_eq!(group.len(), 15);
        assert_eq!(group.resolution().width, 320);

        let defaults = group.defaults();
        assert_eq!(defaults.get("numeric"), Some(&Value::Number(0.5)));
        assert_eq!(defaults.get("list"), Some(&Value::Number(2.0)));
        assert_eq!(defaults.get("map"), Some(&Value::Number(10.0)));
        assert_eq!(defaults.get("color"), Some(&Value::Color(Rgba::rgb(1.0, 0.0, 0.0))));
    }

    #[test]
    fn test_implicit_numeric_default_is_in_range() {
        let (registry, result) = run(r#"params.define("n", Numeric(10, 100));"#);
        result.unwrap();
        assert_eq!(
            registry.snapshot().defaults().get("n"),
            Some(&Value::Number(10.0))
        );
    }

    #[test]
    fn test_validation_errors_raise() {
        let (_, result) = run(r#"Numeric(0, 10, 0.5, 20)"#);
        assert!(result.is_err());
        let (_, result) = run(r#"Choice([1, 2], 3)"#);
        assert!(result.is_err());
        let (_, result) = run(r#"Table(["nope"])"#);
        assert!(result.is_err());
        let (_, result) = run(r#"params.set_resolution(0, 10)"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_define_keeps_first() {
        let (registry, result) = run(r#"
            params.define("a", Toggle(true));
            params.define("a", Toggle(false));
        "#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot define 'a'"), "{}", err);
        let group = registry.snapshot();
        assert_eq!(group.len(), 1);
        assert_eq!(group.defaults().get("a"), Some(&Value::Bool(true)));
    }
}
