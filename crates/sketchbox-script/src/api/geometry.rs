//! Point, Rect, Guides and color bindings.

use rhai::{Array, Dynamic, Engine};

use sketchbox_core::{Guides, Point, Rect, Rgba};

use super::{index, number, script_error, Fallible};

fn fractions(values: &Array) -> Fallible<Vec<f64>> {
    values.iter().map(number).collect()
}

fn rects(items: Vec<Rect>) -> Array {
    items.into_iter().map(Dynamic::from).collect()
}

macro_rules! scalar_ops {
    ($engine:expr, $($op:tt => $name:literal),*) => {$(
        $engine
            .register_fn($name, |a: Point, b: Point| a $op b)
            .register_fn($name, |a: Point, b: f64| a $op b)
            .register_fn($name, |a: Point, b: i64| a $op b as f64)
            .register_fn($name, |a: f64, b: Point| a $op b)
            .register_fn($name, |a: i64, b: Point| a as f64 $op b);
    )*};
}

macro_rules! anchors {
    ($engine:expr, $($name:ident),*) => {$(
        $engine.register_fn(stringify!($name), |r: &mut Rect| r.$name());
    )*};
}

macro_rules! splits {
    ($engine:expr, $($name:ident),*) => {$(
        $engine.register_fn(stringify!($name), |r: &mut Rect, pos: Dynamic| -> Fallible<Rect> {
            Ok(r.$name(number(&pos)?))
        });
    )*};
}

pub(super) fn register(engine: &mut Engine) {
    register_point(engine);
    register_rect(engine);
    register_guides(engine);
    register_color(engine);
}

fn register_point(engine: &mut Engine) {
    engine
        .register_type_with_name::<Point>("Point")
        .register_fn("Point", |x: Dynamic, y: Dynamic| -> Fallible<Point> {
            Ok(Point::new(number(&x)?, number(&y)?))
        })
        .register_fn("from_polar", |r: Dynamic, theta: Dynamic| -> Fallible<Point> {
            Ok(Point::from_polar(number(&r)?, number(&theta)?))
        })
        .register_get("x", |p: &mut Point| p.x)
        .register_get("y", |p: &mut Point| p.y)
        .register_fn("magnitude", |p: &mut Point| p.magnitude())
        .register_fn("distance", |p: &mut Point, other: Point| p.distance_to(&other))
        .register_fn("angle", |p: &mut Point| p.angle())
        .register_fn("-", |p: Point| -p)
        .register_fn("==", |a: Point, b: Point| a == b)
        .register_fn("!=", |a: Point, b: Point| a != b)
        .register_fn("to_string", |p: &mut Point| p.to_string())
        .register_fn("to_debug", |p: &mut Point| p.to_string());

    scalar_ops!(engine, + => "+", - => "-", * => "*", / => "/");
}

fn register_rect(engine: &mut Engine) {
    engine
        .register_type_with_name::<Rect>("Rect")
        .register_fn(
            "Rect",
            |center: Point, width: Dynamic, height: Dynamic| -> Fallible<Rect> {
                Ok(Rect::new(center, number(&width)?, number(&height)?))
            },
        )
        .register_fn(
            "Rect",
            |x: Dynamic, y: Dynamic, width: Dynamic, height: Dynamic| -> Fallible<Rect> {
                Ok(Rect::from_top_left(
                    Point::new(number(&x)?, number(&y)?),
                    number(&width)?,
                    number(&height)?,
                ))
            },
        )
        .register_fn(
            "from_top_left",
            |top_left: Point, width: Dynamic, height: Dynamic| -> Fallible<Rect> {
                Ok(Rect::from_top_left(top_left, number(&width)?, number(&height)?))
            },
        )
        .register_fn("from_corners", |a: Point, b: Point| Rect::from_corners(a, b))
        .register_get("center", |r: &mut Rect| r.center)
        .register_get("width", |r: &mut Rect| r.width)
        .register_get("height", |r: &mut Rect| r.height)
        .register_fn("radius", |r: &mut Rect| r.radius())
        .register_fn("local", |r: &mut Rect| r.local())
        .register_fn("contains", |r: &mut Rect, p: Point| r.contains(p))
        .register_fn("inset", |r: &mut Rect, size: Dynamic| -> Fallible<Rect> {
            Ok(r.inset(number(&size)?))
        })
        .register_fn("split_vertical", |r: &mut Rect, pos: Dynamic| -> Fallible<Array> {
            let (left, right) = r.split_vertical(number(&pos)?);
            Ok(rects(vec![left, right]))
        })
        .register_fn("split_horizontal", |r: &mut Rect, pos: Dynamic| -> Fallible<Array> {
            let (top, bottom) = r.split_horizontal(number(&pos)?);
            Ok(rects(vec![top, bottom]))
        })
        .register_fn(
            "guides",
            |r: &mut Rect, vertical: Array, horizontal: Array| -> Fallible<Guides> {
                Ok(r.guides(&fractions(&vertical)?, &fractions(&horizontal)?))
            },
        )
        .register_fn("grid", |r: &mut Rect, cols: i64, rows: i64| -> Fallible<Guides> {
            Ok(r.grid(index(cols)?, index(rows)?))
        })
        .register_fn("==", |a: Rect, b: Rect| a == b)
        .register_fn("!=", |a: Rect, b: Rect| a != b)
        .register_fn("to_string", |r: &mut Rect| r.to_string())
        .register_fn("to_debug", |r: &mut Rect| r.to_string());

    anchors!(engine, north, south, east, west, northwest, northeast, southeast, southwest);
    splits!(engine, split_left, split_right, split_top, split_bottom);
}

fn register_guides(engine: &mut Engine) {
    engine
        .register_type_with_name::<Guides>("Guides")
        .register_get("bounds", |g: &mut Guides| g.bounds())
        .register_fn("columns", |g: &mut Guides| g.columns() as i64)
        .register_fn("rows", |g: &mut Guides| g.rows() as i64)
        .register_fn("intersection", |g: &mut Guides, col: i64, row: i64| -> Fallible<Point> {
            g.intersection(index(col)?, index(row)?)
                .ok_or_else(|| script_error(format!("no guide intersection ({}, {})", col, row)))
        })
        .register_fn("cell", |g: &mut Guides, col: i64, row: i64| -> Fallible<Rect> {
            g.cell(index(col)?, index(row)?)
                .ok_or_else(|| script_error(format!("no guide cell ({}, {})", col, row)))
        })
        .register_fn("row", |g: &mut Guides, i: i64| -> Fallible<Rect> {
            g.row(index(i)?)
                .ok_or_else(|| script_error(format!("no guide row {}", i)))
        })
        .register_fn("column", |g: &mut Guides, i: i64| -> Fallible<Rect> {
            g.column(index(i)?)
                .ok_or_else(|| script_error(format!("no guide column {}", i)))
        })
        .register_fn("cells", |g: &mut Guides| rects(g.cells(false)))
        .register_fn("cells", |g: &mut Guides, column_first: bool| rects(g.cells(column_first)))
        .register_fn("to_debug", |g: &mut Guides| format!("{:?}", g));
}

fn register_color(engine: &mut Engine) {
    engine
        .register_type_with_name::<Rgba>("Rgba")
        .register_fn("rgb", |r: Dynamic, g: Dynamic, b: Dynamic| -> Fallible<Rgba> {
            Ok(Rgba::rgb(number(&r)?, number(&g)?, number(&b)?))
        })
        .register_fn(
            "rgba",
            |r: Dynamic, g: Dynamic, b: Dynamic, a: Dynamic| -> Fallible<Rgba> {
                Ok(Rgba::new(number(&r)?, number(&g)?, number(&b)?, number(&a)?))
            },
        )
        .register_fn("argb", |hex: &str| -> Fallible<Rgba> {
            Rgba::from_argb_hex(hex).map_err(script_error)
        })
        .register_get("r", |c: &mut Rgba| c.r)
        .register_get("g", |c: &mut Rgba| c.g)
        .register_get("b", |c: &mut Rgba| c.b)
        .register_get("a", |c: &mut Rgba| c.a)
        .register_fn("==", |a: Rgba, b: Rgba| a == b)
        .register_fn("!=", |a: Rgba, b: Rgba| a != b)
        .register_fn("to_string", |c: &mut Rgba| c.to_string())
        .register_fn("to_debug", |c: &mut Rgba| c.to_string());
}
