//! Render-phase bindings: the `cr` context, `helpers`, paint sources and
//! the scoped `save`/`box` functions.

use rhai::{Array, Dynamic, Engine, FnPtr, NativeCallContext};
use std::cell::RefCell;
use std::rc::Rc;

use sketchbox_core::{Guides, Point, Rect, Rgba};

use super::{finite, number, script_error, Fallible};
use crate::draw::{style, DrawingContext, FontSpec, Gradient, ImagePattern};

/// The drawing context of the frame being rendered.
///
/// `save` and `box` take a closure, and a closure cannot be a method on a
/// captured object without locking it for the whole call, so they are free
/// functions that find the context here.
#[derive(Clone, Default)]
pub(crate) struct ContextSlot(Rc<RefCell<Option<DrawingContext>>>);

impl ContextSlot {
    pub(crate) fn set(&self, ctx: DrawingContext) {
        *self.0.borrow_mut() = Some(ctx);
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().take();
    }

    pub(crate) fn current(&self) -> Fallible<DrawingContext> {
        self.0
            .borrow()
            .clone()
            .ok_or_else(|| script_error("no drawing context outside the render phase"))
    }
}

/// Shape and text helpers bound as `helpers` in the render phase.
#[derive(Clone)]
pub struct Helpers(DrawingContext);

impl Helpers {
    pub fn new(ctx: DrawingContext) -> Self {
        Self(ctx)
    }
}

fn points(items: &Array) -> Fallible<Vec<Point>> {
    items
        .iter()
        .map(|item| {
            item.clone().try_cast::<Point>().ok_or_else(|| {
                script_error(format!("expected a Point, got {}", item.type_name()))
            })
        })
        .collect()
}

fn lookup<T>(kind: &str, name: &str, parse: fn(&str) -> Option<T>) -> Fallible<T> {
    parse(name).ok_or_else(|| script_error(format!("unknown {} '{}'", kind, name)))
}

/// Context methods that forward numeric arguments to cairo once they are
/// known to be finite.
macro_rules! path_fns {
    ($engine:expr, $($name:ident($($arg:ident),+)),* $(,)?) => {$(
        $engine.register_fn(
            stringify!($name),
            |ctx: &mut DrawingContext, $($arg: Dynamic),+| -> Fallible<()> {
                ctx.cr().$name($(finite(&$arg)?),+);
                Ok(())
            },
        );
    )*};
}

macro_rules! unit_fns {
    ($engine:expr, $($name:ident),* $(,)?) => {$(
        $engine.register_fn(stringify!($name), |ctx: &mut DrawingContext| ctx.cr().$name());
    )*};
}

/// Context methods whose cairo call reports an error status.
macro_rules! paint_fns {
    ($engine:expr, $($name:ident),* $(,)?) => {$(
        $engine.register_fn(stringify!($name), |ctx: &mut DrawingContext| -> Fallible<()> {
            ctx.cr().$name().map_err(script_error)
        });
    )*};
}

pub(super) fn register(engine: &mut Engine, slot: ContextSlot) {
    register_context(engine);
    register_helpers(engine);
    register_sources(engine);
    register_scopes(engine, slot);
}

fn register_context(engine: &mut Engine) {
    engine
        .register_type_with_name::<DrawingContext>("Context")
        .register_fn("save", |ctx: &mut DrawingContext| -> Fallible<()> {
            ctx.push().map_err(script_error)
        })
        .register_fn("restore", |ctx: &mut DrawingContext| -> Fallible<()> {
            ctx.pop().map_err(script_error)
        })
        .register_fn("scale", |ctx: &mut DrawingContext, x: Dynamic, y: Dynamic| -> Fallible<()> {
            ctx.scale(number(&x)?, number(&y)?).map_err(script_error)
        })
        .register_fn("scale", |ctx: &mut DrawingContext, s: Dynamic| -> Fallible<()> {
            let s = number(&s)?;
            ctx.scale(s, s).map_err(script_error)
        })
        .register_fn("paint_with_alpha", |ctx: &mut DrawingContext, alpha: Dynamic| -> Fallible<()> {
            ctx.cr().paint_with_alpha(number(&alpha)?).map_err(script_error)
        })
        .register_fn("show_text", |ctx: &mut DrawingContext, text: &str| -> Fallible<()> {
            ctx.cr().show_text(text).map_err(script_error)
        })
        .register_fn("text_width", |ctx: &mut DrawingContext, text: &str| -> Fallible<f64> {
            let extents = ctx.cr().text_extents(text).map_err(script_error)?;
            Ok(extents.x_advance())
        })
        .register_fn("has_current_point", |ctx: &mut DrawingContext| {
            ctx.current_point().is_some()
        })
        .register_fn("set_source", |ctx: &mut DrawingContext, color: Rgba| ctx.set_color(color))
        .register_fn("set_source", |ctx: &mut DrawingContext, g: Gradient| -> Fallible<()> {
            g.set_as_source(ctx.cr()).map_err(script_error)
        })
        .register_fn("set_source", |ctx: &mut DrawingContext, img: ImagePattern| -> Fallible<()> {
            img.set_as_source(ctx.cr(), Point::ORIGIN).map_err(script_error)
        })
        .register_fn(
            "set_source",
            |ctx: &mut DrawingContext, img: ImagePattern, origin: Point| -> Fallible<()> {
                img.set_as_source(ctx.cr(), origin).map_err(script_error)
            },
        )
        .register_fn("set_line_cap", |ctx: &mut DrawingContext, name: &str| -> Fallible<()> {
            ctx.cr().set_line_cap(lookup("line cap", name, style::line_cap)?);
            Ok(())
        })
        .register_fn("set_line_join", |ctx: &mut DrawingContext, name: &str| -> Fallible<()> {
            ctx.cr().set_line_join(lookup("line join", name, style::line_join)?);
            Ok(())
        })
        .register_fn("set_operator", |ctx: &mut DrawingContext, name: &str| -> Fallible<()> {
            ctx.cr().set_operator(lookup("operator", name, style::operator)?);
            Ok(())
        })
        .register_fn("set_antialias", |ctx: &mut DrawingContext, name: &str| -> Fallible<()> {
            ctx.cr().set_antialias(lookup("antialias", name, style::antialias)?);
            Ok(())
        })
        .register_fn(
            "set_dash",
            |ctx: &mut DrawingContext, dashes: Array, offset: Dynamic| -> Fallible<()> {
                let dashes = dashes.iter().map(finite).collect::<Fallible<Vec<_>>>()?;
                // cairo latches an invalid dash as a context error
                if dashes.iter().any(|d| *d < 0.0)
                    || (!dashes.is_empty() && dashes.iter().all(|d| *d == 0.0))
                {
                    return Err(script_error("dash lengths must be non-negative and not all zero"));
                }
                ctx.cr().set_dash(&dashes, finite(&offset)?);
                Ok(())
            },
        )
        .register_fn(
            "select_font_face",
            |ctx: &mut DrawingContext, family: &str, slant: &str, weight: &str| -> Fallible<()> {
                ctx.cr().select_font_face(
                    family,
                    lookup("font slant", slant, style::font_slant)?,
                    lookup("font weight", weight, style::font_weight)?,
                );
                Ok(())
            },
        );

    path_fns!(
        engine,
        translate(x, y),
        rotate(angle),
        move_to(x, y),
        line_to(x, y),
        rel_move_to(dx, dy),
        rel_line_to(dx, dy),
        curve_to(x1, y1, x2, y2, x3, y3),
        arc(xc, yc, radius, angle1, angle2),
        arc_negative(xc, yc, radius, angle1, angle2),
        rectangle(x, y, width, height),
        set_source_rgb(r, g, b),
        set_source_rgba(r, g, b, a),
        set_line_width(width),
        set_miter_limit(limit),
        set_font_size(size),
    );
    unit_fns!(engine, identity_matrix, close_path, new_path, new_sub_path, clip, clip_preserve, reset_clip);
    paint_fns!(engine, stroke, stroke_preserve, fill, fill_preserve, paint);
}

fn register_helpers(engine: &mut Engine) {
    engine
        .register_type_with_name::<Helpers>("Helpers")
        .register_fn("circle", |h: &mut Helpers, center: Point, radius: Dynamic| -> Fallible<()> {
            h.0.circle(center, finite(&radius)?);
            Ok(())
        })
        .register_fn(
            "ellipse",
            |h: &mut Helpers, center: Point, width: Dynamic, height: Dynamic| -> Fallible<()> {
                h.0.ellipse(center, finite(&width)?, finite(&height)?);
                Ok(())
            },
        )
        .register_fn(
            "center_rect",
            |h: &mut Helpers, center: Point, width: Dynamic, height: Dynamic| -> Fallible<()> {
                h.0.center_rect(center, finite(&width)?, finite(&height)?);
                Ok(())
            },
        )
        .register_fn("rect", |h: &mut Helpers, rect: Rect| h.0.rect(rect))
        .register_fn("move_to", |h: &mut Helpers, p: Point| h.0.move_to(p))
        .register_fn("line_to", |h: &mut Helpers, p: Point| h.0.line_to(p))
        .register_fn("curve_to", |h: &mut Helpers, a: Point, b: Point, c: Point| {
            h.0.curve_to(a, b, c)
        })
        .register_fn("polygon", |h: &mut Helpers, items: Array| -> Fallible<()> {
            h.0.polygon(&points(&items)?, true);
            Ok(())
        })
        .register_fn("polygon", |h: &mut Helpers, items: Array, close: bool| -> Fallible<()> {
            h.0.polygon(&points(&items)?, close);
            Ok(())
        })
        .register_fn("hline", |h: &mut Helpers, y: Dynamic, bounds: Rect| -> Fallible<()> {
            h.0.hline(number(&y)?, bounds);
            Ok(())
        })
        .register_fn("vline", |h: &mut Helpers, x: Dynamic, bounds: Rect| -> Fallible<()> {
            h.0.vline(number(&x)?, bounds);
            Ok(())
        })
        .register_fn("crosshair", |h: &mut Helpers, center: Point| {
            h.0.crosshair(center, crate::engine::DEFAULT_CROSSHAIR_SIZE)
        })
        .register_fn("crosshair", |h: &mut Helpers, center: Point, size: Dynamic| -> Fallible<()> {
            h.0.crosshair(center, number(&size)?);
            Ok(())
        })
        .register_fn("current_point", |h: &mut Helpers| {
            h.0.current_point().map(Dynamic::from).unwrap_or(Dynamic::UNIT)
        })
        .register_fn("center_text", |h: &mut Helpers, text: &str| -> Fallible<()> {
            h.0.center_text(text, None).map_err(script_error)
        })
        .register_fn("center_text", |h: &mut Helpers, text: &str, font: &str| -> Fallible<()> {
            h.0.center_text(text, Some(&FontSpec::parse(font)))
                .map_err(script_error)
        })
        .register_fn("show_text", |h: &mut Helpers, text: &str| -> Fallible<()> {
            h.0.show_text(text, None).map_err(script_error)
        })
        .register_fn("show_text", |h: &mut Helpers, text: &str, font: &str| -> Fallible<()> {
            h.0.show_text(text, Some(&FontSpec::parse(font)))
                .map_err(script_error)
        })
        .register_fn("debug_stroke", |h: &mut Helpers| -> Fallible<()> {
            h.0.debug_stroke().map_err(script_error)
        })
        .register_fn("debug_fill", |h: &mut Helpers| -> Fallible<()> {
            h.0.debug_fill().map_err(script_error)
        })
        .register_fn("debug_guides", |h: &mut Helpers, guides: Guides| -> Fallible<()> {
            h.0.debug_guides(&guides).map_err(script_error)
        });
}

fn register_sources(engine: &mut Engine) {
    engine
        .register_type_with_name::<Gradient>("Gradient")
        .register_fn(
            "LinearGradient",
            |x0: Dynamic, y0: Dynamic, x1: Dynamic, y1: Dynamic| -> Fallible<Gradient> {
                Ok(Gradient::linear(
                    Point::new(number(&x0)?, number(&y0)?),
                    Point::new(number(&x1)?, number(&y1)?),
                ))
            },
        )
        .register_fn("LinearGradient", |from: Point, to: Point| Gradient::linear(from, to))
        .register_fn("add_stop", |g: &mut Gradient, offset: Dynamic, color: Rgba| -> Fallible<()> {
            g.add_stop(number(&offset)?, color);
            Ok(())
        })
        .register_type_with_name::<ImagePattern>("ImagePattern")
        .register_get("width", |img: &mut ImagePattern| img.width() as i64)
        .register_get("height", |img: &mut ImagePattern| img.height() as i64)
        .register_fn("to_string", |img: &mut ImagePattern| {
            format!("ImagePattern({})", img.path().display())
        });
}

fn register_scopes(engine: &mut Engine, slot: ContextSlot) {
    let save_slot = slot.clone();
    engine.register_fn(
        "save",
        move |call: NativeCallContext, body: FnPtr| -> Fallible<Dynamic> {
            let ctx = save_slot.current()?;
            let _guard = ctx.save().map_err(script_error)?;
            body.call_within_context(&call, ())
        },
    );

    let box_slot = slot.clone();
    engine.register_fn(
        "box",
        move |call: NativeCallContext, rect: Rect, body: FnPtr| -> Fallible<Dynamic> {
            let ctx = box_slot.current()?;
            let (_guard, local) = ctx.box_scope(rect, true).map_err(script_error)?;
            body.call_within_context(&call, (local,))
        },
    );

    engine.register_fn(
        "box",
        move |call: NativeCallContext, rect: Rect, clip: bool, body: FnPtr| -> Fallible<Dynamic> {
            let ctx = slot.current()?;
            let (_guard, local) = ctx.box_scope(rect, clip).map_err(script_error)?;
            body.call_within_context(&call, (local,))
        },
    );
}
