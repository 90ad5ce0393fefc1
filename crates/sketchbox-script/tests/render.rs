//! Render-phase bindings, failure isolation and overlays.

use sketchbox_core::Point;
use sketchbox_params::Defaults;
use sketchbox_script::{
    Frame, InputSnapshot, RenderOptions, Script, ScriptStatus, SharedInput, Viewport,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const SIZE: i32 = 200;

fn write_script(dir: &TempDir, source: &str) -> PathBuf {
    let path = dir.path().join("sketch.rhai");
    fs::write(&path, source).unwrap();
    path
}

/// 10 px per mm, so the script window is 20 x 20 mm.
fn frame() -> Frame {
    Frame::new(Viewport::from_dpi(SIZE as f64, SIZE as f64, 254.0))
}

/// 1 px per mm, so the script window is 200 x 200 mm.
fn unit_frame() -> Frame {
    Frame::new(Viewport::from_dpi(SIZE as f64, SIZE as f64, 25.4))
}

/// Renders one frame into a fresh surface and returns its alpha channel,
/// row by row.
fn render_pixels(script: &mut Script, frame: &Frame) -> (bool, Vec<u8>) {
    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, SIZE, SIZE).unwrap();
    let ok = {
        let cr = cairo::Context::new(&surface).unwrap();
        let ok = script.run(&cr, frame, &Defaults).is_ok();
        assert_eq!(cr.user_to_device(1.0, 1.0), (1.0, 1.0));
        ok
    };
    surface.flush();
    let stride = surface.stride() as usize;
    let data = surface.data().unwrap();
    let mut alpha = Vec::with_capacity((SIZE * SIZE) as usize);
    for row in data.chunks_exact(stride) {
        for px in row[..SIZE as usize * 4].chunks_exact(4) {
            let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
            alpha.push((argb >> 24) as u8);
        }
    }
    (ok, alpha)
}

fn render_alpha(script: &mut Script, frame: &Frame) -> (bool, u64) {
    let (ok, alpha) = render_pixels(script, frame);
    (ok, alpha.iter().map(|a| *a as u64).sum())
}

fn alpha_at(pixels: &[u8], x: i32, y: i32) -> u8 {
    pixels[(y * SIZE + x) as usize]
}

/// Fills the shape a render script builds and returns the alpha channel.
fn fill_shape(shape: &str) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        &format!(
            r#"
            if PHASE == "render" {{
                cr.set_source(rgb(0, 0, 0));
                {shape};
                cr.fill();
            }}
            "#
        ),
    );
    let mut script = Script::load(&path);
    let (ok, pixels) = render_pixels(&mut script, &unit_frame());
    assert!(ok, "{:?}", script.render_error());
    pixels
}

#[test]
fn test_render_bindings() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "init" {
            params.define("radius", Numeric(0, 10, 1, 3));
            params.define("line width", Numeric(0, 1));
        } else {
            if PHASE != "render" { throw "phase"; }
            if radius != 3.0 { throw "bare binding"; }
            if params["line width"] != 0.5 { throw "params map"; }
            if type_of(cr) != "Context" { throw type_of(cr); }
            if type_of(helpers) != "Helpers" { throw type_of(helpers); }
            if window != Rect(0, 0, 20, 20) { throw `window ${window}`; }
            if time <= 0.0 { throw "time"; }
            if stdin.speed != 2.5 { throw "stdin"; }
        }
        "#,
    );
    let mut script = Script::load(&path);
    assert_eq!(script.status(), ScriptStatus::Ready);

    let input = InputSnapshot::parse_line(r#"{"speed": 2.5}"#).unwrap();
    let frame = frame().with_input(Arc::new(input));
    let (ok, _) = render_alpha(&mut script, &frame);
    assert!(ok, "{:?}", script.render_error());
}

#[test]
fn test_render_failure_then_recovery() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            helpers.move_to(Point(5, 5));
            if "fail" in stdin { throw "asked to fail"; }
        }
        "#,
    );
    let mut script = Script::load(&path).with_options(RenderOptions {
        error_overlay: false,
        ..RenderOptions::default()
    });
    let shared = SharedInput::new();

    shared.update_from_line(r#"{"fail": true}"#).unwrap();
    let (ok, _) = render_alpha(&mut script, &frame().with_input(shared.latest()));
    assert!(!ok);
    assert_eq!(script.status(), ScriptStatus::RenderFailed);
    let err = script.render_error().unwrap();
    assert!(err.diagnostics.contains("asked to fail"));
    assert!(err.diagnostics.contains("render failed"));
    // Overlay state is still captured on the failing frame.
    assert!(script.transform().is_some());
    assert!(script.inverse().is_some());
    assert_eq!(script.last_point(), Some(Point::new(50.0, 50.0)));

    shared.update_from_line(r#"{"ok": 1}"#).unwrap();
    let (ok, _) = render_alpha(&mut script, &frame().with_input(shared.latest()));
    assert!(ok);
    assert!(script.render_error().is_none());
    assert_eq!(script.status(), ScriptStatus::Ready);
}

#[test]
fn test_leftover_saves_and_scopes_are_unwound() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            cr.save();
            cr.save();
            cr.scale(2, 2);
            save(|| {
                cr.translate(5, 5);
                cr.save();
            });
        }
        "#,
    );
    let mut script = Script::load(&path);
    let (ok, _) = render_alpha(&mut script, &frame());
    assert!(ok, "{:?}", script.render_error());
}

#[test]
fn test_scope_restores_when_closure_throws() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            box(window.inset(2), |local| {
                cr.rotate(1);
                throw "inside box";
            });
        }
        "#,
    );
    let mut script = Script::load(&path).with_options(RenderOptions {
        error_overlay: false,
        ..RenderOptions::default()
    });
    let (ok, _) = render_alpha(&mut script, &frame());
    assert!(!ok);
    let err = script.render_error().unwrap();
    assert!(err.diagnostics.contains("inside box"), "{}", err.diagnostics);
}

#[test]
fn test_unpainted_path_gets_debug_stroke() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            helpers.circle(window.center, 5);
        }
        "#,
    );
    let mut script = Script::load(&path);
    let (ok, alpha) = render_alpha(&mut script, &frame());
    assert!(ok);
    assert!(alpha > 0);
}

#[test]
fn test_quiet_failure_leaves_surface_blank() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, r#"if PHASE == "render" { throw "nothing drawn"; }"#);
    let mut script = Script::load(&path).with_options(RenderOptions {
        error_overlay: false,
        ..RenderOptions::default()
    });
    let (ok, alpha) = render_alpha(&mut script, &frame());
    assert!(!ok);
    assert_eq!(alpha, 0);
    assert_eq!(script.last_point(), None);
}

#[test]
fn test_filled_paths_are_not_overlaid() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            cr.set_source(rgb(0, 0, 0));
            helpers.rect(window);
            cr.fill();
        }
        "#,
    );
    let mut script = Script::load(&path);
    let (ok, alpha) = render_alpha(&mut script, &frame());
    assert!(ok);
    assert_eq!(alpha, 255 * (SIZE as u64) * (SIZE as u64));
}

#[test]
fn test_ellipse_takes_semi_axes() {
    let pixels = fill_shape("helpers.ellipse(Point(100, 100), 40, 20)");
    // x spans 60..140, y spans 80..120
    assert_eq!(alpha_at(&pixels, 63, 100), 255);
    assert_eq!(alpha_at(&pixels, 137, 100), 255);
    assert_eq!(alpha_at(&pixels, 57, 100), 0);
    assert_eq!(alpha_at(&pixels, 143, 100), 0);
    assert_eq!(alpha_at(&pixels, 100, 83), 255);
    assert_eq!(alpha_at(&pixels, 100, 116), 255);
    assert_eq!(alpha_at(&pixels, 100, 77), 0);
    assert_eq!(alpha_at(&pixels, 100, 123), 0);
}

#[test]
fn test_circle_extent() {
    let pixels = fill_shape("helpers.circle(Point(100, 100), 30)");
    assert_eq!(alpha_at(&pixels, 73, 100), 255);
    assert_eq!(alpha_at(&pixels, 126, 100), 255);
    assert_eq!(alpha_at(&pixels, 67, 100), 0);
    assert_eq!(alpha_at(&pixels, 100, 133), 0);
    // corner of the bounding square lies outside the disc
    assert_eq!(alpha_at(&pixels, 74, 74), 0);
}

#[test]
fn test_rect_extent() {
    let pixels = fill_shape("helpers.rect(Rect(40, 50, 60, 30))");
    assert_eq!(alpha_at(&pixels, 40, 50), 255);
    assert_eq!(alpha_at(&pixels, 99, 79), 255);
    assert_eq!(alpha_at(&pixels, 39, 60), 0);
    assert_eq!(alpha_at(&pixels, 100, 60), 0);
    assert_eq!(alpha_at(&pixels, 60, 49), 0);
    assert_eq!(alpha_at(&pixels, 60, 80), 0);

    let centered = fill_shape("helpers.center_rect(Point(70, 65), 60, 30)");
    assert_eq!(centered, pixels);
}

#[test]
fn test_non_finite_transform_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_script(
        &dir,
        r#"
        if PHASE == "render" {
            if "nan" in stdin { cr.translate(parse_float("NaN"), 0); }
            if "inf" in stdin { helpers.circle(window.center, parse_float("inf")); }
            cr.set_source(rgb(0, 0, 0));
            helpers.rect(window);
            cr.fill();
        }
        "#,
    );
    let mut script = Script::load(&path).with_options(RenderOptions {
        error_overlay: false,
        ..RenderOptions::default()
    });
    let shared = SharedInput::new();

    for bad in [r#"{"nan": true}"#, r#"{"inf": true}"#] {
        shared.update_from_line(bad).unwrap();
        let (ok, alpha) = render_alpha(&mut script, &frame().with_input(shared.latest()));
        assert!(!ok);
        let err = script.render_error().unwrap();
        assert!(err.diagnostics.contains("finite"), "{}", err.diagnostics);
        assert_eq!(alpha, 0);
    }

    shared.update_from_line(r#"{"ok": 1}"#).unwrap();
    let (ok, alpha) = render_alpha(&mut script, &frame().with_input(shared.latest()));
    assert!(ok, "{:?}", script.render_error());
    assert_eq!(alpha, 255 * (SIZE as u64) * (SIZE as u64));
}

#[test]
fn test_invalid_dash_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_script(&dir, r#"if PHASE == "render" { cr.set_dash([-1.0], 0); }"#);
    let mut script = Script::load(&path).with_options(RenderOptions {
        error_overlay: false,
        ..RenderOptions::default()
    });
    let (ok, _) = render_alpha(&mut script, &frame());
    assert!(!ok);
    assert!(script.render_error().unwrap().diagnostics.contains("dash"));
}

#[test]
fn test_crosshair_has_fixed_device_size() {
    let dir = TempDir::new().unwrap();
    // window center is device (100, 100) at 10 px per mm
    let path = write_script(&dir, r#"if PHASE == "render" { helpers.move_to(window.center); }"#);
    let mut script = Script::load(&path);
    let (ok, pixels) = render_pixels(&mut script, &frame());
    assert!(ok);
    assert_eq!(script.last_point(), Some(Point::new(100.0, 100.0)));
    assert!(alpha_at(&pixels, 103, 100) > 0);
    assert!(alpha_at(&pixels, 100, 96) > 0);
    assert_eq!(alpha_at(&pixels, 108, 100), 0);
    assert_eq!(alpha_at(&pixels, 100, 91), 0);
    assert_eq!(alpha_at(&pixels, 80, 80), 0);
}
