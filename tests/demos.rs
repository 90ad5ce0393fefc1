//! The bundled demo sketches load and draw with their defaults.

use sketchbox_params::Defaults;
use sketchbox_script::{Frame, Script, ScriptStatus, Viewport};
use std::path::Path;

fn render_demo(name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
    let mut script = Script::load(&path);
    assert_eq!(script.status(), ScriptStatus::Ready, "{:?}", script.load_error());

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 200, 200).unwrap();
    let cr = cairo::Context::new(&surface).unwrap();
    let frame = Frame::new(Viewport::from_dpi(200.0, 200.0, 96.0));
    let result = script.run(&cr, &frame, &Defaults);
    assert!(result.is_ok(), "{name}: {:?}", script.render_error());
}

#[test]
fn test_gauge_demo() {
    render_demo("gauge.rhai");
}

#[test]
fn test_grid_demo() {
    render_demo("grid.rhai");
}

#[test]
fn test_waves_demo() {
    render_demo("waves.rhai");
}
