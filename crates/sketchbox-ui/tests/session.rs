//! Session behavior driven the way the windows drive it.

use sketchbox_params::Value;
use sketchbox_script::{RenderOptions, SharedInput, Viewport};
use sketchbox_ui::Session;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn context() -> (cairo::ImageSurface, cairo::Context) {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 32, 32).unwrap();
    let cr = cairo::Context::new(&surface).unwrap();
    (surface, cr)
}

#[test]
fn test_edit_on_disk_rebuilds_parameters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sketch.rhai");
    fs::write(&path, r#"if PHASE == "init" { params.define("a", Toggle(true)); }"#).unwrap();

    let mut session = Session::open(&path, RenderOptions::default(), SharedInput::new());
    session.watch();
    assert!(session.is_watching());
    session.live().set("a", Value::Bool(false));

    fs::write(
        &path,
        r#"if PHASE == "init" { params.define("a", Toggle(true)); params.define("b", Numeric(0, 10)); }"#,
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !session.poll_watcher() {
        assert!(Instant::now() < deadline, "no reload after edit");
        thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(session.script().params().len(), 2);
    assert!(session.live().is_empty());
}

#[test]
fn test_streamed_input_reaches_render() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sketch.rhai");
    fs::write(
        &path,
        r#"if PHASE == "render" && stdin.level != 3.0 { throw "no level"; }"#,
    )
    .unwrap();

    let input = SharedInput::new();
    let mut session = Session::open(&path, RenderOptions::default(), input.clone());
    let (_surface, cr) = context();
    let viewport = Viewport::from_dpi(32.0, 32.0, 96.0);

    assert!(session.render(&cr, viewport).is_err());
    input.update_from_line(r#"{"level": 3}"#).unwrap();
    assert!(session.render(&cr, viewport).is_ok());
}
