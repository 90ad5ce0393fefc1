//! End-to-end headless renders into temporary directories.

use clap::Parser;
use sketchbox_offline::{render, OfflineArgs, OfflineError, Summary, UserError};
use sketchbox_script::RenderOptions;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"
if PHASE == "init" {
    params.define("fill", Toggle(true));
} else {
    if "fail" in stdin { throw "asked to fail"; }
    if fill {
        cr.set_source(rgb(0, 0, 1));
        helpers.rect(window);
        cr.fill();
    }
}
"#;

fn write_script(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sketch.rhai");
    fs::write(&path, SCRIPT).unwrap();
    path
}

fn parse(script: &Path, extra: &[&str]) -> OfflineArgs {
    let mut argv = vec!["sketchbox-offline".to_string()];
    argv.extend(extra.iter().map(|s| s.to_string()));
    argv.push(script.display().to_string());
    OfflineArgs::try_parse_from(argv).unwrap()
}

fn run(args: &OfflineArgs, stdin: &str) -> (Result<Summary, OfflineError>, String) {
    let mut errors = Vec::new();
    let result = render(
        args,
        96.0,
        RenderOptions::default(),
        stdin.as_bytes(),
        &mut errors,
    );
    (result, String::from_utf8(errors).unwrap())
}

fn png_alpha(path: &Path) -> (i32, i32, u64) {
    let mut file = File::open(path).unwrap();
    let mut surface = cairo::ImageSurface::create_from_png(&mut file).unwrap();
    let (w, h) = (surface.width(), surface.height());
    let data = surface.data().unwrap();
    let alpha = data
        .chunks_exact(4)
        .map(|px| (u32::from_ne_bytes([px[0], px[1], px[2], px[3]]) >> 24) as u64)
        .sum();
    (w, h, alpha)
}

#[test]
fn test_nostdin_png_uses_dpi_for_pixel_size() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let out = dir.path().join("out.png");
    let args = parse(
        &script,
        &["-f", "png", "-o", out.to_str().unwrap(), "-s", "1in", "0.5in", "-d", "100"],
    );

    let (result, errors) = run(&args, "");
    assert_eq!(result.unwrap(), Summary { frames: 1, failed: 0 });
    assert!(errors.is_empty());

    let (w, h, alpha) = png_alpha(&out);
    assert_eq!((w, h), (100, 50));
    assert_eq!(alpha, 255 * 100 * 50);
}

#[test]
fn test_param_override_reaches_script() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let out = dir.path().join("blank.png");
    let args = parse(
        &script,
        &["-f", "png", "-o", out.to_str().unwrap(), "-s", "20", "20", "-p", "fill=false"],
    );

    run(&args, "").0.unwrap();
    let (_, _, alpha) = png_alpha(&out);
    assert_eq!(alpha, 0);
}

#[test]
fn test_sequence_writes_numbered_files() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let frames = dir.path().join("frames");
    let args = parse(
        &script,
        &["-m", "sequence", "-f", "png", "-o", frames.to_str().unwrap(), "-s", "10", "10"],
    );

    let stdin = "{\"i\": 0}\n{\"fail\": true}\n\nnot json\n{\"i\": 2}\n";
    let (result, errors) = run(&args, stdin);
    assert_eq!(result.unwrap(), Summary { frames: 3, failed: 1 });
    assert!(errors.contains("asked to fail"), "{errors}");

    assert!(frames.join("0.png").exists());
    assert!(frames.join("1.png").exists());
    assert!(frames.join("2.png").exists());
    assert!(!frames.join("3.png").exists());

    // A failing frame still produces its file, and it starts from a clear page.
    let (_, _, alpha) = png_alpha(&frames.join("1.png"));
    assert_eq!(alpha, 0);
}

#[test]
fn test_slideshow_pdf_holds_every_frame() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let out = dir.path().join("deck.pdf");
    let args = parse(
        &script,
        &["-m", "slideshow", "-f", "pdf", "-o", out.to_str().unwrap(), "-s", "100mm", "50mm"],
    );

    let (result, _) = run(&args, "{\"page\": 1}\n{\"page\": 2}\n{\"page\": 3}\n");
    assert_eq!(result.unwrap().frames, 3);
    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_slideshow_continues_after_broken_transform() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("transform.rhai");
    fs::write(
        &script,
        r#"
        if PHASE == "render" {
            if "nan" in stdin { cr.translate(parse_float("NaN"), 0); }
            // underflows to a singular matrix, which cairo keeps as a context error
            if "tiny" in stdin { cr.scale(1.0e-300); }
            cr.set_source(rgb(0, 0, 1));
            helpers.rect(window);
            cr.fill();
        }
        "#,
    )
    .unwrap();
    let out = dir.path().join("deck.pdf");
    let args = parse(
        &script,
        &["-m", "slideshow", "-f", "pdf", "-o", out.to_str().unwrap(), "-s", "100mm", "50mm"],
    );

    let (result, errors) = run(&args, "{\"page\": 1}\n{\"nan\": 1}\n{\"page\": 3}\n");
    assert_eq!(result.unwrap(), Summary { frames: 3, failed: 1 });
    assert!(errors.contains("finite"), "{errors}");
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));

    let (result, _) = run(&args, "{\"page\": 1}\n{\"tiny\": 1}\n{\"page\": 3}\n");
    assert_eq!(result.unwrap(), Summary { frames: 3, failed: 1 });
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_continuous_svg_overwrites_output() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let out = dir.path().join("live.svg");
    let args = parse(
        &script,
        &["-m", "continuous", "-f", "svg", "-o", out.to_str().unwrap(), "-s", "40", "40"],
    );

    let (result, _) = run(&args, "{}\n{}\n");
    assert_eq!(result.unwrap().frames, 2);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("<svg"));
}

#[test]
fn test_oneshot_requires_input() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir);
    let out = dir.path().join("once.ps");
    let args = parse(
        &script,
        &["-m", "oneshot", "-f", "ps", "-o", out.to_str().unwrap(), "-s", "10", "10"],
    );

    let (result, _) = run(&args, "");
    assert!(matches!(result, Err(OfflineError::User(UserError::EmptyInput))));
    assert!(!out.exists());

    let (result, _) = run(&args, "{\"x\": 1}\n");
    assert_eq!(result.unwrap().frames, 1);
    assert!(out.exists());
}

#[test]
fn test_load_failure_stops_before_output() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken.rhai");
    fs::write(&script, "let x = (1 + ;").unwrap();
    let out = dir.path().join("out.png");
    let args = parse(&script, &["-f", "png", "-o", out.to_str().unwrap(), "-s", "10", "10"]);

    let (result, _) = run(&args, "");
    assert!(matches!(result, Err(OfflineError::Load(_))));
    assert!(!out.exists());
}
