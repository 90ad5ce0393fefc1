use sketchbox_script::ScriptWatcher;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_edit_requests_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sketch.rhai");
    fs::write(&path, "let a = 1;").unwrap();

    let watcher = ScriptWatcher::new(&path).unwrap();
    assert!(!watcher.take_pending());

    fs::write(&path, "let a = 2;").unwrap();
    assert!(watcher.wait_timeout(Duration::from_secs(5)));
}

#[test]
fn test_sibling_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sketch.rhai");
    fs::write(&path, "let a = 1;").unwrap();

    let watcher = ScriptWatcher::new(&path).unwrap();
    fs::write(dir.path().join("notes.txt"), "unrelated").unwrap();
    assert!(!watcher.wait_timeout(Duration::from_millis(500)));
}
