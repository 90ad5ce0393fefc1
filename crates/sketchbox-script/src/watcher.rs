//! Reload requests from file-system changes.
//!
//! The watcher callback runs on notify's own thread and only sends a unit
//! message; the owner of the [`crate::Script`] drains the channel on its
//! own thread and reloads there.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::WatchError;

pub struct ScriptWatcher {
    path: PathBuf,
    rx: Receiver<()>,
    _watcher: RecommendedWatcher,
}

fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

impl ScriptWatcher {
    /// Watches the directory holding `path`, so editors that replace the
    /// file on save are still seen.
    pub fn new(path: &Path) -> Result<Self, WatchError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| WatchError::NoFileName(path.to_path_buf()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_relevant(&event, &file_name) {
                        debug!(kind = ?event.kind, "script changed on disk");
                        let _ = tx.send(());
                    }
                }
                Err(err) => error!("script watch error: {err:?}"),
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path: path.to_path_buf(),
            rx,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drains queued notifications; true if any arrived.
    pub fn take_pending(&self) -> bool {
        let mut pending = false;
        while self.rx.try_recv().is_ok() {
            pending = true;
        }
        pending
    }

    /// Blocks until a change arrives or `timeout` passes, then drains the
    /// rest of the burst.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => {
                self.take_pending();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_only_matching_file_events_count() {
        let name = OsString::from("demo.rhai");
        let event = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/tmp/demo.rhai"));
        assert!(is_relevant(&event, &name));

        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/tmp/other.rhai"));
        assert!(!is_relevant(&event, &name));

        let event = Event::new(EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("/tmp/demo.rhai"));
        assert!(!is_relevant(&event, &name));
    }

    #[test]
    fn test_rejects_path_without_file_name() {
        assert!(matches!(
            ScriptWatcher::new(Path::new("/")),
            Err(WatchError::NoFileName(_))
        ));
    }
}
