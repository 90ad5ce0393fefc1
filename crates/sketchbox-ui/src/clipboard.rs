//! Clipboard target for positions clicked on the canvas.

use tracing::debug;

/// Holds the clipboard open between clicks.
///
/// On X11 the copied text is served by this process, so the handle has to
/// outlive the click that set it. It is opened on the first copy and
/// reopened after a failure.
#[derive(Default)]
pub struct PointClipboard {
    handle: Option<arboard::Clipboard>,
}

impl PointClipboard {
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Replaces the clipboard contents with `literal`.
    pub fn copy(&mut self, literal: &str) -> Result<(), arboard::Error> {
        let mut handle = match self.handle.take() {
            Some(handle) => handle,
            None => arboard::Clipboard::new()?,
        };
        handle.set_text(literal.to_string())?;
        self.handle = Some(handle);
        debug!(literal, "copied to clipboard");
        Ok(())
    }
}
