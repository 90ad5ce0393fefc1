//! # Sketchbox UI
//!
//! GTK4 front end: a render window that redraws the script on a timer and
//! a parameter window with one row per declared parameter.
//!
//! Clicking the canvas copies the script-space position to the clipboard;
//! any key press in the render window reloads the script.

pub mod app;
pub mod canvas;
pub mod clipboard;
pub mod dial;
pub mod panel;
pub mod session;

pub use app::{choose_script, run, AppOptions, APP_ID};
pub use canvas::RenderView;
pub use clipboard::PointClipboard;
pub use panel::{build_list, parameter_widget, LayoutContext};
pub use session::{point_literal, Session};
