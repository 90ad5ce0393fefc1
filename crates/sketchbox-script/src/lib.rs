//! # Sketchbox Script
//!
//! Hosts user scripts written in Rhai and draws them with cairo:
//! - `engine`: the two-phase [`Script`] lifecycle (init, then render per frame)
//! - `draw`: the [`DrawingContext`] facade with balanced save/restore scopes
//! - `api`: bindings exposed to scripts in each phase
//! - `pipeline`: viewport scaling and per-frame orchestration
//! - `input`: the streamed `stdin` snapshot and its reader thread
//! - `watcher`: reload requests from file changes

pub mod api;
mod diagnostics;
pub mod draw;
pub mod engine;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod watcher;

pub use api::{Helpers, ParameterRegistry};
pub use draw::{DrawingContext, FontSpec, Gradient, ImageCache, ImagePattern, SaveGuard};
pub use engine::{RenderOptions, Script, ScriptStatus, PHASE_INIT, PHASE_RENDER};
pub use error::{
    CompileError, DrawError, InitError, InputError, LoadError, RenderError, WatchError,
};
pub use input::{InputSnapshot, InputValue, SharedInput};
pub use pipeline::{render_frame, Frame, Viewport, FALLBACK_DPI};
pub use watcher::ScriptWatcher;
