//! Error types for script loading, rendering and the host plumbing around it.

use std::path::PathBuf;
use thiserror::Error;

/// The script source could not be compiled.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("compile error: {message}")]
pub struct CompileError {
    pub message: String,
    /// Location and source excerpt, formatted for display.
    pub diagnostics: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// The init phase raised. Parameters defined before the failure stay registered.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("init phase failed: {message}")]
pub struct InitError {
    pub message: String,
    pub diagnostics: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// The render phase raised for one frame.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("render phase failed: {message}")]
pub struct RenderError {
    pub message: String,
    pub diagnostics: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl RenderError {
    /// A failure raised by the host rather than by script code.
    pub fn host(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            diagnostics: message.clone(),
            message,
            line: None,
            column: None,
        }
    }
}

/// Why a reload did not produce a fully initialized script.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The script file could not be read
    #[error("cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Init(#[from] InitError),
}

impl LoadError {
    /// Multi-line text suitable for an on-surface error box.
    pub fn diagnostics(&self) -> String {
        match self {
            Self::Read { .. } => self.to_string(),
            Self::Compile(e) => e.diagnostics.clone(),
            Self::Init(e) => e.diagnostics.clone(),
        }
    }
}

/// Failures of drawing-context operations.
#[derive(Error, Debug)]
pub enum DrawError {
    /// The cairo context reported an error status
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    /// `restore` was called more often than `save`
    #[error("restore without matching save")]
    UnbalancedRestore,

    /// A scale factor of zero would leave the context non-invertible
    #[error("degenerate scale ({x}, {y})")]
    DegenerateScale { x: f64, y: f64 },

    /// An image file could not be decoded into a surface
    #[error("cannot load image {path}: {message}")]
    Image { path: PathBuf, message: String },
}

/// A line of the streamed input channel could not be used.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("unsupported value for '{key}': {found}")]
    Unsupported { key: String, found: String },
}

/// File watcher setup failures.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("script path has no file name: {0}")]
    NoFileName(PathBuf),
}
