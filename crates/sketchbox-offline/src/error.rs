//! Error types for headless rendering.

use std::io;
use std::path::PathBuf;

use sketchbox_script::{InputError, LoadError};
use thiserror::Error;

use crate::args::{Format, Mode};

/// A command line that cannot be carried out. Reported without a backtrace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UserError {
    /// PNG data is only ever written to a file
    #[error("PNG does not support streaming to stdout.")]
    PngToStdout,

    /// Only PDF and PostScript hold several pages
    #[error("The {0} format does not support slideshows.")]
    NoSlideshow(Format),

    /// The mode writes more than once and needs somewhere to put it
    #[error("{0} mode requires an output path (-o).")]
    OutputRequired(Mode),

    /// Oneshot mode found nothing to render
    #[error("oneshot mode expected a line of input on stdin")]
    EmptyInput,

    /// A `--param` that is not `NAME=VALUE`
    #[error("malformed parameter '{0}', expected NAME=VALUE")]
    MalformedParam(String),

    #[error("page size must be two positive lengths, got {0:?}")]
    InvalidSize(Vec<f64>),

    #[error("dpi must be positive, got {0}")]
    InvalidDpi(f64),
}

/// Errors that stop a headless run.
#[derive(Error, Debug)]
pub enum OfflineError {
    #[error(transparent)]
    User(#[from] UserError),

    /// The script could not be loaded and initialized
    #[error("{0}")]
    Load(#[from] LoadError),

    /// The oneshot input line was not usable
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("cannot write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

pub type OfflineResult<T> = Result<T, OfflineError>;
