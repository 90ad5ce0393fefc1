//! # Sketchbox Offline
//!
//! Renders a script without a window, for documentation builds and other
//! batch workflows. Parameters come from the environment and `--param`
//! overrides; streamed input comes from stdin one JSON object per line.
//!
//! Modes:
//! - `nostdin`: one frame, stdin is not read
//! - `oneshot`: one frame from the first stdin line
//! - `continuous`: every line re-renders the same output file
//! - `sequence`: every line renders `N.<ext>` in the output directory
//! - `slideshow`: every line is a page of one PDF or PostScript document

pub mod args;
pub mod error;
pub mod runner;
pub mod surface;

use std::io::{BufRead, Write};

use sketchbox_params::TextSource;
use sketchbox_script::{RenderOptions, Script};

pub use args::{Format, Mode, OfflineArgs};
pub use error::{OfflineError, OfflineResult, UserError};
pub use runner::{parse_param, Job, Summary};
pub use surface::{Canvas, Output, Page};

/// Validates `args`, loads the script and renders it.
///
/// Any load failure stops the run before output is created.
pub fn render<R: BufRead>(
    args: &OfflineArgs,
    default_dpi: f64,
    options: RenderOptions,
    input: R,
    errors: &mut dyn Write,
) -> OfflineResult<Summary> {
    let job = Job::from_args(args, default_dpi)?;
    let mut script = Script::new(&args.script).with_options(Job::render_options(options));
    script.reload()?;

    let values = TextSource::from_env().with_overrides(job.overrides.clone());
    job.run(&mut script, &values, input, errors)
}
