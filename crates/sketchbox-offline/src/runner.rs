//! Batch modes: how stdin lines become frames and frames become files.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use sketchbox_params::ValueSource;
use sketchbox_script::{Frame, InputSnapshot, RenderOptions, Script};
use tracing::{info, warn};

use crate::args::{Format, Mode, OfflineArgs};
use crate::error::{OfflineResult, UserError};
use crate::surface::{Canvas, Output, Page};

/// Splits `NAME=VALUE` at the first `=`.
pub fn parse_param(spec: &str) -> Result<(String, String), UserError> {
    match spec.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(UserError::MalformedParam(spec.to_string())),
    }
}

/// Frames rendered, and how many of them the script failed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub frames: usize,
    pub failed: usize,
}

/// A validated headless render request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub mode: Mode,
    pub format: Format,
    pub output: Option<PathBuf>,
    pub page: Page,
    pub dpi: f64,
    pub overrides: HashMap<String, String>,
}

impl Job {
    /// Checks the combination of options before anything is rendered.
    pub fn from_args(args: &OfflineArgs, default_dpi: f64) -> Result<Self, UserError> {
        let page = match args.size.as_slice() {
            [w, h] if *w > 0.0 && *h > 0.0 => Page::new(*w, *h),
            other => return Err(UserError::InvalidSize(other.to_vec())),
        };
        let dpi = args.dpi.unwrap_or(default_dpi);
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(UserError::InvalidDpi(dpi));
        }

        match args.mode {
            Mode::Continuous | Mode::Sequence if args.output.is_none() => {
                return Err(UserError::OutputRequired(args.mode));
            }
            Mode::Slideshow if !args.format.is_paged() => {
                return Err(UserError::NoSlideshow(args.format));
            }
            _ => {}
        }
        if args.format.is_raster() && args.output.is_none() {
            return Err(UserError::PngToStdout);
        }

        let overrides = args
            .params
            .iter()
            .map(|spec| parse_param(spec))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            mode: args.mode,
            format: args.format,
            output: args.output.clone(),
            page,
            dpi,
            overrides,
        })
    }

    /// Options for a script rendered by this job: failures go to the
    /// error stream rather than onto the page.
    pub fn render_options(base: RenderOptions) -> RenderOptions {
        RenderOptions {
            error_overlay: false,
            ..base
        }
    }

    fn output(&self) -> Output {
        match &self.output {
            Some(path) => Output::File(path.clone()),
            None => Output::Stdout,
        }
    }

    fn canvas(&self, output: Output) -> OfflineResult<Canvas> {
        Canvas::create(self.format, self.page, self.dpi, output)
    }

    /// Renders `script` according to the mode, reading frames from `input`.
    ///
    /// Script failures are written to `errors` and do not stop the run.
    pub fn run<R: BufRead>(
        &self,
        script: &mut Script,
        values: &dyn ValueSource,
        input: R,
        errors: &mut dyn Write,
    ) -> OfflineResult<Summary> {
        let mut renderer = Renderer {
            script,
            values,
            errors,
            summary: Summary::default(),
        };

        match self.mode {
            Mode::Nostdin => {
                let canvas = self.canvas(self.output())?;
                renderer.draw(&canvas, Arc::new(InputSnapshot::default()))?;
                canvas.finish()?;
            }
            Mode::Oneshot => {
                let snapshot = first_snapshot(input)?;
                let canvas = self.canvas(self.output())?;
                renderer.draw(&canvas, Arc::new(snapshot))?;
                canvas.finish()?;
            }
            Mode::Continuous => {
                for snapshot in snapshots(input) {
                    let canvas = self.canvas(self.output())?;
                    renderer.draw(&canvas, Arc::new(snapshot?))?;
                    canvas.finish()?;
                }
            }
            Mode::Sequence => {
                let dir = self.output.clone().ok_or(UserError::OutputRequired(self.mode))?;
                fs::create_dir_all(&dir)?;
                for (index, snapshot) in snapshots(input).enumerate() {
                    let path = dir.join(format!("{index}.{}", self.format.extension()));
                    let canvas = self.canvas(Output::File(path))?;
                    renderer.draw(&canvas, Arc::new(snapshot?))?;
                    canvas.finish()?;
                }
            }
            Mode::Slideshow => {
                let mut canvas = self.canvas(self.output())?;
                for snapshot in snapshots(input) {
                    renderer.draw(&canvas, Arc::new(snapshot?))?;
                    canvas.recover()?;
                    canvas.show_page()?;
                }
                canvas.finish()?;
            }
        }

        let summary = renderer.summary;
        info!(
            mode = %self.mode,
            frames = summary.frames,
            failed = summary.failed,
            "offline render finished"
        );
        Ok(summary)
    }
}

struct Renderer<'a> {
    script: &'a mut Script,
    values: &'a dyn ValueSource,
    errors: &'a mut dyn Write,
    summary: Summary,
}

impl Renderer<'_> {
    fn draw(&mut self, canvas: &Canvas, input: Arc<InputSnapshot>) -> OfflineResult<()> {
        canvas.clear()?;
        let frame = Frame::new(canvas.viewport()).with_input(input);
        self.summary.frames += 1;
        if let Err(e) = self.script.run(canvas.context(), &frame, self.values) {
            self.summary.failed += 1;
            writeln!(self.errors, "{}", e.diagnostics)?;
        }
        Ok(())
    }
}

fn first_snapshot<R: BufRead>(mut input: R) -> OfflineResult<InputSnapshot> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Err(UserError::EmptyInput.into());
    }
    Ok(InputSnapshot::parse_line(&line)?)
}

/// Parsed input lines. Blank lines are skipped; malformed ones are logged
/// and skipped. Read errors end the run.
fn snapshots<R: BufRead>(input: R) -> impl Iterator<Item = OfflineResult<InputSnapshot>> {
    input.lines().filter_map(|line| match line {
        Err(e) => Some(Err(e.into())),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => match InputSnapshot::parse_line(&line) {
            Ok(snapshot) => Some(Ok(snapshot)),
            Err(e) => {
                warn!(error = %e, "skipping input line");
                None
            }
        },
    })
}
