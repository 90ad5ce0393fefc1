use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use sketchbox::offline::{self, OfflineArgs, OfflineError};
use sketchbox::{init_logging, load_config, render_options};

fn main() -> anyhow::Result<ExitCode> {
    let args = OfflineArgs::parse();
    init_logging()?;

    let config = load_config(args.config.as_deref())?;
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    let result = offline::render(
        &args,
        config.offline.dpi,
        render_options(&config.render),
        stdin.lock(),
        &mut stderr,
    );

    match result {
        Ok(summary) if summary.failed > 0 => {
            tracing::warn!(failed = summary.failed, frames = summary.frames, "some frames failed");
            Ok(ExitCode::from(2))
        }
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(OfflineError::Load(e)) => {
            writeln!(stderr, "{}", e.diagnostics())?;
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            writeln!(stderr, "{e}")?;
            Ok(ExitCode::FAILURE)
        }
    }
}
