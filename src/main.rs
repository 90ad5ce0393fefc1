use std::path::PathBuf;

use clap::Parser;
use sketchbox::{init_logging, load_config, render_options};
use sketchbox_ui::{choose_script, AppOptions};

/// Live-coding sandbox for 2D vector graphics.
#[derive(Parser, Debug)]
#[command(name = "sketchbox", version, about)]
struct Args {
    /// Script to open; a file dialog is shown when omitted
    script: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not reload the script when it changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Do not read input snapshots from stdin
    #[arg(long)]
    no_stdin: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    tracing::info!(version = sketchbox::VERSION, built = sketchbox::BUILD_DATE, "starting sketchbox");

    let config = load_config(args.config.as_deref())?;
    let script = match args.script {
        Some(script) => script,
        None => choose_script()?,
    };

    let options = AppOptions {
        render: render_options(&config.render),
        watch: config.watch.auto_reload && !args.no_watch,
        read_stdin: !args.no_stdin,
        script,
        config,
    };
    let status = sketchbox_ui::run(options);
    tracing::info!(?status, "sandbox closed");

    Ok(())
}
