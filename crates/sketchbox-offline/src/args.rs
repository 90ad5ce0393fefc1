//! Command line of the headless runner.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sketchbox_core::units::parse_length;

/// How stdin drives the frames that get rendered.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Render one frame without reading stdin
    #[default]
    Nostdin,
    /// Render one frame from the first line of stdin
    Oneshot,
    /// Render every line of stdin, overwriting the same output file
    Continuous,
    /// Render every line of stdin into its own file in the output directory
    Sequence,
    /// Render every line of stdin as a page of one document
    Slideshow,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Nostdin => "nostdin",
            Self::Oneshot => "oneshot",
            Self::Continuous => "continuous",
            Self::Sequence => "sequence",
            Self::Slideshow => "slideshow",
        }
    }

    pub fn reads_stdin(self) -> bool {
        self != Self::Nostdin
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output file format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Png,
    Pdf,
    Ps,
    Svg,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Ps => "ps",
            Self::Svg => "svg",
        }
    }

    /// Whether one output can hold several pages.
    pub fn is_paged(self) -> bool {
        matches!(self, Self::Pdf | Self::Ps)
    }

    pub fn is_raster(self) -> bool {
        self == Self::Png
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Lengths take `mm`, `in` or `pt` suffixes; a bare number is points.
fn parse_size(value: &str) -> Result<f64, String> {
    parse_length(value).map_err(|e| e.to_string())
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sketchbox-offline",
    version,
    about = "Render sketchbox scripts to PNG, PDF, PostScript or SVG files"
)]
pub struct OfflineArgs {
    /// Output mode
    #[arg(short, long, value_enum, default_value_t = Mode::Nostdin)]
    pub mode: Mode,

    /// Output file format
    #[arg(short, long, value_enum)]
    pub format: Format,

    /// Output file, or the output directory in sequence mode (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Width and height of the output in physical units
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["W", "H"],
        value_parser = parse_size,
        required = true
    )]
    pub size: Vec<f64>,

    /// Raster resolution for PNG output (defaults to the configured dpi)
    #[arg(short, long)]
    pub dpi: Option<f64>,

    /// Override a parameter value, using the parameter's text syntax
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the script to render
    pub script: PathBuf,
}
