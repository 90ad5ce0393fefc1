//! Output surfaces for each format.
//!
//! PNG has no blank-file surface of its own: frames are painted into an
//! image surface sized in pixels and encoded when the canvas is finished.
//! PDF, PostScript and SVG surfaces are sized in points and stream their
//! output as they are drawn.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sketchbox_core::units::pt_to_pixel;
use sketchbox_core::PT_PER_INCH;
use sketchbox_script::Viewport;

use crate::args::Format;
use crate::error::{OfflineError, OfflineResult};

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl Page {
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    /// The device surface a script draws into for `format`.
    ///
    /// Raster output is `dpi / 25.4` pixels per millimeter; vector output
    /// is always in points.
    pub fn viewport(&self, format: Format, dpi: f64) -> Viewport {
        if format.is_raster() {
            Viewport::from_dpi(
                pt_to_pixel(self.width_pt, dpi) as f64,
                pt_to_pixel(self.height_pt, dpi) as f64,
                dpi,
            )
        } else {
            Viewport::from_dpi(self.width_pt, self.height_pt, PT_PER_INCH)
        }
    }
}

/// Where a canvas writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    File(PathBuf),
    Stdout,
}

impl Output {
    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdout => "stdout".to_string(),
        }
    }
}

enum Target {
    Raster(cairo::ImageSurface),
    Vector(cairo::Surface),
}

impl Target {
    fn context(&self) -> Result<cairo::Context, cairo::Error> {
        match self {
            Self::Raster(surface) => cairo::Context::new(surface),
            Self::Vector(surface) => cairo::Context::new(surface),
        }
    }
}

/// One output document with the context frames are drawn through.
pub struct Canvas {
    target: Target,
    cr: cairo::Context,
    viewport: Viewport,
    output: Output,
}

fn vector_surface(
    format: Format,
    page: Page,
    output: &Output,
) -> Result<cairo::Surface, cairo::Error> {
    let (w, h) = (page.width_pt, page.height_pt);
    let surface = match (format, output) {
        (Format::Pdf, Output::File(path)) => (*cairo::PdfSurface::new(w, h, path)?).clone(),
        (Format::Pdf, Output::Stdout) => (*cairo::PdfSurface::for_stream(w, h, io::stdout())?).clone(),
        (Format::Ps, Output::File(path)) => (*cairo::PsSurface::new(w, h, path)?).clone(),
        (Format::Ps, Output::Stdout) => (*cairo::PsSurface::for_stream(w, h, io::stdout())?).clone(),
        (Format::Svg, Output::File(path)) => (*cairo::SvgSurface::new(w, h, Some(path))?).clone(),
        (Format::Svg, Output::Stdout) => (*cairo::SvgSurface::for_stream(w, h, io::stdout())?).clone(),
        (Format::Png, _) => return Err(cairo::Error::SurfaceTypeMismatch),
    };
    Ok(surface)
}

impl Canvas {
    pub fn create(format: Format, page: Page, dpi: f64, output: Output) -> OfflineResult<Self> {
        let viewport = page.viewport(format, dpi);
        let target = if format.is_raster() {
            Target::Raster(cairo::ImageSurface::create(
                cairo::Format::ARgb32,
                viewport.width as i32,
                viewport.height as i32,
            )?)
        } else {
            Target::Vector(vector_surface(format, page, &output)?)
        };
        let cr = target.context()?;
        tracing::debug!(output = %output.describe(), format = %format, "canvas created");
        Ok(Self {
            target,
            cr,
            viewport,
            output,
        })
    }

    pub fn context(&self) -> &cairo::Context {
        &self.cr
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Erases the whole surface to transparent.
    pub fn clear(&self) -> OfflineResult<()> {
        self.cr.save()?;
        self.cr.set_operator(cairo::Operator::Clear);
        self.cr.paint()?;
        self.cr.restore()?;
        Ok(())
    }

    /// Replaces a context left in an error state by a failed frame.
    ///
    /// Cairo errors are sticky, so without a fresh context every later
    /// page of the document would fail too. Returns whether it was replaced.
    pub fn recover(&mut self) -> OfflineResult<bool> {
        let Err(status) = self.cr.status() else {
            return Ok(false);
        };
        tracing::warn!(error = %status, output = %self.output.describe(), "replacing failed drawing context");
        self.cr = self.target.context()?;
        Ok(true)
    }

    /// Ends the current page of a paged document.
    pub fn show_page(&self) -> OfflineResult<()> {
        self.cr.show_page()?;
        Ok(())
    }

    /// Encodes or flushes the document to its output.
    pub fn finish(self) -> OfflineResult<()> {
        match &self.target {
            Target::Raster(surface) => {
                let Output::File(path) = &self.output else {
                    return Err(OfflineError::User(crate::UserError::PngToStdout));
                };
                write_png(surface, path)?;
            }
            Target::Vector(surface) => surface.finish(),
        }
        Ok(())
    }
}

fn write_png(surface: &cairo::ImageSurface, path: &Path) -> OfflineResult<()> {
    let mut file = File::create(path)?;
    surface
        .write_to_png(&mut file)
        .map_err(|e| OfflineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_viewport_uses_dpi() {
        let page = Page::new(72.0, 36.0);
        let viewport = page.viewport(Format::Png, 96.0);
        assert_eq!(viewport.width, 96.0);
        assert_eq!(viewport.height, 48.0);
        assert!((viewport.scale.x - 96.0 / 25.4).abs() < 1e-12);
    }

    #[test]
    fn test_vector_viewport_is_in_points() {
        let page = Page::new(595.0, 842.0);
        let viewport = page.viewport(Format::Pdf, 300.0);
        assert_eq!(viewport.width, 595.0);
        assert!((viewport.scale.x - 72.0 / 25.4).abs() < 1e-12);
        let window = viewport.script_window();
        assert!((window.width - 595.0 * 25.4 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_makes_surface_transparent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let canvas =
            Canvas::create(Format::Png, Page::new(72.0, 72.0), 72.0, Output::File(path.clone()))
                .unwrap();
        let cr = canvas.context();
        cr.set_source_rgb(1.0, 0.0, 0.0);
        cr.paint().unwrap();
        canvas.clear().unwrap();
        canvas.finish().unwrap();

        let mut file = File::open(&path).unwrap();
        let mut surface = cairo::ImageSurface::create_from_png(&mut file).unwrap();
        assert_eq!(surface.width(), 72);
        let data = surface.data().unwrap();
        assert!(data.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_recover_replaces_failed_context() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");
        let mut canvas =
            Canvas::create(Format::Pdf, Page::new(72.0, 72.0), 72.0, Output::File(path.clone()))
                .unwrap();
        assert!(!canvas.recover().unwrap());

        canvas.context().translate(f64::NAN, 0.0);
        assert!(canvas.context().status().is_err());
        assert!(canvas.clear().is_err());

        assert!(canvas.recover().unwrap());
        assert!(canvas.context().status().is_ok());
        canvas.clear().unwrap();
        canvas.show_page().unwrap();
        canvas.finish().unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
