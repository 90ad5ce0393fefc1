//! Paint sources beyond solid colors: linear gradients and image patterns.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

use sketchbox_core::{Point, Rgba};

use crate::error::DrawError;

/// A linear gradient shared between script handles.
#[derive(Clone)]
pub struct Gradient {
    inner: Rc<cairo::LinearGradient>,
}

impl Gradient {
    pub fn linear(from: Point, to: Point) -> Self {
        Self {
            inner: Rc::new(cairo::LinearGradient::new(from.x, from.y, to.x, to.y)),
        }
    }

    pub fn add_stop(&self, offset: f64, color: Rgba) {
        self.inner
            .add_color_stop_rgba(offset.clamp(0.0, 1.0), color.r, color.g, color.b, color.a);
    }

    pub fn set_as_source(&self, cr: &cairo::Context) -> Result<(), DrawError> {
        cr.set_source(&*self.inner)?;
        Ok(())
    }
}

/// A decoded image ready to paint.
#[derive(Clone)]
pub struct ImagePattern {
    surface: cairo::ImageSurface,
    path: PathBuf,
}

impl ImagePattern {
    /// Decodes any format the `image` crate understands into a
    /// premultiplied ARGB32 surface.
    pub fn load(path: &Path) -> Result<Self, DrawError> {
        let fail = |message: String| DrawError::Image {
            path: path.to_path_buf(),
            message,
        };
        let rgba = image::open(path).map_err(|e| fail(e.to_string()))?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let w = i32::try_from(width).map_err(|e| fail(e.to_string()))?;
        let h = i32::try_from(height).map_err(|e| fail(e.to_string()))?;
        let stride = cairo::Format::ARgb32.stride_for_width(width)?;
        let stride_bytes = usize::try_from(stride).map_err(|e| fail(e.to_string()))?;

        let mut data = vec![0u8; stride_bytes * height as usize];
        for (y, row) in rgba.rows().enumerate() {
            let line = &mut data[y * stride_bytes..];
            for (x, px) in row.enumerate() {
                let [r, g, b, a] = px.0;
                let premultiply = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
                let word = u32::from(a) << 24
                    | u32::from(premultiply(r)) << 16
                    | u32::from(premultiply(g)) << 8
                    | u32::from(premultiply(b));
                line[x * 4..x * 4 + 4].copy_from_slice(&word.to_ne_bytes());
            }
        }

        let surface = cairo::ImageSurface::create_for_data(data, cairo::Format::ARgb32, w, h, stride)?;
        Ok(Self {
            surface,
            path: path.to_path_buf(),
        })
    }

    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Uses the image as the source with its top-left corner at `origin`.
    pub fn set_as_source(&self, cr: &cairo::Context, origin: Point) -> Result<(), DrawError> {
        cr.set_source_surface(&self.surface, origin.x, origin.y)?;
        Ok(())
    }
}

/// Decoded images keyed by path, kept for the lifetime of one script load.
///
/// Failures are cached too so a broken file is reported once, not every frame.
#[derive(Clone, Default)]
pub struct ImageCache {
    entries: Rc<RefCell<HashMap<PathBuf, Option<ImagePattern>>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<ImagePattern> {
        if let Some(entry) = self.entries.borrow().get(path) {
            return entry.clone();
        }
        let entry = match ImagePattern::load(path) {
            Ok(pattern) => {
                debug!(path = %path.display(), "loaded image");
                Some(pattern)
            }
            Err(e) => {
                warn!(error = %e, "image parameter unavailable");
                None
            }
        };
        self.entries
            .borrow_mut()
            .insert(path.to_path_buf(), entry.clone());
        entry
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
