//! Font descriptions in the `"family [bold] [italic] [size]"` form used by
//! font parameters.

use cairo::{FontSlant, FontWeight};
use std::fmt;

use sketchbox_params::DEFAULT_FONT;

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: Option<f64>,
    pub slant: FontSlant,
    pub weight: FontWeight,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: DEFAULT_FONT.to_string(),
            size: None,
            slant: FontSlant::Normal,
            weight: FontWeight::Normal,
        }
    }
}

impl FontSpec {
    /// Parses `"Sans Bold Italic 12"`. Style words and a trailing size are
    /// optional; an empty family falls back to monospace.
    pub fn parse(text: &str) -> Self {
        let mut spec = FontSpec::default();
        let mut words: Vec<&str> = text.split_whitespace().collect();

        if let Some(size) = words.last().and_then(|w| w.parse::<f64>().ok()) {
            if size.is_finite() && size > 0.0 {
                spec.size = Some(size);
                words.pop();
            }
        }

        let mut family = Vec::new();
        for word in words {
            match word.to_lowercase().as_str() {
                "bold" => spec.weight = FontWeight::Bold,
                "italic" => spec.slant = FontSlant::Italic,
                "oblique" => spec.slant = FontSlant::Oblique,
                "regular" | "normal" => {}
                _ => family.push(word),
            }
        }
        if !family.is_empty() {
            spec.family = family.join(" ");
        }
        spec
    }

    pub fn apply(&self, cr: &cairo::Context) {
        cr.select_font_face(&self.family, self.slant, self.weight);
        if let Some(size) = self.size {
            cr.set_font_size(size);
        }
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.weight == FontWeight::Bold {
            write!(f, " Bold")?;
        }
        match self.slant {
            FontSlant::Italic => write!(f, " Italic")?,
            FontSlant::Oblique => write!(f, " Oblique")?,
            _ => {}
        }
        if let Some(size) = self.size {
            write!(f, " {}", size)?;
        }
        Ok(())
    }
}
