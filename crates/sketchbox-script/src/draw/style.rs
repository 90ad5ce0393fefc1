//! Lowercase names for cairo's enumerated settings, as scripts spell them.

use cairo::{Antialias, FontSlant, FontWeight, LineCap, LineJoin, Operator};

pub fn line_cap(name: &str) -> Option<LineCap> {
    match name {
        "butt" => Some(LineCap::Butt),
        "round" => Some(LineCap::Round),
        "square" => Some(LineCap::Square),
        _ => None,
    }
}

pub fn line_join(name: &str) -> Option<LineJoin> {
    match name {
        "miter" => Some(LineJoin::Miter),
        "round" => Some(LineJoin::Round),
        "bevel" => Some(LineJoin::Bevel),
        _ => None,
    }
}

pub fn antialias(name: &str) -> Option<Antialias> {
    match name {
        "default" => Some(Antialias::Default),
        "none" => Some(Antialias::None),
        "gray" => Some(Antialias::Gray),
        "subpixel" => Some(Antialias::Subpixel),
        "fast" => Some(Antialias::Fast),
        "good" => Some(Antialias::Good),
        "best" => Some(Antialias::Best),
        _ => None,
    }
}

pub fn font_slant(name: &str) -> Option<FontSlant> {
    match name {
        "normal" => Some(FontSlant::Normal),
        "italic" => Some(FontSlant::Italic),
        "oblique" => Some(FontSlant::Oblique),
        _ => None,
    }
}

pub fn font_weight(name: &str) -> Option<FontWeight> {
    match name {
        "normal" => Some(FontWeight::Normal),
        "bold" => Some(FontWeight::Bold),
        _ => None,
    }
}

pub fn operator(name: &str) -> Option<Operator> {
    let op = match name {
        "clear" => Operator::Clear,
        "source" => Operator::Source,
        "over" => Operator::Over,
        "in" => Operator::In,
        "out" => Operator::Out,
        "atop" => Operator::Atop,
        "dest" => Operator::Dest,
        "dest_over" => Operator::DestOver,
        "dest_in" => Operator::DestIn,
        "dest_out" => Operator::DestOut,
        "dest_atop" => Operator::DestAtop,
        "xor" => Operator::Xor,
        "add" => Operator::Add,
        "saturate" => Operator::Saturate,
        "multiply" => Operator::Multiply,
        "screen" => Operator::Screen,
        "overlay" => Operator::Overlay,
        "darken" => Operator::Darken,
        "lighten" => Operator::Lighten,
        "color_dodge" => Operator::ColorDodge,
        "color_burn" => Operator::ColorBurn,
        "hard_light" => Operator::HardLight,
        "soft_light" => Operator::SoftLight,
        "difference" => Operator::Difference,
        "exclusion" => Operator::Exclusion,
        "hsl_hue" => Operator::HslHue,
        "hsl_saturation" => Operator::HslSaturation,
        "hsl_color" => Operator::HslColor,
        "hsl_luminosity" => Operator::HslLuminosity,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(line_cap("round"), Some(LineCap::Round));
        assert_eq!(line_join("bevel"), Some(LineJoin::Bevel));
        assert_eq!(operator("difference"), Some(Operator::Difference));
        assert_eq!(operator("Difference"), None);
        assert_eq!(font_weight("bold"), Some(FontWeight::Bold));
        assert_eq!(antialias("nope"), None);
    }
}
