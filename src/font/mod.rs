//! # Fonts
//!
//! Documents use the standard PDF Type1 families only: Helvetica, Times and
//! Courier, each in regular, bold, italic and bold-italic. None of them needs
//! embedding; the PDF viewer supplies the glyphs and we only need advance
//! widths to wrap lines.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::units::pt_to_mm;

/// One of the three supported font families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Map a free-form family name from block settings or branding.
    /// Unknown names fall back to Helvetica.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        if lower.starts_with("times") || (lower.contains("serif") && !lower.contains("sans")) {
            FontFamily::Times
        } else if lower.starts_with("courier") || lower.contains("mono") {
            FontFamily::Courier
        } else {
            FontFamily::Helvetica
        }
    }
}

/// The standard PDF fonts we emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn select(family: FontFamily, bold: bool, italic: bool) -> Self {
        match (family, bold, italic) {
            (FontFamily::Helvetica, false, false) => Self::Helvetica,
            (FontFamily::Helvetica, true, false) => Self::HelveticaBold,
            (FontFamily::Helvetica, false, true) => Self::HelveticaOblique,
            (FontFamily::Helvetica, true, true) => Self::HelveticaBoldOblique,
            (FontFamily::Times, false, false) => Self::TimesRoman,
            (FontFamily::Times, true, false) => Self::TimesBold,
            (FontFamily::Times, false, true) => Self::TimesItalic,
            (FontFamily::Times, true, true) => Self::TimesBoldItalic,
            (FontFamily::Courier, false, false) => Self::Courier,
            (FontFamily::Courier, true, false) => Self::CourierBold,
            (FontFamily::Courier, false, true) => Self::CourierOblique,
            (FontFamily::Courier, true, true) => Self::CourierBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => {
                StandardFontMetrics::HELVETICA_BOLD
            }
            Self::TimesRoman | Self::TimesItalic | Self::TimesBold | Self::TimesBoldItalic => {
                StandardFontMetrics::TIMES_ROMAN
            }
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => StandardFontMetrics::COURIER,
        }
    }
}

/// Text measurement shared by the block renderers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Width of `text` in points.
    pub fn measure_pt(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size)
    }

    /// Width of `text` in millimeters, the unit block geometry uses.
    pub fn measure_mm(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        pt_to_mm(self.measure_pt(text, font, font_size))
    }
}
