//! # Block Styling
//!
//! The per-block settings a template editor can attach to a content block:
//! font, text color, background color and alignment. All of them are
//! optional. Resolution fills the gaps from the document defaults
//! (Helvetica or the branding font, 10pt, black, left-aligned).
//!
//! Settings are never carried over from one block to the next. Each block
//! resolves against the same defaults, so reordering blocks cannot change
//! how any of them looks.

use serde::{Deserialize, Serialize};

use crate::font::FontFamily;

/// Style settings attached to a content block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSettings>,
    /// Text color as `#rrggbb` or `#rgb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Fill behind the block, `#rrggbb` or `transparent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlign>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSettings {
    #[serde(default)]
    pub family: Option<String>,
    /// Font size in points.
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub weight: Option<FontWeight>,
    #[serde(default)]
    pub style: Option<FontStyle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// An RGB color with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parse `#rrggbb` or `#rgb`. Returns `None` for anything else,
    /// including `transparent`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
                Some(Self::rgb8(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb8(r, g, b))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Fully resolved text style for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub family: FontFamily,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    pub background: Option<Color>,
    pub align: TextAlign,
}

impl ResolvedStyle {
    /// The document defaults: 10pt, black, left-aligned, in `family`.
    pub fn defaults(family: FontFamily) -> Self {
        Self {
            family,
            font_size: 10.0,
            bold: false,
            italic: false,
            color: Color::BLACK,
            background: None,
            align: TextAlign::Left,
        }
    }

    /// Same style at a different size.
    pub fn sized(&self, font_size: f64) -> Self {
        Self {
            font_size,
            ..self.clone()
        }
    }

    /// Same style in bold.
    pub fn bold(&self) -> Self {
        Self {
            bold: true,
            ..self.clone()
        }
    }
}

impl BlockSettings {
    /// Resolve these settings against the document defaults.
    pub fn resolve(&self, defaults: &ResolvedStyle) -> ResolvedStyle {
        let font = self.font.clone().unwrap_or_default();

        let family = font
            .family
            .as_deref()
            .map(FontFamily::from_name)
            .unwrap_or(defaults.family);

        let font_size = font
            .size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(defaults.font_size);

        let background = self
            .background_color
            .as_deref()
            .filter(|c| !c.eq_ignore_ascii_case("transparent"))
            .and_then(Color::from_hex);

        ResolvedStyle {
            family,
            font_size,
            bold: font
                .weight
                .map(|w| w == FontWeight::Bold)
                .unwrap_or(defaults.bold),
            italic: font
                .style
                .map(|s| s == FontStyle::Italic)
                .unwrap_or(defaults.italic),
            color: self
                .color
                .as_deref()
                .and_then(Color::from_hex)
                .unwrap_or(defaults.color),
            background,
            align: self.alignment.unwrap_or(defaults.align),
        }
    }
}
