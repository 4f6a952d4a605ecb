//! Free-text blocks: header, custom, footer and terms.

use super::{BlockContext, Painter};
use crate::model::{TermsContent, TextContent};
use crate::style::TextAlign;

const LINE_PITCH: f64 = 5.0;
const FOOTER_SIZE: f64 = 8.0;
/// Footer baseline sits this far below the bottom margin line.
const FOOTER_DROP: f64 = 10.0;
const FOOTER_PITCH: f64 = 3.5;
const TERMS_SIZE: f64 = 9.0;
const TERMS_TITLE_GAP: f64 = 8.0;
const DEFAULT_TERMS_TITLE: &str = "Allgemeine Geschäftsbedingungen";

/// Header and custom blocks: substituted, wrapped to the block width.
pub(super) fn render_text(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &TextContent) {
    let text = ctx.variables.substitute(content.source());
    let style = painter.style.clone();
    let rect = painter.rect;
    let pitch = painter.pitch(LINE_PITCH, &style);
    painter.wrapped(&text, rect.x, rect.y, rect.width, pitch, &style);
}

/// Footer: centred on the page and wrapped to the block width, first
/// baseline at a fixed distance below the bottom margin wherever the block
/// itself was placed.
pub(super) fn render_footer(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &TextContent) {
    let text = ctx.variables.substitute(content.source());
    let (page_width, page_height) = ctx.page.dimensions();
    let y = page_height - ctx.page.margins.bottom + FOOTER_DROP;
    let width = painter.rect.width;
    let style = painter.style.sized(FOOTER_SIZE);
    let pitch = painter.pitch(FOOTER_PITCH, &style);
    let x = (page_width - width) / 2.0;
    painter.wrapped_aligned(&text, x, y, width, pitch, TextAlign::Center, &style);
}

pub(super) fn render_terms(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &TermsContent) {
    let rect = painter.rect;
    let title = content
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TERMS_TITLE);
    let title_style = painter.style.bold();
    painter.text_at(title, rect.x, rect.y, TextAlign::Left, &title_style);

    let body = content
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(content.template.as_deref())
        .unwrap_or("");
    let body = ctx.variables.substitute(body);
    let style = painter.style.sized(TERMS_SIZE);
    let pitch = painter.pitch(LINE_PITCH, &style);
    painter.wrapped(&body, rect.x, rect.y + TERMS_TITLE_GAP, rect.width, pitch, &style);
}
