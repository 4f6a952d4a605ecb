//! Signature and logo blocks.

use super::{BlockAssets, Painter};
use crate::model::SignatureContent;
use crate::style::TextAlign;

/// Space between the two signature lines.
const GUTTER: f64 = 20.0;
const LINE_DROP: f64 = 30.0;
const LABEL_DROP: f64 = 35.0;
const LABEL_SIZE: f64 = 8.0;
const LINE_WIDTH: f64 = 0.2;

pub(super) fn render_signature(painter: &mut Painter<'_>, content: &SignatureContent) {
    let rect = painter.rect;
    let line_width = ((rect.width - GUTTER) / 2.0).max(0.0);
    let line_y = rect.y + LINE_DROP;
    let right_start = rect.x + rect.width - line_width;

    painter.line(rect.x, line_y, rect.x + line_width, line_y, LINE_WIDTH);
    painter.line(right_start, line_y, rect.x + rect.width, line_y, LINE_WIDTH);

    let style = painter.style.sized(LABEL_SIZE);
    let left = label(content.left_label.as_deref(), "Ort, Datum");
    let right = label(content.right_label.as_deref(), "Unterschrift");
    let label_y = rect.y + LABEL_DROP;
    painter.text_at(left, rect.x + line_width / 2.0, label_y, TextAlign::Center, &style);
    painter.text_at(right, right_start + line_width / 2.0, label_y, TextAlign::Center, &style);
}

fn label<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

/// The logo stretched into the block rect. Nothing when it did not load.
pub(super) fn render_logo(painter: &mut Painter<'_>, assets: &BlockAssets) {
    let Some(logo) = assets.logo.clone() else {
        return;
    };
    let rect = painter.rect;
    let height = rect.height.unwrap_or(rect.width / logo.aspect_ratio());
    painter.image(logo, rect.x, rect.y, rect.width, height);
}
