//! Pricing table block.
//!
//! ```text
//! ┌ Beschreibung ─────────── Menge ─── Preis ┐  grey header, 8mm
//!   Umzug                      1     € 1200.00    one 8mm row per item
//!                               ────────────
//!                               Zwischensumme:   € 1200.00
//!                               MwSt. 19%:        € 228.00
//!                               ════════════
//!                               Gesamtbetrag:    € 1428.00
//! ```

use super::Painter;
use crate::model::PricingContent;
use crate::pricing::{format_eur, format_quantity, PricingSummary};
use crate::style::{Color, TextAlign};

const ROW_HEIGHT: f64 = 8.0;
/// Baseline offset inside a row.
const ROW_BASELINE: f64 = 5.0;
const CELL_PADDING: f64 = 2.0;
/// Distance of the quantity column's centre from the right edge.
const QUANTITY_COLUMN: f64 = 40.0;
/// Width of the totals area at the right edge.
const TOTALS_WIDTH: f64 = 50.0;
const TOTALS_PITCH: f64 = 6.0;
const TITLE_GAP: f64 = 8.0;
const RULE_WIDTH: f64 = 0.2;

pub(super) fn render_pricing_table(painter: &mut Painter<'_>, content: &PricingContent) {
    let rect = painter.rect;
    let regular = painter.style.clone();
    let bold = regular.bold();
    let x = rect.x;
    let width = rect.width;
    let right = x + width - CELL_PADDING;
    let quantity_x = x + width - QUANTITY_COLUMN;
    let totals_x = x + width - TOTALS_WIDTH;
    let mut y = rect.y;

    if let Some(title) = content.title.as_deref().filter(|t| !t.is_empty()) {
        painter.text_at(title, x, y, TextAlign::Left, &bold);
        y += TITLE_GAP - ROW_BASELINE;
    }

    painter.fill(x, y, width, ROW_HEIGHT, Color::rgb8(240, 240, 240));
    painter.text_at("Beschreibung", x + CELL_PADDING, y + ROW_BASELINE, TextAlign::Left, &bold);
    painter.text_at("Menge", quantity_x, y + ROW_BASELINE, TextAlign::Center, &bold);
    painter.text_at("Preis", right, y + ROW_BASELINE, TextAlign::Right, &bold);
    y += ROW_HEIGHT + CELL_PADDING;

    for item in &content.items {
        let baseline = y + ROW_BASELINE;
        painter.text_at(item.label(), x + CELL_PADDING, baseline, TextAlign::Left, &regular);
        painter.text_at(&format_quantity(item.quantity), quantity_x, baseline, TextAlign::Center, &regular);
        painter.text_at(&format_eur(item.price), right, baseline, TextAlign::Right, &regular);
        y += ROW_HEIGHT;
    }

    let summary = PricingSummary::compute(&content.items);

    y += 5.0;
    painter.line(totals_x, y, x + width, y, RULE_WIDTH);
    y += 5.0;
    painter.text_at("Zwischensumme:", totals_x, y, TextAlign::Left, &regular);
    painter.text_at(&format_eur(summary.subtotal), right, y, TextAlign::Right, &regular);

    y += TOTALS_PITCH;
    painter.text_at("MwSt. 19%:", totals_x, y, TextAlign::Left, &regular);
    painter.text_at(&format_eur(summary.vat), right, y, TextAlign::Right, &regular);

    y += TOTALS_PITCH;
    painter.line(totals_x, y - 2.6, x + width, y - 2.6, RULE_WIDTH);
    painter.line(totals_x, y - 2.0, x + width, y - 2.0, RULE_WIDTH);
    painter.text_at("Gesamtbetrag:", totals_x, y + 3.0, TextAlign::Left, &bold);
    painter.text_at(&format_eur(summary.total), right, y + 3.0, TextAlign::Right, &bold);
}
