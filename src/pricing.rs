//! # Pricing
//!
//! Totals for `pricing_table` blocks. Amounts are plain `f64` euros: rows
//! are summed unrounded and only the display strings round to two decimals,
//! so a table can show cents that do not add up by one. That matches the
//! printed documents customers already have.

use crate::model::LineItem;

/// German standard VAT rate, applied to every table.
pub const VAT_RATE: f64 = 0.19;

/// Subtotal, VAT and total of a list of line items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingSummary {
    pub subtotal: f64,
    pub vat: f64,
    pub total: f64,
}

impl PricingSummary {
    pub fn compute(items: &[LineItem]) -> Self {
        let subtotal = items.iter().fold(0.0, |acc, item| acc + item.price);
        let vat = subtotal * VAT_RATE;
        Self {
            subtotal,
            vat,
            total: subtotal + vat,
        }
    }
}

/// `€ 12.50`, the format printed in pricing tables.
pub fn format_eur(amount: f64) -> String {
    format!("€ {}", two_decimals(amount))
}

/// `€ 1234,56`, the German decimal comma used by the derived
/// `*TotalFormatted` variables.
pub fn format_eur_de(amount: f64) -> String {
    format!("€ {}", two_decimals(amount).replace('.', ","))
}

/// Fixed two decimals. Amounts that round to zero print unsigned.
fn two_decimals(amount: f64) -> String {
    let text = format!("{:.2}", amount);
    match text.strip_prefix('-') {
        Some(unsigned) if unsigned == "0.00" => unsigned.to_string(),
        _ => text,
    }
}

/// Quantity column text. Whole numbers print without decimals.
pub fn format_quantity(quantity: Option<f64>) -> String {
    match quantity {
        None => "1".to_string(),
        Some(q) if q.fract() == 0.0 && q.abs() < 1e15 => format!("{}", q as i64),
        Some(q) => format!("{}", q),
    }
}
