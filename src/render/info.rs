//! Address-style blocks: company info, customer info and the service list.

use super::{BlockContext, Painter};
use crate::model::{FieldContent, ServiceLine, ServiceListContent};
use crate::pricing::format_quantity;
use crate::variables::value_to_string;

const INFO_PITCH: f64 = 5.0;
/// Customer addresses wrap at this width even in wider blocks.
const ADDRESS_WIDTH: f64 = 80.0;
const SERVICE_PITCH: f64 = 6.0;
const SERVICE_TITLE_GAP: f64 = 2.0;
const SERVICE_INDENT: f64 = 5.0;

/// Company details in fixed order. Name is bold; phone, email and website
/// carry a label.
pub(super) fn render_company_info(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &FieldContent) {
    let rect = painter.rect;
    let regular = painter.style.clone();
    let bold = regular.bold();
    let pitch = painter.pitch(INFO_PITCH, &regular);
    let mut y = rect.y;

    for field in ["name", "address", "phone", "email", "website"] {
        if !content.is_visible(field) {
            continue;
        }
        let value = content
            .override_text(field)
            .or_else(|| ctx.company.and_then(|c| c.field(field)))
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let Some(value) = value else {
            continue;
        };
        let text = match field {
            "phone" => format!("Tel: {}", value),
            "email" => format!("Email: {}", value),
            "website" => format!("Web: {}", value),
            _ => value.to_string(),
        };
        let style = if field == "name" { &bold } else { &regular };
        y = painter.wrapped(&text, rect.x, y, rect.width, pitch, style);
    }
}

/// Bold name line (`Kunde` when unnamed), wrapped address, then contact
/// lines. Draws nothing without a customer.
pub(super) fn render_customer_info(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &FieldContent) {
    let Some(customer) = ctx.customer else {
        return;
    };
    let rect = painter.rect;
    let regular = painter.style.clone();
    let pitch = painter.pitch(INFO_PITCH, &regular);
    let mut y = rect.y;

    let field = |name: &str| -> Option<String> {
        if let Some(text) = content.override_text(name) {
            return Some(text.to_string());
        }
        customer
            .get(name)
            .map(value_to_string)
            .filter(|v| !v.trim().is_empty())
    };

    if content.is_visible("name") {
        let name = field("name").unwrap_or_else(|| "Kunde".to_string());
        y = painter.wrapped(&name, rect.x, y, rect.width, pitch, &regular.bold());
    }

    if content.is_visible("address") {
        let address = field("address").or_else(|| {
            customer
                .get("toAddress")
                .map(value_to_string)
                .filter(|v| !v.trim().is_empty())
        });
        if let Some(address) = address {
            let width = rect.width.min(ADDRESS_WIDTH);
            y = painter.wrapped(&address, rect.x, y, width, pitch, &regular);
        }
    }

    for name in ["email", "phone", "company"] {
        if !content.is_visible(name) {
            continue;
        }
        if let Some(value) = field(name) {
            y = painter.wrapped(&value, rect.x, y, rect.width, pitch, &regular);
        }
    }
}

/// Optional bold title, then one bullet per service.
pub(super) fn render_service_list(painter: &mut Painter<'_>, ctx: &BlockContext<'_>, content: &ServiceListContent) {
    let rect = painter.rect;
    let regular = painter.style.clone();
    let pitch = painter.pitch(SERVICE_PITCH, &regular);
    let mut y = rect.y;

    if let Some(title) = content.title.as_deref().filter(|t| !t.is_empty()) {
        y = painter.wrapped(title, rect.x, y, rect.width, pitch, &regular.bold()) + SERVICE_TITLE_GAP;
    }

    let services: &[ServiceLine] = if content.items.is_empty() {
        ctx.services
    } else {
        &content.items
    };

    let width = (rect.width - SERVICE_INDENT).max(0.0);
    for service in services {
        y = painter.wrapped(&service_line(service), rect.x + SERVICE_INDENT, y, width, pitch, &regular);
    }
}

/// `• Name (3 Stunden)`, or just `• Name` without a quantity.
fn service_line(service: &ServiceLine) -> String {
    match service.quantity {
        Some(q) if q != 0.0 => {
            let unit = service.unit.as_deref().map(str::trim).unwrap_or("");
            let quantity = format_quantity(Some(q));
            if unit.is_empty() {
                format!("• {} ({})", service.service_name, quantity)
            } else {
                format!("• {} ({} {})", service.service_name, quantity, unit)
            }
        }
        _ => format!("• {}", service.service_name),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{placed, texts, Fixture};
    use super::super::BlockAssets;
    use super::*;
    use crate::canvas::DrawOp;
    use crate::font::StandardFont;
    use crate::model::{BlockContent, CompanyDetails, FieldValue};
    use serde_json::json;

    fn fields(pairs: &[(&str, FieldValue)]) -> FieldContent {
        FieldContent {
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn company() -> CompanyDetails {
        CompanyDetails {
            name: Some("Relocato GmbH".to_string()),
            address: Some("Hauptstr. 1, 10115 Berlin".to_string()),
            phone: Some("030 123456".to_string()),
            email: Some("info@relocato.de".to_string()),
            website: None,
        }
    }

    #[test]
    fn test_company_info_all_fields() {
        let mut fx = Fixture::new();
        fx.company = Some(company());
        let block = placed(BlockContent::CompanyInfo(FieldContent::default()));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(
            texts(&ops),
            vec![
                "Relocato GmbH",
                "Hauptstr. 1, 10115 Berlin",
                "Tel: 030 123456",
                "Email: info@relocato.de"
            ]
        );
        assert!(matches!(ops[0], DrawOp::Text { font: StandardFont::HelveticaBold, .. }));
        assert!(matches!(ops[1], DrawOp::Text { font: StandardFont::Helvetica, .. }));
    }

    #[test]
    fn test_company_info_toggles_and_overrides() {
        let mut fx = Fixture::new();
        fx.company = Some(company());
        let block = placed(BlockContent::CompanyInfo(fields(&[
            ("phone", FieldValue::Toggle(false)),
            ("address", FieldValue::Toggle(true)),
            ("name", FieldValue::Text("Relocato Umzüge".to_string())),
        ])));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(
            texts(&ops),
            vec!["Relocato Umzüge", "Hauptstr. 1, 10115 Berlin", "Email: info@relocato.de"]
        );
    }

    #[test]
    fn test_customer_info_without_customer_is_empty() {
        let block = placed(BlockContent::CustomerInfo(FieldContent::default()));
        assert!(Fixture::new().render(&block, &BlockAssets::default()).is_empty());
    }

    #[test]
    fn test_customer_info_lines() {
        let mut fx = Fixture::new();
        fx.customer = json!({
            "toAddress": "Neue Str. 5, 20095 Hamburg",
            "email": "max@example.de",
            "phone": null
        })
        .as_object()
        .cloned();
        let block = placed(BlockContent::CustomerInfo(FieldContent::default()));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(
            texts(&ops),
            vec!["Kunde", "Neue Str. 5, 20095 Hamburg", "max@example.de"]
        );
    }

    #[test]
    fn test_customer_info_hidden_email() {
        let mut fx = Fixture::new();
        fx.customer = json!({ "name": "Erika", "email": "e@example.de", "company": "ACME" })
            .as_object()
            .cloned();
        let block = placed(BlockContent::CustomerInfo(fields(&[(
            "email",
            FieldValue::Toggle(false),
        )])));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(texts(&ops), vec!["Erika", "ACME"]);
    }

    #[test]
    fn test_service_list_from_render_data() {
        let mut fx = Fixture::new();
        fx.services = vec![
            ServiceLine {
                service_name: "Möbelmontage".to_string(),
                unit: Some("Stunden".to_string()),
                quantity: Some(3.0),
                ..Default::default()
            },
            ServiceLine {
                service_name: "Halteverbotszone".to_string(),
                ..Default::default()
            },
        ];
        let block = placed(BlockContent::ServiceList(ServiceListContent {
            title: Some("Leistungen".to_string()),
            items: Vec::new(),
        }));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(
            texts(&ops),
            vec!["Leistungen", "• Möbelmontage (3 Stunden)", "• Halteverbotszone"]
        );
        match (&ops[1], &ops[2]) {
            (DrawOp::Text { x, y: y1, .. }, DrawOp::Text { y: y2, .. }) => {
                assert_eq!(*x, 25.0);
                assert_eq!(*y1, 48.0);
                assert_eq!(*y2, 54.0);
            }
            other => panic!("unexpected ops {:?}", other),
        }
    }

    #[test]
    fn test_service_list_prefers_block_items() {
        let mut fx = Fixture::new();
        fx.services = vec![ServiceLine {
            service_name: "Aus Katalog".to_string(),
            ..Default::default()
        }];
        let block = placed(BlockContent::ServiceList(ServiceListContent {
            title: None,
            items: vec![ServiceLine {
                service_name: "Im Block".to_string(),
                quantity: Some(2.5),
                ..Default::default()
            }],
        }));
        let ops = fx.render(&block, &BlockAssets::default());
        assert_eq!(texts(&ops), vec!["• Im Block (2.5)"]);
    }
}
