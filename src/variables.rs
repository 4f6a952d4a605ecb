//! Variable substitution for block text.
//!
//! Block text carries `{{namespace.field}}` tokens that resolve against the
//! business objects of the render (`customer`, `quote`, `invoice`), bare
//! `{{key}}` tokens that resolve against caller variables, and two reserved
//! tokens, `{{date}}` (`dd.mm.yyyy`) and `{{year}}`.
//!
//! Substitution is one left-to-right scan over the template. A substituted
//! value is copied to the output and never scanned again, so a customer
//! called `{{year}}` prints exactly that. Tokens the context cannot resolve
//! (absent namespace, unknown key) are left verbatim.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

use tracing::warn;

use crate::model::{Namespace, RenderData, TemplateVariable};
use crate::pricing::format_eur_de;

/// The namespaces a template can reference.
#[derive(Debug, Clone)]
pub struct VariableContext<'a> {
    pub customer: Option<&'a Namespace>,
    pub quote: Option<&'a Namespace>,
    pub invoice: Option<&'a Namespace>,
    pub variables: Option<&'a Namespace>,
    /// Date used for `{{date}}` and `{{year}}`.
    pub today: NaiveDate,
}

impl<'a> VariableContext<'a> {
    /// A context with no namespaces, dated today.
    pub fn empty() -> Self {
        Self {
            customer: None,
            quote: None,
            invoice: None,
            variables: None,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_customer(mut self, customer: &'a Namespace) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_quote(mut self, quote: &'a Namespace) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_invoice(mut self, invoice: &'a Namespace) -> Self {
        self.invoice = Some(invoice);
        self
    }

    pub fn with_variables(mut self, variables: &'a Namespace) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn dated(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Resolve the text between `{{` and `}}`. `None` leaves the token as is.
    fn lookup(&self, key: &str) -> Option<String> {
        if let Some((namespace, field)) = key.split_once('.') {
            let ns = match namespace {
                "customer" => self.customer,
                "quote" => self.quote,
                "invoice" => self.invoice,
                _ => None,
            }?;
            // A present namespace blanks its missing fields.
            return Some(ns.get(field).map(value_to_string).unwrap_or_default());
        }

        if let Some(value) = self.variables.and_then(|v| v.get(key)) {
            return Some(value_to_string(value));
        }

        match key {
            "date" => Some(format_date_de(self.today)),
            "year" => Some(self.today.year().to_string()),
            _ => None,
        }
    }

    /// Substitute every resolvable token in `template`.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                // Unterminated: copy the remainder literally.
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after_open[..end];
            // `{{a {{b}}` : the inner opener starts the real token.
            if let Some(inner) = key.rfind("{{") {
                out.push_str(&rest[start..start + 2 + inner]);
                rest = &rest[start + 2 + inner..];
                continue;
            }
            match self.lookup(key.trim()) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after_open[end + 2..];
        }

        out.push_str(rest);
        out
    }
}

/// String form of a namespace value. `null` is empty; strings print without
/// quotes; numbers use their JSON text; nested values print as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// `dd.mm.yyyy`, the German short date.
pub fn format_date_de(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Quotes stay valid for two weeks.
const QUOTE_VALIDITY_DAYS: i64 = 14;

/// The variables every document gets for free, derived from the render data
/// at `now`. Caller variables win over these on key collisions.
pub fn standard_variables(data: &RenderData, now: NaiveDateTime) -> Namespace {
    let mut vars = Namespace::new();
    let today = now.date();

    vars.insert("date".into(), Value::String(format_date_de(today)));
    vars.insert("year".into(), Value::from(today.year()));
    vars.insert(
        "month".into(),
        Value::String(GERMAN_MONTHS[today.month0() as usize].to_string()),
    );
    vars.insert(
        "time".into(),
        Value::String(format!("{:02}:{:02}", now.hour(), now.minute())),
    );

    if let Some(quote) = &data.quote {
        if let Some(id) = quote.get("id").filter(|v| !v.is_null()) {
            vars.insert("quoteNumber".into(), Value::String(value_to_string(id)));
        }
        let created = quote
            .get("createdAt")
            .and_then(parse_date_value)
            .unwrap_or(today);
        vars.insert("quoteDate".into(), Value::String(format_date_de(created)));
        vars.insert(
            "quoteValidUntil".into(),
            Value::String(format_date_de(created + Duration::days(QUOTE_VALIDITY_DAYS))),
        );
        if let Some(price) = quote.get("price").and_then(Value::as_f64) {
            vars.insert("quoteTotal".into(), Value::from(price));
            vars.insert("quoteTotalFormatted".into(), Value::String(format_eur_de(price)));
        }
    }

    if let Some(invoice) = &data.invoice {
        if let Some(number) = invoice.get("invoiceNumber").filter(|v| !v.is_null()) {
            vars.insert("invoiceNumber".into(), Value::String(value_to_string(number)));
        }
        if let Some(created) = invoice.get("createdAt").and_then(parse_date_value) {
            vars.insert("invoiceDate".into(), Value::String(format_date_de(created)));
        }
        if let Some(due) = invoice.get("dueDate").and_then(parse_date_value) {
            vars.insert("invoiceDueDate".into(), Value::String(format_date_de(due)));
        }
        if let Some(total) = invoice.get("totalPrice").and_then(Value::as_f64) {
            vars.insert("invoiceTotal".into(), Value::from(total));
            vars.insert("invoiceTotalFormatted".into(), Value::String(format_eur_de(total)));
        }
    }

    vars
}

/// Fill declared template variables missing from `vars`.
///
/// A declared default is used when the caller supplied no value. A required
/// variable with neither is logged and set to the empty string so its token
/// does not print verbatim.
pub fn apply_template_defaults(vars: &mut Namespace, declared: &[TemplateVariable]) {
    for var in declared {
        let present = vars
            .get(&var.variable_name)
            .is_some_and(|v| !v.is_null());
        if present {
            continue;
        }
        match &var.default_value {
            Some(default) if !default.is_null() => {
                vars.insert(var.variable_name.clone(), default.clone());
            }
            _ if var.is_required => {
                warn!(variable = %var.variable_name, "required template variable has no value");
                vars.insert(var.variable_name.clone(), Value::String(String::new()));
            }
            _ => {}
        }
    }
}

/// Accepts RFC 3339 timestamps, `yyyy-mm-dd` and `dd.mm.yyyy`.
fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%d.%m.%Y").ok())
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}
