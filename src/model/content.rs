//! Typed block content.
//!
//! Persistence stores a block's content as an untyped JSON object next to a
//! `blockType` string. [`BlockContent`] is the typed form: one variant per
//! block type, each owning exactly the keys its renderer reads. Conversion
//! is lenient. Unknown keys are ignored, a content object of the wrong shape
//! degrades to that variant's defaults, and an unrecognised `blockType` is
//! kept as [`BlockContent::Unknown`] so it can round-trip and render as a
//! no-op.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::ContentBlock;
use crate::style::BlockSettings;

/// The ten block kinds a template can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Header,
    Footer,
    Logo,
    CompanyInfo,
    CustomerInfo,
    ServiceList,
    PricingTable,
    Terms,
    Signature,
    Custom,
}

impl BlockType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "header" => Self::Header,
            "footer" => Self::Footer,
            "logo" => Self::Logo,
            "company_info" => Self::CompanyInfo,
            "customer_info" => Self::CustomerInfo,
            "service_list" => Self::ServiceList,
            "pricing_table" => Self::PricingTable,
            "terms" => Self::Terms,
            "signature" => Self::Signature,
            "custom" => Self::Custom,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Logo => "logo",
            Self::CompanyInfo => "company_info",
            Self::CustomerInfo => "customer_info",
            Self::ServiceList => "service_list",
            Self::PricingTable => "pricing_table",
            Self::Terms => "terms",
            Self::Signature => "signature",
            Self::Custom => "custom",
        }
    }
}

/// Content of a block, keyed by its type.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Header(TextContent),
    Footer(TextContent),
    Logo,
    CompanyInfo(FieldContent),
    CustomerInfo(FieldContent),
    ServiceList(ServiceListContent),
    PricingTable(PricingContent),
    Terms(TermsContent),
    Signature(SignatureContent),
    Custom(TextContent),
    /// A block type this engine does not know. Rendered as a no-op.
    Unknown { block_type: String, raw: Value },
}

/// Free text with `{{}}` tokens (header, footer, custom).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TextContent {
    /// `template`, falling back to `text` when the template is absent or empty.
    pub fn source(&self) -> &str {
        non_empty(self.template.as_deref())
            .or(non_empty(self.text.as_deref()))
            .unwrap_or("")
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Field toggles (and optional literal overrides) for the info blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContent {
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
}

/// One entry of an info block's `data` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `false` hides the field; `true` is the same as absent.
    Toggle(bool),
    /// A literal value printed instead of the data source's.
    Text(String),
}

impl FieldContent {
    /// Fields are shown unless explicitly toggled off.
    pub fn is_visible(&self, field: &str) -> bool {
        !matches!(self.data.get(field), Some(FieldValue::Toggle(false)))
    }

    pub fn override_text(&self, field: &str) -> Option<&str> {
        match self.data.get(field) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Services listed in the block itself. When empty the render data's
    /// services are listed instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ServiceLine>,
}

/// A service as it appears on a document: catalog entry plus quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_code: Option<String>,
    #[serde(default)]
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
}

impl From<&super::ServiceCatalogItem> for ServiceLine {
    fn from(item: &super::ServiceCatalogItem) -> Self {
        Self {
            service_code: Some(item.service_code.clone()),
            service_name: item.service_name.clone(),
            unit: Some(item.unit.clone()),
            quantity: None,
            base_price: Some(item.base_price),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// One row of a pricing table. `price` is the row amount, not a unit price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub price: f64,
}

impl LineItem {
    pub fn new(description: &str, quantity: Option<f64>, price: f64) -> Self {
        Self {
            description: Some(description.to_string()),
            name: None,
            quantity,
            price,
        }
    }

    /// `description`, or `name` for items copied from the catalog.
    pub fn label(&self) -> &str {
        non_empty(self.description.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_label: Option<String>,
}

impl BlockContent {
    /// Build typed content from the stored `blockType` and `content` object.
    pub fn from_parts(block_type: &str, content: Value) -> Self {
        let Some(kind) = BlockType::parse(block_type) else {
            return BlockContent::Unknown {
                block_type: block_type.to_string(),
                raw: content,
            };
        };
        match kind {
            BlockType::Header => BlockContent::Header(parse_lenient(kind, content)),
            BlockType::Footer => BlockContent::Footer(parse_lenient(kind, content)),
            BlockType::Logo => BlockContent::Logo,
            BlockType::CompanyInfo => BlockContent::CompanyInfo(parse_lenient(kind, content)),
            BlockType::CustomerInfo => BlockContent::CustomerInfo(parse_lenient(kind, content)),
            BlockType::ServiceList => BlockContent::ServiceList(parse_lenient(kind, content)),
            BlockType::PricingTable => BlockContent::PricingTable(parse_lenient(kind, content)),
            BlockType::Terms => BlockContent::Terms(parse_lenient(kind, content)),
            BlockType::Signature => BlockContent::Signature(parse_lenient(kind, content)),
            BlockType::Custom => BlockContent::Custom(parse_lenient(kind, content)),
        }
    }

    /// `None` for [`BlockContent::Unknown`].
    pub fn known_type(&self) -> Option<BlockType> {
        Some(match self {
            BlockContent::Header(_) => BlockType::Header,
            BlockContent::Footer(_) => BlockType::Footer,
            BlockContent::Logo => BlockType::Logo,
            BlockContent::CompanyInfo(_) => BlockType::CompanyInfo,
            BlockContent::CustomerInfo(_) => BlockType::CustomerInfo,
            BlockContent::ServiceList(_) => BlockType::ServiceList,
            BlockContent::PricingTable(_) => BlockType::PricingTable,
            BlockContent::Terms(_) => BlockType::Terms,
            BlockContent::Signature(_) => BlockType::Signature,
            BlockContent::Custom(_) => BlockType::Custom,
            BlockContent::Unknown { .. } => return None,
        })
    }

    /// The wire name of this content's block type.
    pub fn type_name(&self) -> &str {
        match self {
            BlockContent::Unknown { block_type, .. } => block_type,
            other => other.known_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// Back to the stored JSON object.
    pub fn to_value(&self) -> Value {
        let result = match self {
            BlockContent::Header(c) | BlockContent::Footer(c) | BlockContent::Custom(c) => {
                serde_json::to_value(c)
            }
            BlockContent::Logo => Ok(Value::Object(Default::default())),
            BlockContent::CompanyInfo(c) | BlockContent::CustomerInfo(c) => serde_json::to_value(c),
            BlockContent::ServiceList(c) => serde_json::to_value(c),
            BlockContent::PricingTable(c) => serde_json::to_value(c),
            BlockContent::Terms(c) => serde_json::to_value(c),
            BlockContent::Signature(c) => serde_json::to_value(c),
            BlockContent::Unknown { raw, .. } => Ok(raw.clone()),
        };
        result.unwrap_or(Value::Null)
    }
}

impl ContentBlock {
    /// Convenience accessor used by tests and the dispatcher's logging.
    pub fn type_name(&self) -> &str {
        self.content.type_name()
    }
}

fn parse_lenient<T: DeserializeOwned + Default>(kind: BlockType, content: Value) -> T {
    if content.is_null() {
        return T::default();
    }
    match serde_json::from_value(content) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(block_type = kind.as_str(), error = %e, "malformed block content, using defaults");
            T::default()
        }
    }
}

/// The stored form of a block: untyped `content`, loose `settings`.
///
/// Unset database columns arrive as `null`, so every scalar is optional
/// here and defaulted on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentBlock {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    template_id: Option<String>,
    block_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: Option<i32>,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(default)]
    settings: Value,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    is_visible: Option<bool>,
}

impl From<RawContentBlock> for ContentBlock {
    fn from(raw: RawContentBlock) -> Self {
        let id = raw.id.unwrap_or_default();
        let settings = if raw.settings.is_null() {
            BlockSettings::default()
        } else {
            serde_json::from_value(raw.settings).unwrap_or_else(|e| {
                warn!(block = %id, error = %e, "malformed block settings, using defaults");
                BlockSettings::default()
            })
        };
        ContentBlock {
            content: BlockContent::from_parts(&raw.block_type, raw.content),
            id,
            template_id: raw.template_id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            position: raw.position.unwrap_or(0),
            page_number: raw.page_number.unwrap_or(1),
            x_position: raw.x_position,
            y_position: raw.y_position,
            width: raw.width,
            height: raw.height,
            settings,
            is_visible: raw.is_visible.unwrap_or(true),
        }
    }
}

impl From<ContentBlock> for RawContentBlock {
    fn from(block: ContentBlock) -> Self {
        RawContentBlock {
            block_type: block.content.type_name().to_string(),
            content: block.content.to_value(),
            settings: serde_json::to_value(&block.settings).unwrap_or(Value::Null),
            id: Some(block.id),
            template_id: Some(block.template_id),
            name: Some(block.name),
            position: Some(block.position),
            page_number: Some(block.page_number),
            x_position: block.x_position,
            y_position: block.y_position,
            width: block.width,
            height: block.height,
            is_visible: Some(block.is_visible),
        }
    }
}
