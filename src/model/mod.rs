//! # Template Model
//!
//! The input representation for the rendering engine. A template is a page
//! setup plus a flat list of content blocks, each addressed by page number
//! and sort position and optionally pinned to explicit millimeter
//! coordinates. Business data travels next to it in [`RenderData`].
//!
//! The JSON shape is the persistence layer's: camelCase keys, `blockType`
//! and `content` stored side by side on each block. On load the content is
//! parsed into a typed [`BlockContent`] variant so renderers never probe an
//! untyped bag for the keys they expect.

pub mod content;

pub use content::{
    BlockContent, BlockType, FieldContent, FieldValue, LineItem, PricingContent, ServiceLine,
    ServiceListContent, SignatureContent, TermsContent, TextContent,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::VorlageError;
use crate::style::BlockSettings;

/// A flat JSON object exposed to templates as `{{namespace.field}}`.
pub type Namespace = Map<String, Value>;

/// A reusable document description: page setup plus ordered blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub company_type: String,
    pub template_type: TemplateType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub page_settings: PageSettings,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
    /// Declared variables with defaults, filled in before substitution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<TemplateVariable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Quote,
    Invoice,
    Contract,
    Receipt,
}

/// A variable a template declares, with an optional default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub variable_name: String,
    #[serde(default)]
    pub variable_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Text,
    Number,
    Date,
    Currency,
    Boolean,
}

fn default_true() -> bool {
    true
}

/// Physical page setup, shared by every page of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub format: PageFormat,
    #[serde(default)]
    pub orientation: Orientation,
    /// Margins in millimeters.
    #[serde(default = "default_margins")]
    pub margins: Edges,
}

fn default_margins() -> Edges {
    Edges::uniform(25.0)
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            margins: default_margins(),
        }
    }
}

impl PageSettings {
    /// Returns (width, height) in millimeters, orientation applied.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.format.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.dimensions().0 - self.margins.horizontal()
    }

    /// Reject margins that leave no content area.
    pub fn validate(&self) -> Result<(), VorlageError> {
        let m = &self.margins;
        for (side, v) in [("top", m.top), ("right", m.right), ("bottom", m.bottom), ("left", m.left)] {
            if !v.is_finite() || v < 0.0 {
                return Err(VorlageError::InvalidPageSettings(format!(
                    "{} margin must be a non-negative number, got {}",
                    side, v
                )));
            }
        }
        let (width, height) = self.dimensions();
        if m.vertical() >= height {
            return Err(VorlageError::InvalidPageSettings(format!(
                "top + bottom margins ({}mm) leave no room on a {}mm high page",
                m.vertical(),
                height
            )));
        }
        if m.horizontal() >= width {
            return Err(VorlageError::InvalidPageSettings(format!(
                "left + right margins ({}mm) leave no room on a {}mm wide page",
                m.horizontal(),
                width
            )));
        }
        Ok(())
    }
}

/// Supported paper formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "letter")]
    Letter,
    #[serde(alias = "legal")]
    Legal,
}

impl PageFormat {
    /// Returns portrait (width, height) in millimeters.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Edge values (top, right, bottom, left) in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// One positioned, typed unit of document content.
///
/// Deserialized through [`content::RawContentBlock`] so that a block with
/// malformed settings or content still loads (with defaults) instead of
/// failing the whole template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "content::RawContentBlock", into = "content::RawContentBlock")]
pub struct ContentBlock {
    pub id: String,
    pub template_id: String,
    pub name: String,
    /// Sort key within the page.
    pub position: i32,
    pub page_number: u32,
    /// Explicit geometry in millimeters; `None` means "not placed by hand".
    pub x_position: Option<f64>,
    pub y_position: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub settings: BlockSettings,
    pub content: BlockContent,
    pub is_visible: bool,
}

impl ContentBlock {
    /// A visible block with no explicit geometry and default settings.
    pub fn new(id: &str, page_number: u32, position: i32, content: BlockContent) -> Self {
        Self {
            id: id.to_string(),
            template_id: String::new(),
            name: String::new(),
            position,
            page_number,
            x_position: None,
            y_position: None,
            width: None,
            height: None,
            settings: BlockSettings::default(),
            content,
            is_visible: true,
        }
    }

    /// `None` when the stored `blockType` is not one this engine knows.
    pub fn block_type(&self) -> Option<BlockType> {
        self.content.known_type()
    }

    /// Page this block belongs to. Page 0 means "unassigned" and lands on page 1.
    pub fn page(&self) -> u32 {
        self.page_number.max(1)
    }
}

/// Company stationery: colors, fonts, logo and letterhead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBranding {
    pub company_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letterhead_url: Option<String>,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_primary_color() -> String {
    "#000000".to_string()
}

fn default_secondary_color() -> String {
    "#666666".to_string()
}

fn default_accent_color() -> String {
    "#0066CC".to_string()
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

impl CompanyBranding {
    /// Branding used when a company has none stored.
    pub fn fallback(company_type: &str) -> Self {
        Self {
            company_type: company_type.to_string(),
            logo_url: None,
            letterhead_url: None,
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            accent_color: default_accent_color(),
            font_family: default_font_family(),
        }
    }

    /// Letterhead URL, if set and non-empty.
    pub fn letterhead(&self) -> Option<&str> {
        self.letterhead_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Logo URL, if set and non-empty.
    pub fn logo(&self) -> Option<&str> {
        self.logo_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Contact details printed by `company_info` blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl CompanyDetails {
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => self.name.as_deref(),
            "address" => self.address.as_deref(),
            "phone" => self.phone.as_deref(),
            "email" => self.email.as_deref(),
            "website" => self.website.as_deref(),
            _ => None,
        }
    }
}

/// Reference data from the company's service catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalogItem {
    pub company_type: String,
    /// Unique per company.
    pub service_code: String,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub unit: String,
    pub base_price: f64,
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Everything a single render needs: the template and the business data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderData {
    pub template: Template,
    #[serde(default)]
    pub branding: Option<CompanyBranding>,
    #[serde(default)]
    pub company: Option<CompanyDetails>,
    #[serde(default)]
    pub customer: Option<Namespace>,
    #[serde(default)]
    pub quote: Option<Namespace>,
    #[serde(default)]
    pub invoice: Option<Namespace>,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(default)]
    pub variables: Namespace,
}

impl RenderData {
    /// Render data for a template with no business data attached.
    pub fn new(template: Template) -> Self {
        Self {
            template,
            branding: None,
            company: None,
            customer: None,
            quote: None,
            invoice: None,
            services: Vec::new(),
            variables: Namespace::new(),
        }
    }
}
