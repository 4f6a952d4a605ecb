//! # Vorlage
//!
//! A template-driven document renderer for quotes, invoices and contracts.
//!
//! A template is a page setup plus a flat list of typed content blocks
//! (header, company info, pricing table, signature, ...). Each block sits on
//! a numbered page, either pinned to millimeter coordinates or placed by an
//! auto-layout policy. Business data (customer, quote, invoice, services)
//! travels next to the template and reaches the text through `{{variables}}`.
//!
//! ## Architecture
//!
//! ```text
//! RenderData (template + business data)
//!       ↓
//!   [layout]      group visible blocks by page, order by position
//!       ↓
//!   [compositor]  branding, variables, letterhead or plain canvas
//!       ↓
//!   [render]      one block → draw ops, with its own resolved style
//!       ↓
//!   [canvas]      pages of draw ops in millimeters
//!       ↓
//!   [pdf]         serialize to PDF bytes
//! ```
//!
//! Logos and letterheads are the only external inputs. They go through an
//! [`AssetFetcher`](fetch::AssetFetcher) so tests and embedders control the
//! network. A missing image never fails a document.

pub mod canvas;
pub mod compositor;
pub mod config;
pub mod error;
pub mod fetch;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod pricing;
pub mod render;
pub mod store;
pub mod style;
pub mod text;
pub mod units;
pub mod variables;

use serde::{Deserialize, Serialize};
use tracing::debug;

use compositor::Compositor;
use config::RenderConfig;
use error::VorlageError;
use fetch::AssetFetcher;
use model::{CompanyDetails, Namespace, RenderData, ServiceLine};
use store::TemplateStore;

/// Render a document to PDF bytes.
pub async fn render(
    data: &RenderData,
    fetcher: &dyn AssetFetcher,
    config: &RenderConfig,
) -> Result<Vec<u8>, VorlageError> {
    Compositor::new(data, fetcher, config).run().await
}

/// Render a render job described as JSON to PDF bytes.
pub async fn render_json(
    json: &str,
    fetcher: &dyn AssetFetcher,
    config: &RenderConfig,
) -> Result<Vec<u8>, VorlageError> {
    let data: RenderData = serde_json::from_str(json)?;
    render(&data, fetcher, config).await
}

/// A render by template id. Template, branding and service catalog come
/// from the store; the rest is supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template_id: String,
    #[serde(default)]
    pub company: Option<CompanyDetails>,
    #[serde(default)]
    pub customer: Option<Namespace>,
    #[serde(default)]
    pub quote: Option<Namespace>,
    #[serde(default)]
    pub invoice: Option<Namespace>,
    /// Overrides the stored catalog when non-empty.
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(default)]
    pub variables: Namespace,
}

/// Load a template and its company's stationery from `store` and render it.
pub async fn generate(
    store: &dyn TemplateStore,
    fetcher: &dyn AssetFetcher,
    config: &RenderConfig,
    request: GenerateRequest,
) -> Result<Vec<u8>, VorlageError> {
    let template = store
        .template(&request.template_id)
        .await?
        .ok_or_else(|| VorlageError::TemplateNotFound(request.template_id.clone()))?;

    let branding = store.branding(&template.company_type).await?;
    let services = if request.services.is_empty() {
        let catalog = store.services(&template.company_type).await?;
        debug!(
            company_type = %template.company_type,
            services = catalog.len(),
            "using stored service catalog"
        );
        catalog.iter().map(ServiceLine::from).collect()
    } else {
        request.services
    };

    let data = RenderData {
        template,
        branding,
        company: request.company,
        customer: request.customer,
        quote: request.quote,
        invoice: request.invoice,
        services,
        variables: request.variables,
    };
    render(&data, fetcher, config).await
}
