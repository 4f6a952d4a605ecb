//! # Document Compositor
//!
//! Drives one render from template to PDF bytes:
//!
//! 1. **Initialize.** Validate the page settings, resolve branding and
//!    variables, fetch the letterhead, open the canvas. The canvas type is
//!    chosen here and never changes.
//! 2. **Per page.** Page 1 reuses the page the canvas opened with; every
//!    further page present in the template appends one. Blocks render in
//!    sort order, each awaiting its logo fetch before drawing.
//! 3. **Finalize.** Serialize the canvas.
//!
//! Every step checks the current [`Phase`]; calling them out of order is a
//! `Render` error.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::canvas::{Canvas, LetterheadCanvas, VectorCanvas};
use crate::config::RenderConfig;
use crate::error::VorlageError;
use crate::fetch::AssetFetcher;
use crate::font::{FontContext, FontFamily};
use crate::image_loader::{decode_image, LoadedImage};
use crate::layout::{group_by_page, AutoLayout, CascadeLayout};
use crate::model::{BlockType, CompanyBranding, ContentBlock, Namespace, RenderData};
use crate::pdf::{DocumentInfo, PdfWriter};
use crate::render::{render_block, BlockAssets, BlockContext, RenderState};
use crate::style::ResolvedStyle;
use crate::variables::{apply_template_defaults, standard_variables, VariableContext};

/// Where a compositor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    PerPage,
    Finalized,
}

/// Logo fetch outcome, remembered for the rest of the document.
enum LogoSlot {
    NotFetched,
    Loaded(Arc<LoadedImage>),
    Unavailable,
}

pub struct Compositor<'a> {
    phase: Phase,
    data: &'a RenderData,
    fetcher: &'a dyn AssetFetcher,
    config: &'a RenderConfig,
    layout: Box<dyn AutoLayout>,
    now: NaiveDateTime,
    branding: CompanyBranding,
    variables: Namespace,
    defaults: ResolvedStyle,
    fonts: FontContext,
    canvas: Option<Box<dyn Canvas>>,
    logo: LogoSlot,
    state: RenderState,
    pages_started: usize,
}

impl<'a> Compositor<'a> {
    pub fn new(data: &'a RenderData, fetcher: &'a dyn AssetFetcher, config: &'a RenderConfig) -> Self {
        let branding = data
            .branding
            .clone()
            .unwrap_or_else(|| CompanyBranding::fallback(&data.template.company_type));
        Self {
            phase: Phase::Uninitialized,
            data,
            fetcher,
            config,
            layout: Box::new(CascadeLayout),
            now: Local::now().naive_local(),
            defaults: ResolvedStyle::defaults(FontFamily::from_name(&branding.font_family)),
            branding,
            variables: Namespace::new(),
            fonts: FontContext::new(),
            canvas: None,
            logo: LogoSlot::NotFetched,
            state: RenderState::new(1, data.template.page_settings.margins.top),
            pages_started: 0,
        }
    }

    /// Replace the auto-layout policy for blocks without coordinates.
    pub fn with_layout(mut self, layout: Box<dyn AutoLayout>) -> Self {
        self.layout = layout;
        self
    }

    /// Fix the clock used for dates in variables and metadata.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn expect_phase(&self, allowed: &[Phase], action: &str) -> Result<(), VorlageError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(VorlageError::Render(format!(
                "cannot {} while {:?}",
                action, self.phase
            )))
        }
    }

    /// Apply page settings, resolve variables and open the canvas.
    pub async fn initialize(&mut self) -> Result<(), VorlageError> {
        self.expect_phase(&[Phase::Uninitialized], "initialize")?;

        let page = &self.data.template.page_settings;
        page.validate()?;
        let (width, height) = page.dimensions();

        let mut variables = standard_variables(self.data, self.now);
        variables.extend(self.data.variables.clone());
        apply_template_defaults(&mut variables, &self.data.template.variables);
        self.variables = variables;

        let canvas: Box<dyn Canvas> = match self.letterhead().await {
            Some(letterhead) => Box::new(LetterheadCanvas::new(width, height, letterhead)),
            None => Box::new(VectorCanvas::new(width, height)),
        };
        debug!(
            template = %self.data.template.id,
            backend = canvas.backend(),
            width,
            height,
            "canvas initialized"
        );
        self.canvas = Some(canvas);
        self.phase = Phase::Initialized;
        Ok(())
    }

    async fn letterhead(&self) -> Option<Arc<LoadedImage>> {
        let url = self.branding.letterhead()?;
        match self.load_image(url).await {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                warn!(url, error = %e, "letterhead unavailable, rendering without it");
                None
            }
        }
    }

    async fn load_image(&self, url: &str) -> Result<LoadedImage, VorlageError> {
        let bytes = self.fetcher.fetch(url).await?;
        decode_image(&bytes)
    }

    /// The branding logo, fetched on first use.
    async fn logo(&mut self) -> Option<Arc<LoadedImage>> {
        if let LogoSlot::NotFetched = self.logo {
            self.logo = match self.branding.logo() {
                None => LogoSlot::Unavailable,
                Some(url) => match self.load_image(url).await {
                    Ok(image) => LogoSlot::Loaded(Arc::new(image)),
                    Err(e) => {
                        warn!(url, error = %e, "logo unavailable, leaving logo blocks blank");
                        LogoSlot::Unavailable
                    }
                },
            };
        }
        match &self.logo {
            LogoSlot::Loaded(image) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Render one page's blocks. The first call draws on the page the
    /// canvas opened with; later calls append a page first.
    pub async fn render_page(&mut self, page_number: u32, blocks: &[&ContentBlock]) -> Result<(), VorlageError> {
        self.expect_phase(&[Phase::Initialized, Phase::PerPage], "render a page")?;
        let data = self.data;

        if self.pages_started > 0 {
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.add_page();
            }
        }
        self.pages_started += 1;
        self.phase = Phase::PerPage;

        let page = &data.template.page_settings;
        self.state.start_page(page_number, page.margins.top);

        for block in blocks {
            let assets = match block.block_type() {
                Some(BlockType::Logo) => BlockAssets { logo: self.logo().await },
                _ => BlockAssets::default(),
            };

            let mut vars = VariableContext::empty()
                .with_variables(&self.variables)
                .dated(self.now.date());
            if let Some(customer) = &data.customer {
                vars = vars.with_customer(customer);
            }
            if let Some(quote) = &data.quote {
                vars = vars.with_quote(quote);
            }
            if let Some(invoice) = &data.invoice {
                vars = vars.with_invoice(invoice);
            }

            let ctx = BlockContext {
                page,
                variables: &vars,
                company: data.company.as_ref(),
                customer: data.customer.as_ref(),
                services: &data.services,
                defaults: &self.defaults,
                fonts: &self.fonts,
                layout: self.layout.as_ref(),
            };
            let ops = render_block(block, &ctx, &assets, &mut self.state);
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.draw(ops);
            }
        }

        debug!(
            page = page_number,
            blocks = self.state.blocks_drawn,
            extent_mm = self.state.cursor_y,
            "page rendered"
        );
        Ok(())
    }

    /// Serialize the canvas to PDF bytes.
    pub fn finalize(&mut self) -> Result<Vec<u8>, VorlageError> {
        self.expect_phase(&[Phase::Initialized, Phase::PerPage], "finalize")?;
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| VorlageError::Render("canvas missing".to_string()))?;
        let page_count = canvas.page_count();
        let pages = canvas.into_pages();

        let info = DocumentInfo {
            title: Some(self.data.template.name.clone()),
            producer: self.config.producer.clone(),
            creation_date: Some(self.now),
        };
        let bytes = PdfWriter::new(self.config.compress_streams).write(&pages, &info);
        self.phase = Phase::Finalized;

        info!(
            template = %self.data.template.id,
            pages = page_count,
            bytes = bytes.len(),
            "document rendered"
        );
        Ok(bytes)
    }

    /// Run all phases.
    pub async fn run(mut self) -> Result<Vec<u8>, VorlageError> {
        self.initialize().await?;
        let data = self.data;
        for (page_number, blocks) in group_by_page(&data.template.content_blocks) {
            self.render_page(page_number, &blocks).await?;
        }
        self.finalize()
    }

    /// The canvas as drawn so far. `None` before initialization and after
    /// finalization.
    pub fn canvas(&self) -> Option<&dyn Canvas> {
        self.canvas.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoAssets;

    #[async_trait]
    impl AssetFetcher for NoAssets {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, VorlageError> {
            Err(VorlageError::Fetch(format!("{}: unreachable", url)))
        }
    }

    fn data(blocks: serde_json::Value) -> RenderData {
        let template = serde_json::from_value(json!({
            "id": "t1",
            "companyType": "relocato",
            "templateType": "quote",
            "name": "Angebot",
            "pageSettings": { "format": "A4" },
            "contentBlocks": blocks
        }))
        .unwrap();
        RenderData::new(template)
    }

    #[tokio::test]
    async fn test_phases_in_order() {
        let data = data(json!([]));
        let config = RenderConfig::default();
        let mut compositor = Compositor::new(&data, &NoAssets, &config);
        assert_eq!(compositor.phase(), Phase::Uninitialized);
        assert!(compositor.render_page(1, &[]).await.is_err());
        assert!(compositor.finalize().is_err());

        compositor.initialize().await.unwrap();
        assert_eq!(compositor.phase(), Phase::Initialized);
        assert!(compositor.initialize().await.is_err());

        compositor.render_page(1, &[]).await.unwrap();
        assert_eq!(compositor.phase(), Phase::PerPage);

        let bytes = compositor.finalize().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(compositor.phase(), Phase::Finalized);
        assert!(matches!(
            compositor.render_page(2, &[]).await,
            Err(VorlageError::Render(_))
        ));
    }

    #[tokio::test]
    async fn test_pages_follow_groups() {
        let data = data(json!([
            { "blockType": "header", "pageNumber": 3, "content": { "text": "Seite drei" } },
            { "blockType": "header", "pageNumber": 1, "content": { "text": "Seite eins" } }
        ]));
        let config = RenderConfig::default();
        let mut compositor = Compositor::new(&data, &NoAssets, &config);
        compositor.initialize().await.unwrap();
        for (page, blocks) in group_by_page(&data.template.content_blocks) {
            compositor.render_page(page, &blocks).await.unwrap();
        }
        let pages = compositor.canvas().unwrap().pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].ops[0].text(), Some("Seite eins"));
        assert_eq!(pages[1].ops[0].text(), Some("Seite drei"));
    }

    struct Corner;

    impl AutoLayout for Corner {
        fn default_x(&self, _: &ContentBlock, _: &crate::model::PageSettings) -> f64 {
            12.0
        }
        fn default_y(&self, _: &ContentBlock, _: &crate::model::PageSettings) -> f64 {
            34.0
        }
    }

    #[tokio::test]
    async fn test_custom_layout_places_unpositioned_blocks() {
        let data = data(json!([
            { "blockType": "header", "position": 3, "content": { "text": "Ecke" } }
        ]));
        let config = RenderConfig::default();
        let mut compositor = Compositor::new(&data, &NoAssets, &config).with_layout(Box::new(Corner));
        compositor.initialize().await.unwrap();
        for (page, blocks) in group_by_page(&data.template.content_blocks) {
            compositor.render_page(page, &blocks).await.unwrap();
        }
        let ops = &compositor.canvas().unwrap().pages()[0].ops;
        assert!(matches!(
            ops.as_slice(),
            [crate::canvas::DrawOp::Text { x, y, .. }] if (*x, *y) == (12.0, 34.0)
        ));
    }

    #[tokio::test]
    async fn test_invalid_margins_fail_initialization() {
        let mut data = data(json!([]));
        data.template.page_settings.margins.left = 200.0;
        let config = RenderConfig::default();
        let err = Compositor::new(&data, &NoAssets, &config).run().await.unwrap_err();
        assert!(matches!(err, VorlageError::InvalidPageSettings(_)));
    }

    #[tokio::test]
    async fn test_failed_letterhead_falls_back_to_vector() {
        let mut data = data(json!([]));
        let mut branding = CompanyBranding::fallback("relocato");
        branding.letterhead_url = Some("https://example.invalid/briefkopf.png".to_string());
        data.branding = Some(branding);
        let config = RenderConfig::default();
        let mut compositor = Compositor::new(&data, &NoAssets, &config);
        compositor.initialize().await.unwrap();
        assert_eq!(compositor.canvas().unwrap().backend(), "vector");
    }
}
