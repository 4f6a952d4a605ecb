//! # Block Rendering
//!
//! Turns one content block into draw ops. Rendering is pure: everything a
//! renderer may read arrives in [`BlockContext`] (document-wide data) and
//! [`BlockAssets`] (images the compositor already fetched), and the only
//! thing it may change besides its return value is the [`RenderState`] it is
//! handed.
//!
//! Each block resolves its own style from its settings against the document
//! defaults. Nothing carries over from the previous block.

mod info;
mod pricing;
mod signature;
mod text;

use std::sync::Arc;

use tracing::debug;

use crate::canvas::DrawOp;
use crate::font::{FontContext, StandardFont};
use crate::image_loader::LoadedImage;
use crate::layout::{resolve_rect, AutoLayout, BlockRect};
use crate::model::{BlockContent, CompanyDetails, ContentBlock, Namespace, PageSettings, ServiceLine};
use crate::style::{Color, ResolvedStyle, TextAlign};
use crate::text::TextLayout;
use crate::units::pt_to_mm;
use crate::variables::VariableContext;

/// Document-wide inputs shared by every block of a render.
pub struct BlockContext<'a> {
    pub page: &'a PageSettings,
    pub variables: &'a VariableContext<'a>,
    pub company: Option<&'a CompanyDetails>,
    pub customer: Option<&'a Namespace>,
    /// Services listed by `service_list` blocks that carry none themselves.
    pub services: &'a [ServiceLine],
    pub defaults: &'a ResolvedStyle,
    pub fonts: &'a FontContext,
    pub layout: &'a dyn AutoLayout,
}

/// Pre-fetched images for the block being rendered.
#[derive(Debug, Clone, Default)]
pub struct BlockAssets {
    /// `None` when there is no logo or it failed to load.
    pub logo: Option<Arc<LoadedImage>>,
}

/// Progress through the current page, threaded through every block render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub page_number: u32,
    /// Lowest point drawn on this page so far, in millimeters from the top.
    /// Informational: blocks are placed by their own rects, not by this
    /// cursor. The compositor logs it per page.
    pub cursor_y: f64,
    /// Blocks that produced at least one op on this page.
    pub blocks_drawn: usize,
}

impl RenderState {
    pub fn new(page_number: u32, top_margin: f64) -> Self {
        Self {
            page_number,
            cursor_y: top_margin,
            blocks_drawn: 0,
        }
    }

    /// Reset for the next physical page.
    pub fn start_page(&mut self, page_number: u32, top_margin: f64) {
        *self = Self::new(page_number, top_margin);
    }
}

/// Render one block. Unknown block types render nothing.
pub fn render_block(
    block: &ContentBlock,
    ctx: &BlockContext<'_>,
    assets: &BlockAssets,
    state: &mut RenderState,
) -> Vec<DrawOp> {
    let rect = resolve_rect(block, ctx.page, ctx.layout);
    let style = block.settings.resolve(ctx.defaults);
    let mut painter = Painter::new(ctx.fonts, rect, style);

    match &block.content {
        BlockContent::Header(c) | BlockContent::Custom(c) => text::render_text(&mut painter, ctx, c),
        BlockContent::Footer(c) => text::render_footer(&mut painter, ctx, c),
        BlockContent::Terms(c) => text::render_terms(&mut painter, ctx, c),
        BlockContent::Logo => signature::render_logo(&mut painter, assets),
        BlockContent::CompanyInfo(c) => info::render_company_info(&mut painter, ctx, c),
        BlockContent::CustomerInfo(c) => info::render_customer_info(&mut painter, ctx, c),
        BlockContent::ServiceList(c) => info::render_service_list(&mut painter, ctx, c),
        BlockContent::PricingTable(c) => pricing::render_pricing_table(&mut painter, c),
        BlockContent::Signature(c) => signature::render_signature(&mut painter, c),
        BlockContent::Unknown { block_type, .. } => {
            debug!(block = %block.id, block_type = %block_type, "skipping unknown block type");
        }
    }

    let ops = painter.finish(state);
    debug!(
        block = %block.id,
        block_type = block.type_name(),
        page = state.page_number,
        ops = ops.len(),
        "rendered block"
    );
    ops
}

/// Draw-op builder for one block.
///
/// Tracks the vertical extent of what was drawn so the background fill and
/// the render state's cursor can be derived once the block is done.
pub(crate) struct Painter<'a> {
    fonts: &'a FontContext,
    layout: TextLayout,
    pub rect: BlockRect,
    pub style: ResolvedStyle,
    ops: Vec<DrawOp>,
    top: f64,
    bottom: f64,
}

/// Baseline-to-top and baseline-to-bottom of a line, as fractions of the
/// font size. Close enough for the standard fonts.
const ASCENT: f64 = 0.8;
const DESCENT: f64 = 0.25;

impl<'a> Painter<'a> {
    fn new(fonts: &'a FontContext, rect: BlockRect, style: ResolvedStyle) -> Self {
        Self {
            fonts,
            layout: TextLayout::new(),
            rect,
            style,
            ops: Vec::new(),
            top: f64::INFINITY,
            bottom: f64::NEG_INFINITY,
        }
    }

    fn font(style: &ResolvedStyle) -> StandardFont {
        StandardFont::select(style.family, style.bold, style.italic)
    }

    fn extend(&mut self, top: f64, bottom: f64) {
        self.top = self.top.min(top);
        self.bottom = self.bottom.max(bottom);
    }

    pub fn measure(&self, text: &str, style: &ResolvedStyle) -> f64 {
        self.fonts.measure_mm(text, Self::font(style), style.font_size)
    }

    /// Place `text` with its baseline at `y`, aligned against `anchor_x`:
    /// left edge, center or right edge depending on `align`.
    pub fn text_at(&mut self, text: &str, anchor_x: f64, y: f64, align: TextAlign, style: &ResolvedStyle) {
        if text.is_empty() {
            return;
        }
        let width = self.measure(text, style);
        let x = match align {
            TextAlign::Left => anchor_x,
            TextAlign::Center => anchor_x - width / 2.0,
            TextAlign::Right => anchor_x - width,
        };
        let size_mm = pt_to_mm(style.font_size);
        self.extend(y - size_mm * ASCENT, y + size_mm * DESCENT);
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: Self::font(style),
            size: style.font_size,
            color: style.color,
        });
    }

    /// Word-wrap `text` into the column `[x, x + width]`, one line every
    /// `pitch` millimeters starting at baseline `y`, aligned per the block
    /// style. Returns the baseline after the last line.
    pub fn wrapped(&mut self, text: &str, x: f64, y: f64, width: f64, pitch: f64, style: &ResolvedStyle) -> f64 {
        let align = self.style.align;
        self.wrapped_aligned(text, x, y, width, pitch, align, style)
    }

    /// [`Painter::wrapped`] with an explicit alignment.
    #[allow(clippy::too_many_arguments)]
    pub fn wrapped_aligned(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        pitch: f64,
        align: TextAlign,
        style: &ResolvedStyle,
    ) -> f64 {
        let lines = self.layout.break_into_lines(
            self.fonts,
            text,
            width,
            Self::font(style),
            style.font_size,
        );
        let anchor = match align {
            TextAlign::Left => x,
            TextAlign::Center => x + width / 2.0,
            TextAlign::Right => x + width,
        };
        let mut baseline = y;
        for line in lines {
            self.text_at(&line.text, anchor, baseline, align, style);
            baseline += pitch;
        }
        baseline
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) {
        self.extend(y1.min(y2) - width / 2.0, y1.max(y2) + width / 2.0);
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color: self.style.color,
        });
    }

    pub fn fill(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Color) {
        self.extend(y, y + height);
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }

    pub fn image(&mut self, image: Arc<LoadedImage>, x: f64, y: f64, width: f64, height: f64) {
        self.extend(y, y + height);
        self.ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            image,
        });
    }

    /// Line pitch for the given base spacing, widened for large fonts.
    pub fn pitch(&self, base: f64, style: &ResolvedStyle) -> f64 {
        base.max(pt_to_mm(style.font_size) * 1.15)
    }

    /// Emit the ops, background first, and advance the render state.
    fn finish(self, state: &mut RenderState) -> Vec<DrawOp> {
        if self.ops.is_empty() {
            return self.ops;
        }
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        if let Some(background) = self.style.background {
            let top = self.top.min(self.rect.y);
            let height = self
                .rect
                .height
                .unwrap_or(self.bottom - top)
                .max(0.0);
            ops.push(DrawOp::Rect {
                x: self.rect.x,
                y: top,
                width: self.rect.width,
                height,
                fill: background,
            });
        }
        ops.extend(self.ops);
        state.cursor_y = state.cursor_y.max(self.bottom);
        state.blocks_drawn += 1;
        ops
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::font::FontFamily;
    use crate::layout::CascadeLayout;
    use crate::model::{SignatureContent, TextContent};
    use crate::style::BlockSettings;

    /// Owned inputs for a [`BlockContext`] in tests.
    pub(crate) struct Fixture {
        pub page: PageSettings,
        pub customer: Option<Namespace>,
        pub company: Option<CompanyDetails>,
        pub services: Vec<ServiceLine>,
        pub defaults: ResolvedStyle,
        pub fonts: FontContext,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                page: PageSettings::default(),
                customer: None,
                company: None,
                services: Vec::new(),
                defaults: ResolvedStyle::defaults(FontFamily::Helvetica),
                fonts: FontContext::new(),
            }
        }

        pub fn render(&self, block: &ContentBlock, assets: &BlockAssets) -> Vec<DrawOp> {
            let mut vars = VariableContext::empty();
            if let Some(customer) = &self.customer {
                vars = vars.with_customer(customer);
            }
            let ctx = BlockContext {
                page: &self.page,
                variables: &vars,
                company: self.company.as_ref(),
                customer: self.customer.as_ref(),
                services: &self.services,
                defaults: &self.defaults,
                fonts: &self.fonts,
                layout: &CascadeLayout,
            };
            let mut state = RenderState::new(1, self.page.margins.top);
            render_block(block, &ctx, assets, &mut state)
        }
    }

    pub(crate) fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter().filter_map(DrawOp::text).collect()
    }

    pub(crate) fn placed(content: BlockContent) -> ContentBlock {
        let mut block = ContentBlock::new("b", 1, 0, content);
        block.x_position = Some(20.0);
        block.y_position = Some(40.0);
        block
    }

    #[test]
    fn test_unknown_block_renders_nothing() {
        let block = placed(BlockContent::Unknown {
            block_type: "qr_code".to_string(),
            raw: serde_json::Value::Null,
        });
        let fx = Fixture::new();
        assert!(fx.render(&block, &BlockAssets::default()).is_empty());
    }

    #[test]
    fn test_background_fill_comes_first() {
        let mut block = placed(BlockContent::Header(TextContent {
            template: Some("Angebot".to_string()),
            text: None,
        }));
        block.settings = BlockSettings {
            background_color: Some("#eeeeee".to_string()),
            ..Default::default()
        };
        let ops = Fixture::new().render(&block, &BlockAssets::default());
        assert_eq!(ops.len(), 2);
        match &ops[0] {
            DrawOp::Rect { x, width, fill, .. } => {
                assert_eq!(*x, 20.0);
                assert_eq!(*width, 160.0);
                assert_eq!(*fill, Color::rgb8(0xee, 0xee, 0xee));
            }
            other => panic!("expected background rect, got {:?}", other),
        }
    }

    #[test]
    fn test_state_tracks_lowest_point() {
        let block = placed(BlockContent::Signature(SignatureContent::default()));
        let fx = Fixture::new();
        let vars = VariableContext::empty();
        let ctx = BlockContext {
            page: &fx.page,
            variables: &vars,
            company: None,
            customer: None,
            services: &[],
            defaults: &fx.defaults,
            fonts: &fx.fonts,
            layout: &CascadeLayout,
        };
        let mut state = RenderState::new(1, 25.0);
        render_block(&block, &ctx, &BlockAssets::default(), &mut state);
        assert!(state.cursor_y > 75.0);
        assert_eq!(state.blocks_drawn, 1);
    }

    #[test]
    fn test_right_alignment() {
        let mut block = placed(BlockContent::Header(TextContent {
            template: Some("Rechnung".to_string()),
            text: None,
        }));
        block.settings.alignment = Some(TextAlign::Right);
        let fx = Fixture::new();
        let ops = fx.render(&block, &BlockAssets::default());
        let width = fx.fonts.measure_mm("Rechnung", StandardFont::Helvetica, 10.0);
        match &ops[0] {
            DrawOp::Text { x, .. } => assert!((x + width - 180.0).abs() < 1e-9),
            other => panic!("expected text, got {:?}", other),
        }
    }
}
