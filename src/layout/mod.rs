//! # Page Grouping & Block Placement
//!
//! Templates are page-addressed, not flowed. Every block names its page and
//! its sort position on that page, and either carries explicit millimeter
//! coordinates (placed by hand in the editor) or falls back to an
//! [`AutoLayout`] policy.
//!
//! The grouping step never moves blocks between pages and never creates
//! pages for content that overflows. A block that runs past the bottom of
//! its page is clipped by the viewer at the media box.

use std::collections::BTreeMap;

use crate::model::{BlockType, ContentBlock, PageSettings};

/// Blocks of one template keyed by page number, each page's blocks in
/// render order.
pub type PageGroups<'a> = BTreeMap<u32, Vec<&'a ContentBlock>>;

/// Group visible blocks by page and sort each page by `position`.
///
/// The sort is stable, so blocks sharing a position keep their array order.
/// Page number 0 is treated as page 1. Page 1 is always present, even when
/// it has no blocks, because it is the page the canvas opens with.
pub fn group_by_page(blocks: &[ContentBlock]) -> PageGroups<'_> {
    let mut pages: PageGroups<'_> = BTreeMap::new();
    pages.insert(1, Vec::new());

    for block in blocks.iter().filter(|b| b.is_visible) {
        pages.entry(block.page()).or_default().push(block);
    }
    for group in pages.values_mut() {
        group.sort_by_key(|b| b.position);
    }
    pages
}

/// Where a block without hand-placed coordinates goes.
pub trait AutoLayout: Send + Sync {
    fn default_x(&self, block: &ContentBlock, page: &PageSettings) -> f64;
    fn default_y(&self, block: &ContentBlock, page: &PageSettings) -> f64;
}

/// Blocks cascade down the page by sort position: left margin,
/// `position * 50 + 20` millimeters from the top.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeLayout;

impl CascadeLayout {
    pub const STEP: f64 = 50.0;
    pub const OFFSET: f64 = 20.0;
}

impl AutoLayout for CascadeLayout {
    fn default_x(&self, _block: &ContentBlock, page: &PageSettings) -> f64 {
        page.margins.left
    }

    fn default_y(&self, block: &ContentBlock, _page: &PageSettings) -> f64 {
        block.position as f64 * Self::STEP + Self::OFFSET
    }
}

/// Default logo box edge, in millimeters.
pub const LOGO_SIZE: f64 = 50.0;

/// A block's rectangle in page millimeters, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// `None` when the block grows with its content.
    pub height: Option<f64>,
}

/// Resolve a block's rectangle.
///
/// Explicit coordinates are used as given, including `0` and values that
/// leave the page. Each missing axis is filled in from the policy. Width
/// defaults to the content width. A logo with neither width nor height gets
/// a 50×50 box; a logo with only a width keeps the image's aspect ratio.
pub fn resolve_rect(block: &ContentBlock, page: &PageSettings, policy: &dyn AutoLayout) -> BlockRect {
    let x = block
        .x_position
        .unwrap_or_else(|| policy.default_x(block, page));
    let y = block
        .y_position
        .unwrap_or_else(|| policy.default_y(block, page));

    let is_logo = block.block_type() == Some(BlockType::Logo);
    let width = block.width.unwrap_or(if is_logo {
        LOGO_SIZE
    } else {
        page.content_width()
    });
    let height = block
        .height
        .or((is_logo && block.width.is_none()).then_some(LOGO_SIZE));

    BlockRect { x, y, width, height }
}
