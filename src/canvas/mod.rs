//! # Canvas
//!
//! The drawing surface block renderers target. A canvas is a list of pages,
//! each a list of [`DrawOp`]s in millimeters with a top-left origin. Nothing
//! here knows about PDF; the writer converts to points and flips the y axis
//! when it serializes.
//!
//! Two implementations share the [`Canvas`] trait. [`VectorCanvas`] is the
//! default. [`LetterheadCanvas`](letterhead::LetterheadCanvas) composites a
//! full-page raster behind the first page and otherwise behaves the same.
//! The compositor picks one when it initializes and never switches.

pub mod letterhead;

use std::sync::Arc;

use crate::font::StandardFont;
use crate::image_loader::LoadedImage;
use crate::style::Color;

pub use letterhead::LetterheadCanvas;

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A run of text with its baseline at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: StandardFont,
        size: f64,
        color: Color,
    },
    /// A straight stroke.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        /// Stroke width in millimeters.
        width: f64,
        color: Color,
    },
    /// A filled rectangle. `y` is the top edge.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
    },
    /// A raster image scaled into the box. `y` is the top edge.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: Arc<LoadedImage>,
    },
}

impl DrawOp {
    /// The text of a `Text` op.
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// One physical page of a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasPage {
    /// Millimeters.
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// A multi-page drawing surface. Ops always land on the last page.
pub trait Canvas: Send + Sync {
    /// Short name for logging.
    fn backend(&self) -> &'static str;

    /// Page size in millimeters. Every page of a canvas shares it.
    fn page_size(&self) -> (f64, f64);

    /// Append a blank page and make it current.
    fn add_page(&mut self);

    fn draw(&mut self, ops: Vec<DrawOp>);

    fn pages(&self) -> &[CanvasPage];

    fn into_pages(self: Box<Self>) -> Vec<CanvasPage>;

    fn page_count(&self) -> usize {
        self.pages().len()
    }
}

/// Plain vector canvas. Opens with one blank page.
#[derive(Debug, Clone)]
pub struct VectorCanvas {
    width: f64,
    height: f64,
    pages: Vec<CanvasPage>,
}

impl VectorCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        let mut canvas = Self {
            width,
            height,
            pages: Vec::new(),
        };
        canvas.add_page();
        canvas
    }
}

impl Canvas for VectorCanvas {
    fn backend(&self) -> &'static str {
        "vector"
    }

    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn add_page(&mut self) {
        self.pages.push(CanvasPage {
            width: self.width,
            height: self.height,
            ops: Vec::new(),
        });
    }

    fn draw(&mut self, ops: Vec<DrawOp>) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.extend(ops);
        }
    }

    fn pages(&self) -> &[CanvasPage] {
        &self.pages
    }

    fn into_pages(self: Box<Self>) -> Vec<CanvasPage> {
        self.pages
    }
}
