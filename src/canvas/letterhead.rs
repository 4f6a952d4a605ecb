//! Letterhead canvas: company stationery behind the first page.
//!
//! The letterhead is drawn full-bleed as the first op of page 1, so every
//! block drawn afterwards sits on top of it. Pages added later are blank;
//! the letterhead never repeats.

use std::sync::Arc;

use super::{Canvas, CanvasPage, DrawOp, VectorCanvas};
use crate::image_loader::LoadedImage;

#[derive(Debug, Clone)]
pub struct LetterheadCanvas {
    inner: VectorCanvas,
}

impl LetterheadCanvas {
    pub fn new(width: f64, height: f64, letterhead: Arc<LoadedImage>) -> Self {
        let mut inner = VectorCanvas::new(width, height);
        inner.draw(vec![DrawOp::Image {
            x: 0.0,
            y: 0.0,
            width,
            height,
            image: letterhead,
        }]);
        Self { inner }
    }
}

impl Canvas for LetterheadCanvas {
    fn backend(&self) -> &'static str {
        "letterhead"
    }

    fn page_size(&self) -> (f64, f64) {
        self.inner.page_size()
    }

    fn add_page(&mut self) {
        self.inner.add_page();
    }

    fn draw(&mut self, ops: Vec<DrawOp>) {
        self.inner.draw(ops);
    }

    fn pages(&self) -> &[CanvasPage] {
        self.inner.pages()
    }

    fn into_pages(self: Box<Self>) -> Vec<CanvasPage> {
        Box::new(self.inner).into_pages()
    }
}
