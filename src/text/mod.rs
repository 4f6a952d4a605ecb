//! # Text Layout
//!
//! Greedy word wrapping against the standard font metrics. Block text only
//! ever wraps within its own block width; it never flows to another block or
//! page.

use crate::font::{FontContext, StandardFont};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in millimeters, trailing spaces excluded.
    pub width: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width` millimeters.
    ///
    /// Explicit newlines always break. Lines break at spaces when possible;
    /// a single word wider than the block is split at the last character
    /// that fits. An empty string yields one empty line.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font: StandardFont,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let paragraph = paragraph.trim_end_matches('\r');
            self.break_paragraph(font_context, paragraph, max_width, font, font_size, &mut lines);
        }
        lines
    }

    fn break_paragraph(
        &self,
        font_context: &FontContext,
        paragraph: &str,
        max_width: f64,
        font: StandardFont,
        font_size: f64,
        lines: &mut Vec<BrokenLine>,
    ) {
        let measure = |s: &str| font_context.measure_mm(s, font, font_size);

        if paragraph.trim().is_empty() {
            lines.push(BrokenLine {
                text: String::new(),
                width: 0.0,
            });
            return;
        }

        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                let width = measure(&current);
                lines.push(BrokenLine {
                    text: std::mem::take(&mut current),
                    width,
                });
            }

            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                // Word alone is too wide: hard-split it.
                let mut chunk = String::new();
                for ch in word.chars() {
                    let mut next = chunk.clone();
                    next.push(ch);
                    if measure(&next) > max_width && !chunk.is_empty() {
                        let width = measure(&chunk);
                        lines.push(BrokenLine {
                            text: std::mem::take(&mut chunk),
                            width,
                        });
                        chunk.push(ch);
                    } else {
                        chunk = next;
                    }
                }
                current = chunk;
            }
        }

        if !current.is_empty() {
            let width = measure(&current);
            lines.push(BrokenLine {
                text: current,
                width,
            });
        }
    }
}
