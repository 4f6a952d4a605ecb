//! # PDF Serializer
//!
//! Writes canvas pages as a PDF 1.7 file. The writer builds the object
//! table by hand:
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, pages, streams
//! ...
//! xref                <- byte offset of every object
//! trailer             <- root and info references
//! %%EOF
//! ```
//!
//! Canvas geometry is millimeters from the top-left corner; PDF user space
//! is points from the bottom-left. The conversion happens here and nowhere
//! else. Text is set in the standard Type1 fonts with WinAnsiEncoding, so
//! characters outside Windows-1252 print as `?`.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDateTime;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{CanvasPage, DrawOp};
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::style::Color;
use crate::units::mm_to_pt;

/// Document-level metadata for the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
    pub creation_date: Option<NaiveDateTime>,
}

pub struct PdfWriter {
    compress: bool,
}

/// Tracks allocated PDF objects during writing. Index 0 is the unused
/// free-list head, so an object's index is its object number.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Fonts in resource order: `/F0`, `/F1`, ...
    fonts: Vec<(StandardFont, usize)>,
    /// Images in resource order: `/Im0`, `/Im1`, ...
    images: Vec<(Arc<LoadedImage>, usize)>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn push_stream(&mut self, dict_entries: &str, data: &[u8]) -> usize {
        let mut obj = Vec::with_capacity(data.len() + 64);
        let _ = write!(obj, "<< {} /Length {} >>\nstream\n", dict_entries, data.len());
        obj.extend_from_slice(data);
        obj.extend_from_slice(b"\nendstream");
        self.push(obj)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.fonts.iter().position(|(f, _)| *f == font).unwrap_or(0)
    }

    fn image_index(&self, image: &Arc<LoadedImage>) -> Option<usize> {
        self.images.iter().position(|(i, _)| Arc::ptr_eq(i, image))
    }
}

impl PdfWriter {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    pub fn write(&self, pages: &[CanvasPage], info: &DocumentInfo) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            fonts: Vec::new(),
            images: Vec::new(),
        };

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder);
            let content_id = if self.compress {
                let compressed = compress_to_vec_zlib(&content, 6);
                builder.push_stream("/Filter /FlateDecode", &compressed)
            } else {
                builder.push_stream("", &content)
            };

            let resources = self.build_resources(page, &builder);
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources {} >>",
                mm_to_pt(page.width),
                mm_to_pt(page.height),
                content_id,
                resources
            );
            page_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let info_id = builder.push(Self::build_info(info));
        Self::serialize(&builder, info_id)
    }

    /// One Type1 font object per standard font used, in a stable order.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[CanvasPage]) {
        let mut used: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|p| &p.ops)
            .filter_map(|op| match op {
                DrawOp::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        if used.is_empty() {
            used.insert(StandardFont::Helvetica);
        }

        for font in used {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(dict.into_bytes());
            builder.fonts.push((font, id));
        }
    }

    /// One XObject per distinct image. The same `Arc` drawn on several
    /// pages is embedded once.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[CanvasPage]) {
        for op in pages.iter().flat_map(|p| &p.ops) {
            if let DrawOp::Image { image, .. } = op {
                if builder.image_index(image).is_none() {
                    let id = Self::write_image_xobject(builder, image);
                    builder.images.push((Arc::clone(image), id));
                }
            }
        }
    }

    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        let size = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
            image.width_px, image.height_px
        );
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => builder.push_stream(
                &format!("{} /ColorSpace /{} /Filter /DCTDecode", size, color_space.pdf_name()),
                data,
            ),
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    builder.push_stream(
                        &format!("{} /ColorSpace /DeviceGray /Filter /FlateDecode", size),
                        &compress_to_vec_zlib(alpha, 6),
                    )
                });
                let smask_ref = smask
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                builder.push_stream(
                    &format!("{} /ColorSpace /DeviceRGB /Filter /FlateDecode{}", size, smask_ref),
                    &compress_to_vec_zlib(rgb, 6),
                )
            }
        }
    }

    /// Fonts are shared by every page; images are listed only on the pages
    /// that draw them.
    fn build_resources(&self, page: &CanvasPage, builder: &PdfBuilder) -> String {
        let fonts = builder
            .fonts
            .iter()
            .enumerate()
            .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut used: Vec<usize> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { image, .. } => builder.image_index(image),
                _ => None,
            })
            .collect();
        used.sort_unstable();
        used.dedup();

        if used.is_empty() {
            return format!("<< /Font << {} >> >>", fonts);
        }
        let xobjects = used
            .iter()
            .map(|&i| format!("/Im{} {} 0 R", i, builder.images[i].1))
            .collect::<Vec<_>>()
            .join(" ");
        format!("<< /Font << {} >> /XObject << {} >> >>", fonts, xobjects)
    }

    fn build_content_stream(&self, page: &CanvasPage, builder: &PdfBuilder) -> Vec<u8> {
        let mut stream: Vec<u8> = Vec::new();
        let page_height = mm_to_pt(page.height);
        // Top-left millimeters to bottom-left points.
        let flip = |y_mm: f64| page_height - mm_to_pt(y_mm);

        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    font,
                    size,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "BT\n{}/F{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                        fill_color(color),
                        builder.font_index(*font),
                        size,
                        mm_to_pt(*x),
                        flip(*y)
                    );
                    stream.extend_from_slice(&encode_pdf_string(text));
                    stream.extend_from_slice(b") Tj\nET\n");
                }
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        mm_to_pt(*width),
                        mm_to_pt(*x1),
                        flip(*y1),
                        mm_to_pt(*x2),
                        flip(*y2)
                    );
                }
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{}{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        fill_color(fill),
                        mm_to_pt(*x),
                        flip(y + height),
                        mm_to_pt(*width),
                        mm_to_pt(*height)
                    );
                }
                DrawOp::Image {
                    x,
                    y,
                    width,
                    height,
                    image,
                } => {
                    if let Some(index) = builder.image_index(image) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            mm_to_pt(*width),
                            mm_to_pt(*height),
                            mm_to_pt(*x),
                            flip(y + height),
                            index
                        );
                    }
                }
            }
        }

        stream
    }

    fn build_info(info: &DocumentInfo) -> Vec<u8> {
        let mut dict: Vec<u8> = b"<< ".to_vec();
        if let Some(title) = &info.title {
            dict.extend_from_slice(b"/Title (");
            dict.extend_from_slice(&encode_pdf_string(title));
            dict.extend_from_slice(b") ");
        }
        dict.extend_from_slice(b"/Producer (");
        dict.extend_from_slice(&encode_pdf_string(&info.producer));
        dict.extend_from_slice(b") ");
        if let Some(date) = info.creation_date {
            let _ = write!(dict, "/CreationDate (D:{}) ", date.format("%Y%m%d%H%M%S"));
        }
        dict.extend_from_slice(b">>");
        dict
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        output.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_id,
            xref_offset
        );

        output
    }
}

fn fill_color(color: &Color) -> String {
    format!("{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b)
}

/// WinAnsi bytes for a literal string, with delimiters and control bytes
/// escaped.
fn encode_pdf_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            '\n' | '\r' | '\t' => out.push(b' '),
            _ => out.push(unicode_to_winansi(ch).unwrap_or(b'?')),
        }
    }
    out
}

/// Windows-1252 code for a character, if it has one.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // €
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84), // „
        0x2026 => Some(0x85), // …
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93), // “
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // •
        0x2013 => Some(0x96), // –
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ops: Vec<DrawOp>) -> CanvasPage {
        CanvasPage {
            width: 210.0,
            height: 297.0,
            ops,
        }
    }

    fn text_op(text: &str, font: StandardFont) -> DrawOp {
        DrawOp::Text {
            x: 25.0,
            y: 40.0,
            text: text.to_string(),
            font,
            size: 10.0,
            color: Color::BLACK,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: None,
            producer: "Vorlage".to_string(),
            creation_date: None,
        }
    }

    #[test]
    fn test_empty_document_is_valid() {
        let bytes = PdfWriter::new(true).write(&[page(vec![])], &info());
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_a4_media_box() {
        let bytes = PdfWriter::new(true).write(&[page(vec![])], &info());
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_fonts_registered_per_variant() {
        let pages = vec![page(vec![
            text_op("Angebot", StandardFont::HelveticaBold),
            text_op("Kunde", StandardFont::Helvetica),
        ])];
        let bytes = PdfWriter::new(true).write(&pages, &info());
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold "));
    }

    #[test]
    fn test_text_encoding_and_flip() {
        let pages = vec![page(vec![text_op("€ 5 (netto) • ä", StandardFont::Helvetica)])];
        let bytes = PdfWriter::new(false).write(&pages, &info());
        assert!(contains(&bytes, b"(\x80 5 \\(netto\\) \x95 \xe4) Tj"));
        // 25mm = 70.87pt; 297mm - 40mm = 257mm = 728.50pt
        assert!(contains(&bytes, b"70.87 728.50 Td"));
    }

    #[test]
    fn test_unmappable_characters() {
        assert_eq!(encode_pdf_string("日本"), b"??".to_vec());
        assert_eq!(encode_pdf_string("a\\b"), b"a\\\\b".to_vec());
    }

    #[test]
    fn test_image_embedded_once_with_smask() {
        let image = Arc::new(LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255, 0, 0],
                alpha: Some(vec![128]),
            },
            width_px: 1,
            height_px: 1,
        });
        let draw = |img: &Arc<LoadedImage>| DrawOp::Image {
            x: 0.0,
            y: 0.0,
            width: 210.0,
            height: 297.0,
            image: Arc::clone(img),
        };
        let pages = vec![page(vec![draw(&image)]), page(vec![draw(&image)]), page(vec![])];
        let bytes = PdfWriter::new(false).write(&pages, &info());
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/Subtype /Image").count(), 2);
        assert_eq!(text.matches("/SMask").count(), 1);
        assert_eq!(text.matches("/XObject << /Im0").count(), 2);
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn test_info_dictionary() {
        let info = DocumentInfo {
            title: Some("Angebot (Standard)".to_string()),
            producer: "Vorlage".to_string(),
            creation_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0)),
        };
        let bytes = PdfWriter::new(true).write(&[page(vec![])], &info);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Angebot \\(Standard\\))"));
        assert!(text.contains("/Producer (Vorlage)"));
        assert!(text.contains("/CreationDate (D:20240301093000)"));
        assert!(text.contains("/Info "));
    }
}
