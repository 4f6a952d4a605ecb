//! Integration tests for the Vorlage rendering pipeline.
//!
//! These tests drive the full path from template JSON and business data to
//! PDF bytes, with images served from memory instead of the network.
//! They verify:
//! - Page size follows the page settings
//! - Blocks land on their pages in position order
//! - Variables are substituted in the output
//! - Invisible blocks and failed images never reach the document
//! - The store-backed `generate` entry point

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use vorlage::canvas::{CanvasPage, DrawOp};
use vorlage::compositor::Compositor;
use vorlage::config::RenderConfig;
use vorlage::error::VorlageError;
use vorlage::fetch::AssetFetcher;
use vorlage::layout::group_by_page;
use vorlage::model::{CompanyBranding, LineItem, RenderData, ServiceCatalogItem, Template};
use vorlage::pricing::{PricingSummary, VAT_RATE};
use vorlage::store::{MemoryStore, TemplateStore};
use vorlage::GenerateRequest;

// ─── Helpers ────────────────────────────────────────────────────

/// Serves registered URLs from memory; everything else fails.
#[derive(Default)]
struct MemoryFetcher {
    assets: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(url.to_string(), bytes);
        self
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, VorlageError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| VorlageError::Fetch(format!("{}: connection refused", url)))
    }
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 30, 30]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgb8)
        .unwrap();
    buf
}

fn template(blocks: Value) -> Template {
    serde_json::from_value(json!({
        "id": "tpl-angebot",
        "companyType": "relocato",
        "templateType": "quote",
        "name": "Umzugsangebot",
        "pageSettings": {
            "format": "A4",
            "orientation": "portrait",
            "margins": { "top": 25, "right": 25, "bottom": 25, "left": 25 }
        },
        "contentBlocks": blocks
    }))
    .unwrap()
}

fn text_block(id: &str, page: u32, position: i32, text: &str) -> Value {
    json!({
        "id": id,
        "blockType": "header",
        "position": position,
        "pageNumber": page,
        "xPosition": 25,
        "yPosition": 30,
        "content": { "text": text }
    })
}

fn plain_config() -> RenderConfig {
    RenderConfig {
        compress_streams: false,
        ..RenderConfig::default()
    }
}

/// Pages as drawn, captured just before serialization.
async fn draw(data: &RenderData, fetcher: &dyn AssetFetcher) -> Vec<CanvasPage> {
    let config = plain_config();
    let mut compositor = Compositor::new(data, fetcher, &config);
    compositor.initialize().await.unwrap();
    for (page, blocks) in group_by_page(&data.template.content_blocks) {
        compositor.render_page(page, &blocks).await.unwrap();
    }
    compositor.canvas().unwrap().pages().to_vec()
}

fn page_texts(page: &CanvasPage) -> Vec<&str> {
    page.ops.iter().filter_map(DrawOp::text).collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(contains(bytes, b"xref"), "Missing xref table");
    assert!(contains(bytes, b"trailer"), "Missing trailer");
    assert!(contains(bytes, b"%%EOF"), "Missing %%EOF marker");
}

// ─── Pipeline ───────────────────────────────────────────────────

#[tokio::test]
async fn test_a4_page_regardless_of_content() {
    let fetcher = MemoryFetcher::default();
    for blocks in [json!([]), json!([text_block("h", 1, 0, "Angebot")])] {
        let data = RenderData::new(template(blocks));
        let pdf = vorlage::render(&data, &fetcher, &plain_config()).await.unwrap();
        assert_valid_pdf(&pdf);
        assert!(contains(&pdf, b"/MediaBox [0 0 595.28 841.89]"));
    }
}

#[tokio::test]
async fn test_blocks_follow_page_and_position() {
    let data = RenderData::new(template(json!([
        text_block("c", 2, 1, "Seite 2"),
        text_block("b", 1, 5, "Zweiter"),
        text_block("a", 1, 0, "Erster"),
    ])));
    let pages = draw(&data, &MemoryFetcher::default()).await;
    assert_eq!(pages.len(), 2);
    assert_eq!(page_texts(&pages[0]), vec!["Erster", "Zweiter"]);
    assert_eq!(page_texts(&pages[1]), vec!["Seite 2"]);
}

#[tokio::test]
async fn test_variables_substituted_in_pdf() {
    let mut data = RenderData::new(template(json!([text_block(
        "h",
        1,
        0,
        "Hallo {{customer.name}}, Betrag {{quote.total}}{{customer.phone}}"
    )])));
    data.customer = json!({ "name": "Max" }).as_object().cloned();
    data.quote = json!({ "total": 100 }).as_object().cloned();

    let pdf = vorlage::render(&data, &MemoryFetcher::default(), &plain_config())
        .await
        .unwrap();
    assert!(contains(&pdf, b"(Hallo Max, Betrag 100) Tj"));
    assert!(!contains(&pdf, b"{{"));
}

#[tokio::test]
async fn test_invisible_block_never_drawn() {
    let mut hidden = text_block("h", 1, 1, "Geheim");
    hidden["isVisible"] = json!(false);
    let data = RenderData::new(template(json!([text_block("v", 1, 0, "Sichtbar"), hidden])));

    let pages = draw(&data, &MemoryFetcher::default()).await;
    assert_eq!(page_texts(&pages[0]), vec!["Sichtbar"]);

    let pdf = vorlage::render(&data, &MemoryFetcher::default(), &plain_config())
        .await
        .unwrap();
    assert!(!contains(&pdf, b"Geheim"));
}

#[tokio::test]
async fn test_unknown_block_type_is_skipped() {
    let data = RenderData::new(template(json!([
        { "blockType": "qr_code", "position": 0, "content": { "data": "x" } },
        text_block("h", 1, 1, "Weiter")
    ])));
    let pages = draw(&data, &MemoryFetcher::default()).await;
    assert_eq!(page_texts(&pages[0]), vec!["Weiter"]);
}

// ─── Images ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_logo_leaves_area_blank() {
    let mut data = RenderData::new(template(json!([
        { "id": "logo", "blockType": "logo", "position": 0, "xPosition": 25, "yPosition": 25 },
        { "id": "logo2", "blockType": "logo", "position": 1, "pageNumber": 2 },
        text_block("h", 1, 2, "Angebot")
    ])));
    let mut branding = CompanyBranding::fallback("relocato");
    branding.logo_url = Some("https://cdn.example.com/logo.png".to_string());
    data.branding = Some(branding);

    let fetcher = MemoryFetcher::default();
    let pdf = vorlage::render(&data, &fetcher, &plain_config()).await.unwrap();
    assert_valid_pdf(&pdf);
    assert!(!contains(&pdf, b"/Subtype /Image"));
    // One failed attempt serves every logo block of the document.
    assert_eq!(fetcher.requests(), 1);
}

#[tokio::test]
async fn test_logo_drawn_when_fetched() {
    let mut data = RenderData::new(template(json!([
        { "id": "logo", "blockType": "logo", "position": 0, "xPosition": 25, "yPosition": 25, "width": 40 }
    ])));
    let mut branding = CompanyBranding::fallback("relocato");
    branding.logo_url = Some("https://cdn.example.com/logo.png".to_string());
    data.branding = Some(branding);

    let fetcher = MemoryFetcher::default().with("https://cdn.example.com/logo.png", png(4, 2));
    let pages = draw(&data, &fetcher).await;
    match pages[0].ops.as_slice() {
        [DrawOp::Image { width, height, .. }] => assert_eq!((*width, *height), (40.0, 20.0)),
        other => panic!("expected one logo image, got {:?}", other),
    }
}

#[tokio::test]
async fn test_letterhead_only_behind_first_page() {
    let mut data = RenderData::new(template(json!([
        text_block("a", 1, 0, "Seite 1"),
        text_block("b", 2, 0, "Seite 2"),
    ])));
    let mut branding = CompanyBranding::fallback("relocato");
    branding.letterhead_url = Some("https://cdn.example.com/briefkopf.png".to_string());
    data.branding = Some(branding);

    let fetcher =
        MemoryFetcher::default().with("https://cdn.example.com/briefkopf.png", png(21, 29));
    let pages = draw(&data, &fetcher).await;
    assert_eq!(pages.len(), 2);
    assert!(matches!(
        pages[0].ops.first(),
        Some(DrawOp::Image { x, y, width, height, .. })
            if (*x, *y, *width, *height) == (0.0, 0.0, 210.0, 297.0)
    ));
    assert!(!pages[1].ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));

    let pdf = vorlage::render(&data, &fetcher, &plain_config()).await.unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert_eq!(text.matches("/Im0 Do").count(), 1);
}

// ─── Errors ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_margins_rejected() {
    let mut data = RenderData::new(template(json!([])));
    data.template.page_settings.margins.top = 150.0;
    data.template.page_settings.margins.bottom = 150.0;
    let err = vorlage::render(&data, &MemoryFetcher::default(), &plain_config())
        .await
        .unwrap_err();
    assert!(matches!(err, VorlageError::InvalidPageSettings(_)));
}

#[tokio::test]
async fn test_render_json_reports_parse_errors() {
    let err = vorlage::render_json("{\"template\": ", &MemoryFetcher::default(), &plain_config())
        .await
        .unwrap_err();
    assert!(matches!(err, VorlageError::Parse { .. }));
}

// ─── Store ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_unknown_template() {
    let store = MemoryStore::new();
    let request = GenerateRequest {
        template_id: "fehlt".to_string(),
        ..GenerateRequest::default()
    };
    let err = vorlage::generate(&store, &MemoryFetcher::default(), &plain_config(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, VorlageError::TemplateNotFound(id) if id == "fehlt"));
}

#[tokio::test]
async fn test_generate_lists_catalog_services() {
    let store = MemoryStore::new();
    store
        .save_template(template(json!([
            { "id": "s", "blockType": "service_list", "position": 0,
              "xPosition": 25, "yPosition": 40, "content": { "title": "Leistungen" } }
        ])))
        .await
        .unwrap();
    store
        .save_service(ServiceCatalogItem {
            company_type: "relocato".to_string(),
            service_code: "PACK".to_string(),
            service_name: "Packservice".to_string(),
            description: None,
            unit: "Stunden".to_string(),
            base_price: 45.0,
            category: "arbeit".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    let request: GenerateRequest = serde_json::from_value(json!({
        "templateId": "tpl-angebot",
        "customer": { "name": "Max" }
    }))
    .unwrap();
    let pdf = vorlage::generate(&store, &MemoryFetcher::default(), &plain_config(), request)
        .await
        .unwrap();
    assert_valid_pdf(&pdf);
    assert!(contains(&pdf, b"Leistungen"));
    assert!(contains(&pdf, b"Packservice"));
}

// ─── Pricing ────────────────────────────────────────────────────

#[test]
fn test_total_is_subtotal_plus_vat() {
    let lists = [
        vec![],
        vec![LineItem::new("Umzug", Some(1.0), 1200.0)],
        vec![
            LineItem::new("Kartons", Some(30.0), 59.7),
            LineItem::new("Halteverbot", None, 0.33),
            LineItem::new("Rabatt", None, -100.0),
        ],
    ];
    for items in lists {
        let summary = PricingSummary::compute(&items);
        let expected = summary.subtotal + summary.subtotal * VAT_RATE;
        assert!((summary.total - expected).abs() < 0.01);
    }
}
