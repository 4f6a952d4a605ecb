//! Structured error types for the Vorlage rendering engine.
//!
//! Only the fatal causes surface here. Recoverable problems (a logo that
//! fails to download, an unknown block type) are logged and rendering carries
//! on without them.

use thiserror::Error;

/// The unified error type returned by all public Vorlage API functions.
#[derive(Debug, Error)]
pub enum VorlageError {
    /// JSON input failed to parse as a valid render job or template.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The requested template does not exist in the store.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Page settings would produce an empty or negative content area.
    #[error("Invalid page settings: {0}")]
    InvalidPageSettings(String),

    /// An external asset (logo, letterhead) could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image bytes could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Compositing or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for VorlageError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the render job schema. Check field names, block types and page formats.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input: is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VorlageError::Parse { source: e, hint }
    }
}
