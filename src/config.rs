//! Renderer configuration.
//!
//! Everything has a default, so an empty JSON object (or no config file at
//! all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VorlageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Per-request timeout for logo and letterhead downloads.
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Written to the PDF Info dictionary.
    pub producer: String,
    /// Deflate page content streams.
    pub compress_streams: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 15,
            user_agent: format!("vorlage/{}", env!("CARGO_PKG_VERSION")),
            producer: "Vorlage".to_string(),
            compress_streams: true,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, VorlageError> {
        serde_json::from_str(json).map_err(|e| VorlageError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VorlageError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VorlageError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = RenderConfig::from_json(r#"{"httpTimeoutSecs": 3, "compressStreams": false}"#)
            .unwrap();
        assert_eq!(config.http_timeout_secs, 3);
        assert!(!config.compress_streams);
        assert_eq!(config.producer, "Vorlage");
        assert!(config.user_agent.starts_with("vorlage/"));
    }

    #[test]
    fn test_bad_config_is_config_error() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"httpTimeoutSecs": "soon"}"#),
            Err(VorlageError::Config(_))
        ));
        assert!(matches!(
            RenderConfig::from_path("/nonexistent/vorlage.json"),
            Err(VorlageError::Config(_))
        ));
    }
}
