//! # Asset Fetching
//!
//! Logos and letterheads are referenced by URL in the company branding.
//! [`AssetFetcher`] is the seam the compositor awaits on; [`HttpFetcher`] is
//! the production implementation. Besides `http(s)://` it serves `data:`
//! URIs (what the template editor stores for uploaded images) and local
//! file paths (what the CLI is usually given).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use crate::config::RenderConfig;
use crate::error::VorlageError;

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Raw bytes behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, VorlageError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &RenderConfig) -> Result<Self, VorlageError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| VorlageError::Fetch(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, VorlageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VorlageError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VorlageError::Fetch(format!("{}: HTTP {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VorlageError::Fetch(format!("{}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, VorlageError> {
        let url = url.trim();
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_http(url).await;
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        tokio::fs::read(path)
            .await
            .map_err(|e| VorlageError::Fetch(format!("cannot read {}: {}", path, e)))
    }
}

/// Payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, VorlageError> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| VorlageError::Fetch("invalid data URI: missing comma".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(VorlageError::Fetch(
            "only base64 data URIs are supported".to_string(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| VorlageError::Fetch(format!("invalid base64 in data URI: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let bytes = decode_data_uri("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_data_uri_errors() {
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let fetcher = HttpFetcher::new(&RenderConfig::default()).unwrap();
        let err = fetcher.fetch("/nonexistent/logo.png").await.unwrap_err();
        assert!(matches!(err, VorlageError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_local_file() {
        let path = std::env::temp_dir().join(format!("vorlage-fetch-{}.bin", std::process::id()));
        std::fs::write(&path, b"logo").unwrap();
        let fetcher = HttpFetcher::new(&RenderConfig::default()).unwrap();
        let bytes = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"logo");
        std::fs::remove_file(path).unwrap();
    }
}
