use async_trait::async_trait;
use reqwest::{Client, Response, redirect};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::decompression::{CompressionFormat, DecompressionService};
use crate::utils::url::UrlUtils;

/// HTTP client that transparently decompresses every payload it fetches
#[async_trait]
pub trait DecompressingHttpClient: Send + Sync {
    /// Fetch URL and return raw decompressed bytes
    async fn fetch_bytes(&self, url: &str) -> SourceResult<Vec<u8>>;

    /// Fetch URL with extra headers and query parameters
    async fn fetch_bytes_with(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> SourceResult<Vec<u8>>;

    /// Fetch URL and return decompressed UTF-8 text
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|e| SourceError::parse(format!("invalid UTF-8: {e}")))
    }
}

/// Decode a fetched JSON payload
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> SourceResult<T> {
    serde_json::from_slice(bytes).map_err(|e| SourceError::parse(format!("invalid JSON: {e}")))
}

/// Default implementation of DecompressingHttpClient using reqwest
pub struct StandardHttpClient {
    client: Client,
    max_redirects: usize,
}

impl StandardHttpClient {
    /// Build a client with the configured timeouts, user agent and redirect limit
    pub fn from_config(config: &UpstreamConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    async fn process_response_to_bytes(response: Response, url: &str) -> SourceResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: UrlUtils::without_query(url).to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| SourceError::Request {
            message: format!("Failed to read response: {e}"),
        })?;
        debug!("Fetched {} bytes of raw content", bytes.len());

        let compression_format = DecompressionService::detect_compression_format(&bytes);
        let decompressed = match compression_format {
            CompressionFormat::Uncompressed => bytes.to_vec(),
            CompressionFormat::Gzip => {
                debug!("Content is gzip compressed, decompressing");
                DecompressionService::decompress(bytes)?
            }
        };

        debug!(
            "Processed {} bytes of content (compression: {:?})",
            decompressed.len(),
            compression_format
        );
        Ok(decompressed)
    }
}

#[async_trait]
impl DecompressingHttpClient for StandardHttpClient {
    async fn fetch_bytes(&self, url: &str) -> SourceResult<Vec<u8>> {
        self.fetch_bytes_with(url, &[], &[]).await
    }

    async fn fetch_bytes_with(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> SourceResult<Vec<u8>> {
        debug!("Fetching {}", UrlUtils::without_query(url));

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, UrlUtils::without_query(url), self.max_redirects))?;

        Self::process_response_to_bytes(response, url).await
    }
}
