//! Session tokens for services whose streams need a bearer token
//!
//! Only Pluto TV needs one today: an anonymous boot request yields a short
//! lived JWT and the stitcher host; stream URLs are then rewritten from the
//! redirector onto the stitcher with the token appended.

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PlutoConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::Channel;
use crate::utils::{DecompressingHttpClient, UrlUtils, decode_json};

const SESSION_ID_LENGTH: usize = 12;
const HEX_CHARS: &[u8] = b"abcdef0123456789";

/// A freshly acquired session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    /// Stitcher host the stream URLs are rewritten onto
    pub stream_base: String,
    pub device_id: String,
    pub session_id: String,
}

impl TokenGrant {
    /// Authenticated stream URL for a raw channel id
    pub fn stream_url(&self, stream_id: &str) -> Result<String, url::ParseError> {
        let base = UrlUtils::join_path(
            &self.stream_base,
            &["v2/stitch/hls/channel", stream_id, "master.m3u8"],
        );
        UrlUtils::append_query(
            &base,
            &[
                ("appName", "web"),
                ("deviceType", "web"),
                ("deviceId", &self.device_id),
                ("sid", &self.session_id),
                ("masterJWTPassthrough", "true"),
                ("jwt", &self.token),
            ],
        )
    }

    /// Rewrite every channel's stream URL, returning how many were rewritten
    ///
    /// A channel whose URL cannot be built keeps its unauthenticated URL.
    pub fn authorize(&self, channels: &mut [Channel]) -> usize {
        let mut rewritten = 0;
        for channel in channels.iter_mut() {
            match self.stream_url(&channel.stream_id) {
                Ok(url) => {
                    channel.stream_url = url;
                    rewritten += 1;
                }
                Err(e) => debug!("Keeping proxy URL for {}: {}", channel.composite_id(), e),
            }
        }
        rewritten
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire(&self) -> SourceResult<TokenGrant>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootResponse {
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    servers: Option<BootServers>,
}

#[derive(Debug, Deserialize)]
struct BootServers {
    #[serde(default)]
    stitcher: Option<String>,
}

/// Anonymous Pluto TV boot session
pub struct PlutoSessionTokenProvider {
    config: PlutoConfig,
    http_client: Arc<dyn DecompressingHttpClient>,
}

impl PlutoSessionTokenProvider {
    pub fn new(config: PlutoConfig, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        Self { config, http_client }
    }
}

/// Random lowercase hex session id
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| HEX_CHARS[rng.random_range(0..HEX_CHARS.len())] as char)
        .collect()
}

#[async_trait]
impl TokenProvider for PlutoSessionTokenProvider {
    async fn acquire(&self) -> SourceResult<TokenGrant> {
        let device_id = Uuid::new_v4().to_string();
        let session_id = generate_session_id();

        let headers = [
            ("User-Agent", self.config.browser_user_agent.as_str()),
            ("Origin", "https://pluto.tv"),
            ("Referer", "https://pluto.tv/"),
        ];
        let query = [
            ("appName", "web"),
            ("appVersion", self.config.app_version.as_str()),
            ("deviceVersion", self.config.device_version.as_str()),
            ("deviceModel", "web"),
            ("deviceMake", "chrome"),
            ("deviceType", "web"),
            ("clientID", device_id.as_str()),
            ("clientModelNumber", "1.0.0"),
            ("sid", session_id.as_str()),
            ("serverSideAds", "false"),
        ];

        let bytes = self
            .http_client
            .fetch_bytes_with(&self.config.boot_url, &headers, &query)
            .await?;
        let boot: BootResponse = decode_json(&bytes)?;

        let token = boot
            .session_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SourceError::parse("boot response has no sessionToken"))?;
        let stream_base = boot
            .servers
            .and_then(|s| s.stitcher)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.config.stitcher_base_url.clone());

        info!("Acquired Pluto session token (stitcher {})", stream_base);
        Ok(TokenGrant {
            token,
            stream_base,
            device_id,
            session_id,
        })
    }
}
