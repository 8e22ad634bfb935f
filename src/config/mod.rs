use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod defaults;

use defaults::*;

/// Prefix for environment overrides, `__` separates nested keys
/// (e.g. `M3U_LINEUP_WEB__PORT=8080`)
pub const ENV_PREFIX: &str = "M3U_LINEUP_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub regions: RegionNamesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where catalogs, guides and streams live upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the catalog host (`{base}/{Service}/.app.json`)
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,
    /// Base URL referenced by the playlist header for XMLTV guides
    #[serde(default = "default_guide_base_url")]
    pub guide_base_url: String,
    /// Base URL of the stream redirector used by template-based services
    #[serde(default = "default_stream_base_url")]
    pub stream_base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Overrides the `m3u-lineup/<version>` user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default)]
    pub pluto: PlutoConfig,
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub tubi: TubiConfig,
    #[serde(default)]
    pub drm: DrmConfig,
}

/// Pluto session bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlutoConfig {
    /// Acquire a session token and rewrite stream URLs onto the stitcher
    #[serde(default)]
    pub token_bootstrap: bool,
    #[serde(default = "default_pluto_boot_url")]
    pub boot_url: String,
    /// Used when the boot response does not name a stitcher server
    #[serde(default = "default_pluto_stitcher_base_url")]
    pub stitcher_base_url: String,
    #[serde(default = "default_pluto_app_version")]
    pub app_version: String,
    #[serde(default = "default_pluto_device_version")]
    pub device_version: String,
    #[serde(default = "default_pluto_browser_user_agent")]
    pub browser_user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    /// Genre cross-reference feed (`[{Title, Genre}]`)
    #[serde(default = "default_plex_genre_feed_url")]
    pub genre_feed_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TubiConfig {
    #[serde(default = "default_tubi_playlist_url")]
    pub playlist_url: String,
    #[serde(default = "default_tubi_guide_url")]
    pub guide_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrmConfig {
    /// User agent injected into license requests and stream URLs
    #[serde(default = "default_drm_user_agent")]
    pub user_agent: String,
}

/// Region display names keyed by `(service, region code)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionNamesConfig {
    /// Names used by every service
    #[serde(default = "default_region_names")]
    pub default: BTreeMap<String, String>,
    /// Per-service overrides, keyed by lowercase service key
    #[serde(default)]
    pub services: BTreeMap<String, BTreeMap<String, String>>,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Upstream defaults
fn default_catalog_base_url() -> String {
    DEFAULT_CATALOG_BASE_URL.to_string()
}

fn default_guide_base_url() -> String {
    DEFAULT_GUIDE_BASE_URL.to_string()
}

fn default_stream_base_url() -> String {
    DEFAULT_STREAM_BASE_URL.to_string()
}

fn default_connect_timeout() -> String {
    DEFAULT_CONNECT_TIMEOUT.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

// Service defaults
fn default_pluto_boot_url() -> String {
    DEFAULT_PLUTO_BOOT_URL.to_string()
}

fn default_pluto_stitcher_base_url() -> String {
    DEFAULT_PLUTO_STITCHER_BASE_URL.to_string()
}

fn default_pluto_app_version() -> String {
    DEFAULT_PLUTO_APP_VERSION.to_string()
}

fn default_pluto_device_version() -> String {
    DEFAULT_PLUTO_DEVICE_VERSION.to_string()
}

fn default_pluto_browser_user_agent() -> String {
    DEFAULT_PLUTO_BROWSER_USER_AGENT.to_string()
}

fn default_plex_genre_feed_url() -> String {
    DEFAULT_PLEX_GENRE_FEED_URL.to_string()
}

fn default_tubi_playlist_url() -> String {
    DEFAULT_TUBI_PLAYLIST_URL.to_string()
}

fn default_tubi_guide_url() -> String {
    DEFAULT_TUBI_GUIDE_URL.to_string()
}

fn default_drm_user_agent() -> String {
    DEFAULT_DRM_USER_AGENT.to_string()
}

fn default_region_names() -> BTreeMap<String, String> {
    DEFAULT_REGION_NAMES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: default_catalog_base_url(),
            guide_base_url: default_guide_base_url(),
            stream_base_url: default_stream_base_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

impl Default for PlutoConfig {
    fn default() -> Self {
        Self {
            token_bootstrap: false,
            boot_url: default_pluto_boot_url(),
            stitcher_base_url: default_pluto_stitcher_base_url(),
            app_version: default_pluto_app_version(),
            device_version: default_pluto_device_version(),
            browser_user_agent: default_pluto_browser_user_agent(),
        }
    }
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            genre_feed_url: default_plex_genre_feed_url(),
        }
    }
}

impl Default for TubiConfig {
    fn default() -> Self {
        Self {
            playlist_url: default_tubi_playlist_url(),
            guide_url: default_tubi_guide_url(),
        }
    }
}

impl Default for DrmConfig {
    fn default() -> Self {
        Self {
            user_agent: default_drm_user_agent(),
        }
    }
}

impl Default for RegionNamesConfig {
    fn default() -> Self {
        Self {
            default: default_region_names(),
            services: BTreeMap::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            upstream: UpstreamConfig::default(),
            services: ServicesConfig::default(),
            regions: RegionNamesConfig::default(),
        }
    }
}

impl UpstreamConfig {
    /// Connect timeout, falling back to the default on unparseable input
    pub fn connect_timeout(&self) -> Duration {
        parse_duration_or_default(&self.connect_timeout, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Whole-request timeout, falling back to the default on unparseable input
    pub fn request_timeout(&self) -> Duration {
        parse_duration_or_default(&self.request_timeout, DEFAULT_REQUEST_TIMEOUT)
    }

    /// User agent sent with every upstream request
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        })
    }
}

fn parse_duration_or_default(value: &str, fallback: &str) -> Duration {
    humantime::parse_duration(value).unwrap_or_else(|e| {
        warn!("Invalid duration '{}' ({}), using {}", value, e, fallback);
        humantime::parse_duration(fallback).unwrap_or(Duration::from_secs(30))
    })
}

impl Config {
    /// Layer defaults, the optional TOML file and `M3U_LINEUP_*` variables
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if Path::new(config_file).exists() {
            info!("Loading configuration from: {}", config_file);
        } else {
            info!("Config file {} not found, using defaults", config_file);
        }

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load configuration from {config_file}"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.web.port, 4242);
        assert_eq!(config.upstream.max_redirects, 5);
        assert!(!config.services.pluto.token_bootstrap);
        assert_eq!(config.regions.default.get("gb").map(String::as_str), Some("United Kingdom"));
        assert_eq!(config.regions.default.get("nz").map(String::as_str), Some("New Zealand"));
    }

    #[test]
    fn test_duration_parsing_with_fallback() {
        let mut upstream = UpstreamConfig::default();
        assert_eq!(upstream.connect_timeout(), Duration::from_secs(10));

        upstream.request_timeout = "not-a-duration".to_string();
        assert_eq!(upstream.request_timeout(), Duration::from_secs(30));

        upstream.request_timeout = "2m".to_string();
        assert_eq!(upstream.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [web]
                port = 8080

                [regions.services.plex]
                us = "USA"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.upstream.catalog_base_url, DEFAULT_CATALOG_BASE_URL);
        assert_eq!(
            config.regions.services["plex"].get("us").map(String::as_str),
            Some("USA")
        );
        assert!(config.regions.default.contains_key("us"));
    }

    #[test]
    fn test_config_renders_as_toml() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("catalog_base_url"));
        assert!(rendered.contains("[services.pluto]"));
    }
}
