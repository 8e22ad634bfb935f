/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4242;

// Upstream defaults
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://i.mjh.nz";
pub const DEFAULT_GUIDE_BASE_URL: &str = "https://github.com/matthuisman/i.mjh.nz/raw/master";
pub const DEFAULT_STREAM_BASE_URL: &str = "https://jmp2.uk";
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

// Plex defaults
pub const DEFAULT_PLEX_GENRE_FEED_URL: &str =
    "https://raw.githubusercontent.com/dtankdempse/free-iptv-channels/main/plex/channels.json";

// Pluto defaults
pub const DEFAULT_PLUTO_BOOT_URL: &str = "https://boot.pluto.tv/v4/start";
pub const DEFAULT_PLUTO_STITCHER_BASE_URL: &str =
    "https://cfd-v4-service-channel-stitcher-use1-1.prd.pluto.tv";
pub const DEFAULT_PLUTO_APP_VERSION: &str = "9.1.2";
pub const DEFAULT_PLUTO_DEVICE_VERSION: &str = "122.0.0";
pub const DEFAULT_PLUTO_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

// Tubi defaults
pub const DEFAULT_TUBI_PLAYLIST_URL: &str =
    "https://github.com/dtankdempse/tubi-m3u/raw/refs/heads/main/tubi_playlist_us.m3u";
pub const DEFAULT_TUBI_GUIDE_URL: &str =
    "https://raw.githubusercontent.com/dtankdempse/tubi-m3u/refs/heads/main/tubi_epg_us.xml";

// DRM defaults
pub const DEFAULT_DRM_USER_AGENT: &str = "okhttp/4.9.0";

// Region defaults
pub const DEFAULT_REGION: &str = "us";

/// Region display names shared by every service unless overridden
pub const DEFAULT_REGION_NAMES: &[(&str, &str)] = &[
    ("ar", "Argentina"),
    ("au", "Australia"),
    ("br", "Brazil"),
    ("ca", "Canada"),
    ("cl", "Chile"),
    ("de", "Germany"),
    ("dk", "Denmark"),
    ("es", "Spain"),
    ("fr", "France"),
    ("gb", "United Kingdom"),
    ("it", "Italy"),
    ("mx", "Mexico"),
    ("no", "Norway"),
    ("nz", "New Zealand"),
    ("se", "Sweden"),
    ("us", "United States"),
];
