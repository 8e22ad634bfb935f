use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Key systems a DRM-emitting playlist can announce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySystem {
    #[default]
    Widevine,
}

impl KeySystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySystem::Widevine => "com.widevine.alpha",
        }
    }
}

/// License information attached to a protected stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrmInfo {
    pub license_url: String,
    pub key_system: KeySystem,
}

impl DrmInfo {
    pub fn widevine<S: Into<String>>(license_url: S) -> Self {
        Self {
            license_url: license_url.into(),
            key_system: KeySystem::Widevine,
        }
    }
}

/// One playable lineup entry
///
/// `key` is the storage key, unique within one response; under a multi-region
/// aggregate it carries a `-<region>` suffix. `guide_key` is the identifier
/// used for EPG matching and never carries that suffix. `stream_id` is the raw
/// upstream identifier substituted into stream-URL templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub service_key: String,
    pub key: String,
    pub guide_key: String,
    pub stream_id: String,
    pub name: String,
    pub logo: Option<String>,
    pub number: Option<u32>,
    pub group: Option<String>,
    pub stream_url: String,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    pub drm: Option<DrmInfo>,
    /// Position in the upstream document, used as the ordering tiebreak
    pub source_index: usize,
}

impl Channel {
    pub fn new<S, K, N, U>(service_key: S, key: K, name: N, stream_url: U) -> Self
    where
        S: Into<String>,
        K: Into<String>,
        N: Into<String>,
        U: Into<String>,
    {
        let key = key.into();
        Self {
            service_key: service_key.into(),
            guide_key: key.clone(),
            stream_id: key.clone(),
            key,
            name: name.into(),
            logo: None,
            number: None,
            group: None,
            stream_url: stream_url.into(),
            region_code: None,
            region_name: None,
            drm: None,
            source_index: 0,
        }
    }

    pub fn with_logo(mut self, logo: Option<String>) -> Self {
        self.logo = logo.filter(|l| !l.is_empty());
        self
    }

    pub fn with_number(mut self, number: Option<u32>) -> Self {
        self.number = number;
        self
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn with_drm(mut self, drm: Option<DrmInfo>) -> Self {
        self.drm = drm;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region_code = region.filter(|r| !r.is_empty());
        self
    }

    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = index;
        self
    }

    /// Fully-qualified identifier: `<service>-<key>`
    pub fn composite_id(&self) -> String {
        format!("{}-{}", self.service_key, self.key)
    }

    /// Whether the channel carries a non-empty license reference
    pub fn has_license(&self) -> bool {
        self.drm
            .as_ref()
            .is_some_and(|drm| !drm.license_url.trim().is_empty())
    }

    /// Whether everything a DRM entry needs to render is present
    pub fn is_drm_complete(&self) -> bool {
        self.has_license()
            && !self.name.trim().is_empty()
            && self.logo.as_deref().is_some_and(|l| !l.trim().is_empty())
            && !self.stream_url.trim().is_empty()
    }
}

/// Raw channel record as published upstream
///
/// Fields are optional because services disagree on what they publish; the
/// adapters decide which ones are mandatory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_channel_number")]
    pub chno: Option<u32>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
}

impl ChannelFields {
    /// Decode one record, `None` when it is not an object of the expected shape
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Trimmed, non-empty display name
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Non-empty stream URL
    pub fn stream_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// First non-empty license reference (`license_url` wins over `license`)
    pub fn license_reference(&self) -> Option<&str> {
        [self.license_url.as_deref(), self.license.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }

    pub fn drm(&self) -> Option<DrmInfo> {
        self.license_reference().map(DrmInfo::widevine)
    }

    /// Whether the record lists `region` among its available regions
    pub fn available_in(&self, region: &str) -> bool {
        self.regions
            .as_deref()
            .is_some_and(|regions| regions.iter().any(|r| r.eq_ignore_ascii_case(region)))
    }
}

/// Accepts `12`, `12.0` and `"12"`; anything else is treated as absent
fn deserialize_channel_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f as u32)
            }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}
