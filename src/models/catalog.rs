use serde::Deserialize;
use serde_json::{Map, Value};

use super::channel::Channel;

/// A named partition of a service's catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Lowercase region code
    pub code: String,
    /// Label published by the source, if any
    pub label: Option<String>,
    pub channels: Vec<Channel>,
}

impl Region {
    pub fn new<S: Into<String>>(code: S, label: Option<String>, channels: Vec<Channel>) -> Self {
        Self {
            code: code.into().to_lowercase(),
            label: label.filter(|l| !l.trim().is_empty()),
            channels,
        }
    }
}

/// What one adapter fetch yields
///
/// Built fresh for every request and consumed by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Catalog {
    /// Channels already resolved for the request (no region partitioning)
    Flat(Vec<Channel>),
    /// Channels grouped by region, in upstream order
    Partitioned(Vec<Region>),
    /// An upstream playlist body proxied verbatim
    PassThrough(String),
}

impl Catalog {
    /// Number of channel records before any resolution or filtering
    pub fn channel_count(&self) -> usize {
        match self {
            Catalog::Flat(channels) => channels.len(),
            Catalog::Partitioned(regions) => regions.iter().map(|r| r.channels.len()).sum(),
            Catalog::PassThrough(_) => 0,
        }
    }
}

/// Raw upstream document: `{channels: {...}}` or `{regions: {code: {...}}}`
///
/// Object key order is preserved, which is what "source order" means for
/// ordering tiebreaks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub channels: Option<Map<String, Value>>,
    #[serde(default)]
    pub regions: Option<Map<String, Value>>,
}

/// One entry of a document's `regions` object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Option<Map<String, Value>>,
}

impl RegionDocument {
    /// Decode a region entry, treating malformed entries as empty
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}
