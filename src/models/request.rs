use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_REGION;
use crate::errors::{AppError, AppResult};

/// Which part of a partitioned catalog a request wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionSelector {
    All,
    Code(String),
}

impl RegionSelector {
    /// Trimmed, lowercased; blank or absent means `us`
    pub fn parse(value: Option<&str>) -> Self {
        let normalized = value
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        if normalized == "all" {
            RegionSelector::All
        } else {
            RegionSelector::Code(normalized)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RegionSelector::All => "all",
            RegionSelector::Code(code) => code,
        }
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        RegionSelector::Code(DEFAULT_REGION.to_string())
    }
}

impl std::fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Case-insensitive display name
    #[default]
    Name,
    /// Ascending channel number, missing numbers rank as 0
    #[serde(rename = "chno")]
    ChannelNumber,
}

impl SortOrder {
    /// Unknown values fall back to name ordering
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("chno") => SortOrder::ChannelNumber,
            _ => SortOrder::Name,
        }
    }
}

/// A parsed playlist request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRequest {
    /// Service selector as supplied (case preserved, trimmed)
    pub service: String,
    pub region: RegionSelector,
    pub sort: SortOrder,
    pub start_chno: Option<u32>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PlaylistRequest {
    pub fn new<S: Into<String>>(service: S) -> Self {
        Self {
            service: service.into(),
            region: RegionSelector::default(),
            sort: SortOrder::default(),
            start_chno: None,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Build a request from raw query values
    pub fn from_params(
        service: Option<&str>,
        region: Option<&str>,
        sort: Option<&str>,
        start_chno: Option<&str>,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> AppResult<Self> {
        let service = service
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingService)?;

        Ok(Self {
            service: service.to_string(),
            region: RegionSelector::parse(region),
            sort: SortOrder::parse(sort),
            start_chno: parse_start_number(start_chno)?,
            include: split_identifiers(include),
            exclude: split_identifiers(exclude),
        })
    }

    pub fn with_region(mut self, region: RegionSelector) -> Self {
        self.region = region;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_start_chno(mut self, start: Option<u32>) -> Self {
        self.start_chno = start;
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }
}

fn parse_start_number(value: Option<&str>) -> AppResult<Option<u32>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<u32>().map(Some).map_err(|e| {
            AppError::invalid_parameter("start_chno", format!("'{raw}' is not a channel number ({e})"))
        }),
    }
}

/// Comma-separated identifiers, blanks dropped
fn split_identifiers(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
