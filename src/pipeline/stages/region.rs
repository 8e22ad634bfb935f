//! Region resolution stage
//!
//! Turns a fetched catalog plus the request's region selector into the flat
//! channel list the rest of the pipeline works on.

use std::collections::BTreeMap;
use tracing::debug;

use crate::config::RegionNamesConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Catalog, Channel, Region, RegionSelector};

/// Region display names keyed by `(service, code)` with a shared default table
#[derive(Debug, Clone, Default)]
pub struct RegionNameTable {
    default: BTreeMap<String, String>,
    services: BTreeMap<String, BTreeMap<String, String>>,
}

impl RegionNameTable {
    pub fn from_config(config: &RegionNamesConfig) -> Self {
        let lower = |table: &BTreeMap<String, String>| {
            table
                .iter()
                .map(|(code, name)| (code.to_lowercase(), name.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            default: lower(&config.default),
            services: config
                .services
                .iter()
                .map(|(service, table)| (service.to_lowercase(), lower(table)))
                .collect(),
        }
    }

    /// Service entry, then the source label, then default entry, then the
    /// uppercased code
    pub fn display_name(&self, service_key: &str, code: &str, label: Option<&str>) -> String {
        self.services
            .get(service_key)
            .and_then(|table| table.get(code))
            .map(String::as_str)
            .or(label)
            .or_else(|| self.default.get(code).map(String::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| code.to_uppercase())
    }
}

pub struct RegionResolver<'a> {
    names: &'a RegionNameTable,
    service_key: &'a str,
}

impl<'a> RegionResolver<'a> {
    pub fn new(names: &'a RegionNameTable, service_key: &'a str) -> Self {
        Self { names, service_key }
    }

    pub fn resolve(&self, catalog: Catalog, selector: &RegionSelector) -> AppResult<Vec<Channel>> {
        match catalog {
            Catalog::Flat(channels) => Ok(channels),
            Catalog::Partitioned(regions) => match selector {
                RegionSelector::All => Ok(self.aggregate(regions)),
                RegionSelector::Code(code) => regions
                    .into_iter()
                    .find(|region| &region.code == code)
                    .map(|region| region.channels)
                    .ok_or_else(|| AppError::UnknownRegion(code.clone())),
            },
            Catalog::PassThrough(_) => Err(AppError::internal(
                "pass-through catalogs carry no channels to resolve",
            )),
        }
    }

    /// Union of every region, keys suffixed with the region code
    fn aggregate(&self, regions: Vec<Region>) -> Vec<Channel> {
        let mut channels = Vec::new();
        for region in regions {
            let name = self
                .names
                .display_name(self.service_key, &region.code, region.label.as_deref());
            debug!(
                "Aggregating {} channels from region {} ({})",
                region.channels.len(),
                region.code,
                name
            );
            channels.extend(region.channels.into_iter().map(|mut channel| {
                channel.key = format!("{}-{}", channel.key, region.code);
                channel.region_code = Some(region.code.clone());
                channel.region_name = Some(name.clone());
                channel
            }));
        }
        channels
    }
}
