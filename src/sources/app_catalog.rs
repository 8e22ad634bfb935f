//! Generic i.mjh.nz app-catalog adapter
//!
//! Serves every service published as `{base}/{Service}/.app.json`: Roku,
//! Samsung TV Plus, Stirr and any service name not otherwise known. The
//! document is either `{channels: {...}}` or `{regions: {code: {name, channels}}}`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::UpstreamConfig;
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{Catalog, CatalogDocument, GuideHeader, Region, RegionDocument, RegionSelector};
use crate::utils::{DecompressingHttpClient, UrlUtils, decode_json};

use super::factory::Service;
use super::records::{StreamUrlSource, channels_from_map};
use super::traits::{ServicePolicy, SourceAdapter, SourceCapability};

pub struct AppCatalogAdapter {
    service: Service,
    service_key: String,
    /// Upstream name, percent-encoded as a path segment
    path_segment: String,
    catalog_url: String,
    guide_base_url: String,
    http_client: Arc<dyn DecompressingHttpClient>,
}

impl AppCatalogAdapter {
    pub fn new(
        service: Service,
        upstream: &UpstreamConfig,
        http_client: Arc<dyn DecompressingHttpClient>,
    ) -> Self {
        let path_segment = UrlUtils::encode_component(service.upstream_name());
        let catalog_url =
            UrlUtils::join_path(&upstream.catalog_base_url, &[&path_segment, ".app.json"]);
        Self {
            service_key: service.key(),
            path_segment,
            service,
            catalog_url,
            guide_base_url: upstream.guide_base_url.clone(),
            http_client,
        }
    }

    /// Map a decoded document onto a catalog
    pub fn catalog_from_document(&self, document: CatalogDocument) -> AppResult<Catalog> {
        if let Some(channels) = document.channels {
            let channels = channels_from_map(&self.service_key, channels, StreamUrlSource::Record, 0);
            return Ok(Catalog::Flat(channels));
        }

        if let Some(regions) = document.regions {
            let mut offset = 0;
            let regions = regions
                .into_iter()
                .map(|(code, value)| {
                    let region = RegionDocument::from_value(value);
                    let records = region.channels.unwrap_or_default();
                    let count = records.len();
                    let channels =
                        channels_from_map(&self.service_key, records, StreamUrlSource::Record, offset);
                    offset += count;
                    Region::new(code, region.name, channels)
                })
                .collect();
            return Ok(Catalog::Partitioned(regions));
        }

        Err(AppError::upstream(
            self.service.upstream_name(),
            SourceError::parse("invalid data format"),
        ))
    }
}

#[async_trait]
impl SourceAdapter for AppCatalogAdapter {
    fn service_key(&self) -> &str {
        &self.service_key
    }

    fn capability(&self) -> SourceCapability {
        SourceCapability::AppCatalog
    }

    fn policy(&self) -> ServicePolicy {
        self.service.policy()
    }

    fn guide_header(&self, region: &RegionSelector) -> GuideHeader {
        let file = match self.service {
            Service::Roku => "all.xml.gz".to_string(),
            _ => format!("{}.xml.gz", UrlUtils::encode_component(region.as_str())),
        };
        GuideHeader::url_tvg(UrlUtils::join_path(&self.guide_base_url, &[&self.path_segment, &file]))
    }

    async fn fetch(&self, region: &RegionSelector) -> AppResult<Catalog> {
        info!("Fetching {} catalog for region {}", self.service, region);

        let bytes = self
            .http_client
            .fetch_bytes(&self.catalog_url)
            .await
            .map_err(|e| AppError::upstream(self.service.upstream_name(), e))?;
        let document: CatalogDocument =
            decode_json(&bytes).map_err(|e| AppError::upstream(self.service.upstream_name(), e))?;

        let catalog = self.catalog_from_document(document)?;
        debug!("{} catalog holds {} channel records", self.service, catalog.channel_count());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StandardHttpClient;
    use serde_json::json;

    fn adapter(service: Service) -> AppCatalogAdapter {
        let upstream = UpstreamConfig::default();
        let client = Arc::new(StandardHttpClient::from_config(&upstream).unwrap());
        AppCatalogAdapter::new(service, &upstream, client)
    }

    fn document(value: serde_json::Value) -> CatalogDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_catalog_url_uses_name_as_given() {
        assert_eq!(adapter(Service::Roku).catalog_url, "https://i.mjh.nz/Roku/.app.json");
        assert_eq!(
            adapter(Service::Other("Xumo".into())).catalog_url,
            "https://i.mjh.nz/Xumo/.app.json"
        );
    }

    #[test]
    fn test_user_supplied_names_are_percent_encoded() {
        let adapter = adapter(Service::Other("a\"b c".into()));
        assert_eq!(adapter.catalog_url, "https://i.mjh.nz/a%22b%20c/.app.json");

        let rendered = adapter
            .guide_header(&RegionSelector::Code("x\"y".into()))
            .to_string();
        assert!(rendered.ends_with("/a%22b%20c/x%22y.xml.gz\""));
        assert_eq!(rendered.matches('"').count(), 2);
    }

    #[test]
    fn test_flat_document() {
        let catalog = adapter(Service::Stirr)
            .catalog_from_document(document(json!({
                "channels": {"a": {"name": "A", "url": "https://s/a"}}
            })))
            .unwrap();
        assert!(matches!(catalog, Catalog::Flat(ref channels) if channels.len() == 1));
    }

    #[test]
    fn test_partitioned_document_indices_are_unique() {
        let catalog = adapter(Service::SamsungTvPlus)
            .catalog_from_document(document(json!({
                "regions": {
                    "us": {"name": "USA", "channels": {"x": {"name": "X", "url": "https://s/x"}}},
                    "ca": {"channels": {"x": {"name": "X", "url": "https://s/x"}, "y": {"name": "Y", "url": "https://s/y"}}}
                }
            })))
            .unwrap();

        let Catalog::Partitioned(regions) = catalog else {
            panic!("expected partitioned catalog");
        };
        assert_eq!(regions[0].code, "us");
        assert_eq!(regions[0].label.as_deref(), Some("USA"));
        assert_eq!(regions[1].label, None);
        let indices: Vec<usize> = regions
            .iter()
            .flat_map(|r| r.channels.iter().map(|c| c.source_index))
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_document_without_channels_or_regions() {
        let err = adapter(Service::Stirr)
            .catalog_from_document(document(json!({"something": "else"})))
            .unwrap_err();
        assert!(err.to_string().contains("invalid data format"));
    }

    #[test]
    fn test_guide_header_per_region() {
        let header = adapter(Service::SamsungTvPlus).guide_header(&RegionSelector::All);
        assert_eq!(
            header.to_string(),
            "#EXTM3U url-tvg=\"https://github.com/matthuisman/i.mjh.nz/raw/master/SamsungTVPlus/all.xml.gz\""
        );
    }
}
