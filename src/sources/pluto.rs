use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::UpstreamConfig;
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{Catalog, CatalogDocument, GuideHeader, Region, RegionDocument, RegionSelector};
use crate::utils::{DecompressingHttpClient, UrlUtils, decode_json};

use super::factory::Service;
use super::records::{StreamUrlSource, channels_from_map};
use super::token::TokenProvider;
use super::traits::{ServicePolicy, SourceAdapter, SourceCapability};

const SERVICE_KEY: &str = "plutotv";

/// Pluto TV, region-partitioned, streams through the redirector
pub struct PlutoAdapter {
    catalog_url: String,
    guide_base_url: String,
    stream_template: String,
    http_client: Arc<dyn DecompressingHttpClient>,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl PlutoAdapter {
    pub fn new(upstream: &UpstreamConfig, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        Self {
            catalog_url: UrlUtils::join_path(&upstream.catalog_base_url, &["PlutoTV", ".channels.json"]),
            guide_base_url: upstream.guide_base_url.clone(),
            stream_template: UrlUtils::join_path(&upstream.stream_base_url, &["plu-{id}.m3u8"]),
            http_client,
            token_provider: None,
        }
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    fn catalog_from_document(&self, document: CatalogDocument) -> AppResult<Catalog> {
        let Some(regions) = document.regions else {
            return Err(AppError::upstream(
                Service::PlutoTv.upstream_name(),
                SourceError::parse("catalog has no regions"),
            ));
        };

        let mut offset = 0;
        let regions = regions
            .into_iter()
            .map(|(code, value)| {
                let region = RegionDocument::from_value(value);
                let records = region.channels.unwrap_or_default();
                let count = records.len();
                let channels = channels_from_map(
                    SERVICE_KEY,
                    records,
                    StreamUrlSource::Template(&self.stream_template),
                    offset,
                );
                offset += count;
                Region::new(code, region.name, channels)
            })
            .collect();

        Ok(Catalog::Partitioned(regions))
    }
}

#[async_trait]
impl SourceAdapter for PlutoAdapter {
    fn service_key(&self) -> &str {
        SERVICE_KEY
    }

    fn capability(&self) -> SourceCapability {
        SourceCapability::RegionPartitioned
    }

    fn policy(&self) -> ServicePolicy {
        Service::PlutoTv.policy()
    }

    fn guide_header(&self, region: &RegionSelector) -> GuideHeader {
        GuideHeader::url_tvg(UrlUtils::join_path(
            &self.guide_base_url,
            &["PlutoTV", &format!("{}.xml.gz", region.as_str())],
        ))
    }

    async fn fetch(&self, region: &RegionSelector) -> AppResult<Catalog> {
        info!("Fetching PlutoTV catalog for region {}", region);

        let bytes = self
            .http_client
            .fetch_bytes(&self.catalog_url)
            .await
            .map_err(|e| AppError::upstream(Service::PlutoTv.upstream_name(), e))?;
        let document: CatalogDocument = decode_json(&bytes)
            .map_err(|e| AppError::upstream(Service::PlutoTv.upstream_name(), e))?;

        let catalog = self.catalog_from_document(document)?;
        debug!("PlutoTV catalog holds {} channel records", catalog.channel_count());
        Ok(catalog)
    }

    fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
        self.token_provider.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StandardHttpClient;
    use serde_json::json;

    fn adapter() -> PlutoAdapter {
        let upstream = UpstreamConfig::default();
        let client = Arc::new(StandardHttpClient::from_config(&upstream).unwrap());
        PlutoAdapter::new(&upstream, client)
    }

    #[test]
    fn test_stream_urls_use_raw_channel_id() {
        let document: CatalogDocument = serde_json::from_value(json!({
            "regions": {
                "us": {"name": "United States", "channels": {
                    "5ab1": {"name": "Pluto Movies", "group": "Movies", "chno": 52}
                }},
                "ca": {"channels": {"5ab1": {"name": "Pluto Movies"}}}
            }
        }))
        .unwrap();

        let Catalog::Partitioned(regions) = adapter().catalog_from_document(document).unwrap() else {
            panic!("expected partitioned catalog");
        };
        let movies = &regions[0].channels[0];
        assert_eq!(movies.stream_url, "https://jmp2.uk/plu-5ab1.m3u8");
        assert_eq!(movies.group.as_deref(), Some("Movies"));
        assert_eq!(movies.number, Some(52));
        assert_eq!(regions[1].channels[0].source_index, 1);
    }

    #[test]
    fn test_flat_document_is_rejected() {
        let document: CatalogDocument = serde_json::from_value(json!({"channels": {}})).unwrap();
        assert!(adapter().catalog_from_document(document).is_err());
    }

    #[test]
    fn test_guide_header() {
        assert_eq!(
            adapter().guide_header(&RegionSelector::Code("ca".into())).url,
            "https://github.com/matthuisman/i.mjh.nz/raw/master/PlutoTV/ca.xml.gz"
        );
    }
}
