use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{DrmConfig, UpstreamConfig};
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{Catalog, CatalogDocument, EntryFormat, GuideHeader, RegionSelector};
use crate::utils::{DecompressingHttpClient, UrlUtils, decode_json};

use super::factory::Service;
use super::records::{StreamUrlSource, channels_from_map};
use super::traits::{ServicePolicy, SourceAdapter, SourceCapability};

/// PBS and PBS Kids: flat catalogs under the shared `PBS` directory
///
/// PBS streams are Widevine-protected DASH and render with key lines; PBS Kids
/// streams are plain HLS.
pub struct PbsAdapter {
    service: Service,
    service_key: String,
    catalog_url: String,
    guide_header: GuideHeader,
    entry_format: EntryFormat,
    http_client: Arc<dyn DecompressingHttpClient>,
}

impl PbsAdapter {
    pub fn pbs(
        upstream: &UpstreamConfig,
        drm: &DrmConfig,
        http_client: Arc<dyn DecompressingHttpClient>,
    ) -> Self {
        Self {
            service: Service::Pbs,
            service_key: Service::Pbs.key(),
            catalog_url: UrlUtils::join_path(&upstream.catalog_base_url, &["PBS", ".app.json"]),
            guide_header: GuideHeader::x_tvg_url(UrlUtils::join_path(
                &upstream.guide_base_url,
                &["PBS", "all.xml.gz"],
            )),
            entry_format: EntryFormat::Drm {
                user_agent: UrlUtils::encode_component(&drm.user_agent),
            },
            http_client,
        }
    }

    pub fn kids(upstream: &UpstreamConfig, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        Self {
            service: Service::PbsKids,
            service_key: Service::PbsKids.key(),
            catalog_url: UrlUtils::join_path(&upstream.catalog_base_url, &["PBS", ".kids_app.json"]),
            guide_header: GuideHeader::url_tvg(UrlUtils::join_path(
                &upstream.guide_base_url,
                &["PBS", "kids_all.xml.gz"],
            )),
            entry_format: EntryFormat::Standard,
            http_client,
        }
    }

    fn catalog_from_document(&self, document: CatalogDocument) -> AppResult<Catalog> {
        let Some(records) = document.channels else {
            return Err(AppError::upstream(
                self.service.upstream_name(),
                SourceError::parse("invalid data format"),
            ));
        };

        let channels = channels_from_map(&self.service_key, records, StreamUrlSource::Record, 0)
            .into_iter()
            .map(|channel| channel.with_group(None))
            .collect();
        Ok(Catalog::Flat(channels))
    }
}

#[async_trait]
impl SourceAdapter for PbsAdapter {
    fn service_key(&self) -> &str {
        &self.service_key
    }

    fn capability(&self) -> SourceCapability {
        SourceCapability::Flat
    }

    fn policy(&self) -> ServicePolicy {
        self.service.policy()
    }

    fn guide_header(&self, _region: &RegionSelector) -> GuideHeader {
        self.guide_header.clone()
    }

    fn entry_format(&self) -> EntryFormat {
        self.entry_format.clone()
    }

    async fn fetch(&self, _region: &RegionSelector) -> AppResult<Catalog> {
        info!("Fetching {} catalog", self.service);

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
