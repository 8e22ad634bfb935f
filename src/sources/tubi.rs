use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::TubiConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Catalog, GuideHeader, RegionSelector};
use crate::utils::DecompressingHttpClient;

use super::factory::Service;
use super::traits::{ServicePolicy, SourceAdapter, SourceCapability};

/// Tubi: a prebuilt playlist proxied as-is, region selector ignored
pub struct TubiAdapter {
    playlist_url: String,
    guide_url: String,
    http_client: Arc<dyn DecompressingHttpClient>,
}

impl TubiAdapter {
    pub fn new(tubi: &TubiConfig, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        Self {
            playlist_url: tubi.playlist_url.clone(),
            guide_url: tubi.guide_url.clone(),
            http_client,
        }
    }
}

#[async_trait]
impl SourceAdapter for TubiAdapter {
    fn service_key(&self) -> &str {
        "tubi"
    }

    fn capability(&self) -> SourceCapability {
        SourceCapability::PassThrough
    }

    fn policy(&self) -> ServicePolicy {
        Service::Tubi.policy()
    }

    fn guide_header(&self, _region: &RegionSelector) -> GuideHeader {
        GuideHeader::url_tvg(self.guide_url.clone())
    }

    async fn fetch(&self, _region: &RegionSelector) -> AppResult<Catalog> {
        info!("Fetching Tubi playlist");

        let body = self
            .http_client
            .fetch_text(&self.playlist_url)
            .await
            .map_err(|e| AppError::upstream(Service::Tubi.upstream_name(), e))?;

        if body.trim().is_empty() {
            return Err(AppError::EmptyUpstreamPayload {
                service: Service::Tubi.upstream_name().to_string(),
            });
        }

        Ok(Catalog::PassThrough(body))
    }
}
