use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{PlexConfig, UpstreamConfig};
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::{
    Catalog, CatalogDocument, Channel, ChannelFields, GuideHeader, Region, RegionDocument,
    RegionSelector,
};
use crate::utils::{DecompressingHttpClient, UrlUtils, decode_json};

use super::factory::Service;
use super::records::{StreamUrlSource, channel_from_record};
use super::traits::{ServicePolicy, SourceAdapter, SourceCapability};

const SERVICE_KEY: &str = "plex";

/// Category used when the genre feed has no entry for a channel
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One entry of the genre cross-reference feed
#[derive(Debug, Clone, Deserialize)]
pub struct GenreEntry {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
}

/// Plex: one channel map whose records list the regions they are available
/// in, plus a top-level region table
pub struct PlexAdapter {
    catalog_url: String,
    genre_feed_url: String,
    guide_base_url: String,
    stream_template: String,
    http_client: Arc<dyn DecompressingHttpClient>,
}

impl PlexAdapter {
    pub fn new(
        upstream: &UpstreamConfig,
        plex: &PlexConfig,
        http_client: Arc<dyn DecompressingHttpClient>,
    ) -> Self {
        Self {
            catalog_url: UrlUtils::join_path(&upstream.catalog_base_url, &["Plex", ".channels.json"]),
            genre_feed_url: plex.genre_feed_url.clone(),
            guide_base_url: upstream.guide_base_url.clone(),
            stream_template: UrlUtils::join_path(&upstream.stream_base_url, &["plex-{id}.m3u8"]),
            http_client,
        }
    }

    /// Partition the channel map by each record's `regions` membership
    fn catalog_from_document(&self, document: CatalogDocument) -> AppResult<Catalog> {
        let Some(region_table) = document.regions else {
            return Err(AppError::upstream(
                Service::Plex.upstream_name(),
                SourceError::parse("catalog has no regions"),
            ));
        };

        let records: Vec<(Channel, ChannelFields)> = document
            .channels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| {
                channel_from_record(
                    SERVICE_KEY,
                    &key,
                    value,
                    StreamUrlSource::Template(&self.stream_template),
                )
            })
            .collect();

        let mut index = 0;
        let regions = region_table
            .into_iter()
            .map(|(code, value)| {
                let label = RegionDocument::from_value(value).name;
                let channels = records
                    .iter()
                    .filter(|(_, fields)| fields.available_in(&code))
                    .map(|(channel, _)| {
                        index += 1;
                        channel.clone().with_source_index(index - 1)
                    })
                    .collect();
                Region::new(code, label, channels)
            })
            .collect();

        Ok(Catalog::Partitioned(regions))
    }

    async fn fetch_genres(&self) -> SourceResult<HashMap<String, String>> {
        let bytes = self.http_client.fetch_bytes(&self.genre_feed_url).await?;
        let entries: Vec<GenreEntry> = decode_json(&bytes)?;
        Ok(genre_index(entries))
    }
}

/// Title to genre, first entry wins
pub fn genre_index(entries: Vec<GenreEntry>) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for entry in entries {
        if let Some(genre) = entry.genre.filter(|g| !g.trim().is_empty()) {
            index.entry(entry.title).or_insert(genre);
        }
    }
    index
}

/// Set every channel's group from the genre index
pub fn apply_genres(channels: &mut [Channel], genres: &HashMap<String, String>) {
    for channel in channels {
        let genre = genres
            .get(&channel.name)
            .cloned()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        channel.group = Some(genre);
    }
}

#[async_trait]
impl SourceAdapter for PlexAdapter {
    fn service_key(&self) -> &str {
        SERVICE_KEY
    }

    fn capability(&self) -> SourceCapability {
        SourceCapability::RegionPartitioned
    }

    fn policy(&self) -> ServicePolicy {
        Service::Plex.policy()
    }

    fn guide_header(&self, region: &RegionSelector) -> GuideHeader {
        GuideHeader::url_tvg(UrlUtils::join_path(
            &self.guide_base_url,
            &["Plex", &format!("{}.xml.gz", region.as_str())],
        ))
    }

    async fn fetch(&self, region: &RegionSelector) -> AppResult<Catalog> {
        info!("Fetching Plex catalog for region {}", region);

        let bytes = self
            .http_client
            .fetch_bytes(&self.catalog_url)
            .await
            .map_err(|e| AppError::upstream(Service::Plex.upstream_name(), e))?;
        let document: CatalogDocument =
            decode_json(&bytes).map_err(|e| AppError::upstream(Service::Plex.upstream_name(), e))?;

        let mut catalog = self.catalog_from_document(document)?;

        // Genres only matter for a single region; "all" groups by region name
        if let (RegionSelector::Code(code), Catalog::Partitioned(regions)) = (region, &mut catalog) {
            if let Some(selected) = regions.iter_mut().find(|r| &r.code == code) {
                let genres = match self.fetch_genres().await {
                    Ok(genres) => genres,
                    Err(e) => {
                        warn!("Plex genre feed unavailable, using {}: {}", UNCATEGORIZED, e);
                        HashMap::new()
                    }
                };
                apply_genres(&mut selected.channels, &genres);
            }
        }

        debug!("Plex catalog holds {} channel records", catalog.channel_count());
        Ok(catalog)
    }
}
