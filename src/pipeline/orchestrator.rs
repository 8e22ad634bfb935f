use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{Catalog, Playlist, PlaylistRequest};
use crate::sources::{Service, SourceAdapter, SourceAdapterFactory};
use crate::utils::DecompressingHttpClient;

use super::stages::{
    FilteringStage, GenerationStage, IdentifierNormalizer, NumberingStage, OrderingStage,
    RegionNameTable, RegionResolver,
};

/// Runs one playlist request end to end
///
/// fetch → resolve regions → filter → normalize identifiers → order → number
/// → token injection → generate. Nothing is cached between requests.
pub struct PlaylistPipeline {
    config: Arc<Config>,
    http_client: Arc<dyn DecompressingHttpClient>,
    region_names: RegionNameTable,
}

impl PlaylistPipeline {
    pub fn new(config: Arc<Config>, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        let region_names = RegionNameTable::from_config(&config.regions);
        Self {
            config,
            http_client,
            region_names,
        }
    }

    pub async fn generate(&self, request: &PlaylistRequest) -> AppResult<Playlist> {
        let service = Service::from_selector(&request.service);
        let adapter =
            SourceAdapterFactory::create_adapter(&service, &self.config, self.http_client.clone());
        self.run(adapter.as_ref(), request).await
    }

    pub async fn run(&self, adapter: &dyn SourceAdapter, request: &PlaylistRequest) -> AppResult<Playlist> {
        let started = Instant::now();
        let policy = adapter.policy();
        let generation = GenerationStage::new(adapter.guide_header(&request.region), adapter.entry_format());

        let catalog = adapter.fetch(&request.region).await?;
        let capability = adapter.capability();
        if !capability.admits(&catalog) {
            return Err(AppError::internal(format!(
                "{} adapter declared {:?} but fetched an incompatible catalog",
                adapter.service_key(),
                capability
            )));
        }
        let fetched = catalog.channel_count();

        let channels = match catalog {
            Catalog::PassThrough(body) => {
                info!(
                    "Proxied {} playlist ({} bytes) in {:?}",
                    adapter.service_key(),
                    body.len(),
                    started.elapsed()
                );
                return Ok(generation.pass_through(&body));
            }
            catalog => RegionResolver::new(&self.region_names, adapter.service_key())
                .resolve(catalog, &request.region)?,
        };
        debug!("Resolved {} channels for region {}", channels.len(), request.region);

        let mut channels =
            FilteringStage::new(adapter.service_key(), policy.drm, &request.include, &request.exclude)
                .process(channels);
        IdentifierNormalizer::new(policy.group).process(&mut channels);
        OrderingStage::new(request.sort).process(&mut channels);
        NumberingStage::new(request.start_chno).process(&mut channels);

        if let Some(provider) = adapter.token_provider() {
            match provider.acquire().await {
                Ok(grant) => {
                    let rewritten = grant.authorize(&mut channels);
                    debug!("Rewrote {} stream URLs with session token", rewritten);
                }
                Err(e) => warn!(
                    "Token acquisition for {} failed, serving unauthenticated URLs: {}",
                    adapter.service_key(),
                    e
                ),
            }
        }

        let playlist = generation.process(channels);
        info!(
            "Generated {} playlist for region {}: {} of {} channels in {:?}",
            adapter.service_key(),
            request.region,
            playlist.entries().len(),
            fetched,
            started.elapsed()
        );
        Ok(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::models::{Channel, EntryFormat, GuideHeader, Region, RegionSelector, SortOrder};
    use crate::sources::token::MockTokenProvider;
    use crate::sources::{
        DrmPolicy, GroupPolicy, ServicePolicy, SourceCapability, TokenGrant, TokenProvider,
    };
    use crate::utils::StandardHttpClient;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashSet;

    struct StaticAdapter {
        catalog: Catalog,
        capability: SourceCapability,
        policy: ServicePolicy,
        token_provider: Option<Arc<dyn TokenProvider>>,
    }

    impl StaticAdapter {
        fn new(catalog: Catalog) -> Self {
            let capability = match catalog {
                Catalog::PassThrough(_) => SourceCapability::PassThrough,
                _ => SourceCapability::AppCatalog,
            };
            Self {
                catalog,
                capability,
                policy: ServicePolicy::default(),
                token_provider: None,
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for StaticAdapter {
        fn service_key(&self) -> &str {
            "svc"
        }

        fn capability(&self) -> SourceCapability {
            self.capability
        }

        fn policy(&self) -> ServicePolicy {
            self.policy
        }

        fn guide_header(&self, region: &RegionSelector) -> GuideHeader {
            GuideHeader::url_tvg(format!("https://guide/svc/{region}.xml.gz"))
        }

        async fn fetch(&self, _region: &RegionSelector) -> AppResult<Catalog> {
            Ok(self.catalog.clone())
        }

        fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
            self.token_provider.clone()
        }
    }

    fn pipeline() -> PlaylistPipeline {
        let config = Arc::new(Config::default());
        let client = Arc::new(StandardHttpClient::from_config(&config.upstream).unwrap());
        PlaylistPipeline::new(config, client)
    }

    fn channel(key: &str, name: &str, index: usize) -> Channel {
        Channel::new("svc", key, name, format!("https://s/{key}.m3u8"))
            .with_group(Some("News".into()))
            .with_source_index(index)
    }

    #[tokio::test]
    async fn test_all_regions_end_to_end() {
        let adapter = StaticAdapter::new(Catalog::Partitioned(vec![
            Region::new("us", None, vec![channel("x", "X", 0)]),
            Region::new("ca", None, vec![channel("x", "X", 1)]),
        ]));
        let request = PlaylistRequest::new("svc").with_region(RegionSelector::All);

        let playlist = pipeline().run(&adapter, &request).await.unwrap();
        let entries = playlist.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].channel_id, "svc-x-us");
        assert_eq!(entries[1].channel_id, "svc-x-ca");
        assert!(entries.iter().all(|e| e.guide_id == "x"));
        assert_eq!(entries[0].group.as_deref(), Some("News (UNITED STATES)"));
        assert!(playlist.render().starts_with("#EXTM3U url-tvg=\"https://guide/svc/all.xml.gz\"\n"));
    }

    #[tokio::test]
    async fn test_unknown_region_is_rejected() {
        let adapter = StaticAdapter::new(Catalog::Partitioned(vec![Region::new("us", None, vec![])]));
        let request = PlaylistRequest::new("svc").with_region(RegionSelector::Code("zz".into()));

        let err = pipeline().run(&adapter, &request).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownRegion(ref r) if r == "zz"));
    }

    #[tokio::test]
    async fn test_numbering_follows_sorted_order() {
        let adapter = StaticAdapter::new(Catalog::Flat(vec![
            channel("c", "Charlie", 0),
            channel("a", "alpha", 1),
            channel("b", "Bravo", 2),
        ]));
        let request = PlaylistRequest::new("svc")
            .with_sort(SortOrder::Name)
            .with_start_chno(Some(100));

        let playlist = pipeline().run(&adapter, &request).await.unwrap();
        let numbered: Vec<(&str, Option<u32>)> = playlist
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.number))
            .collect();
        assert_eq!(
            numbered,
            vec![("alpha", Some(100)), ("Bravo", Some(101)), ("Charlie", Some(102))]
        );
    }

    #[tokio::test]
    async fn test_token_failure_keeps_unauthenticated_urls() {
        let mut provider = MockTokenProvider::new();
        provider
            .expect_acquire()
            .times(1)
            .returning(|| Err(SourceError::Http { status: 403, url: "https://boot".into() }));

        let mut adapter = StaticAdapter::new(Catalog::Flat(vec![channel("a", "A", 0)]));
        adapter.token_provider = Some(Arc::new(provider));

        let playlist = pipeline().run(&adapter, &PlaylistRequest::new("svc")).await.unwrap();
        assert_eq!(playlist.entries()[0].url, "https://s/a.m3u8");
        assert!(playlist.render().contains("\nhttps://s/a.m3u8\n"));
    }

    #[tokio::test]
    async fn test_token_success_rewrites_urls() {
        let mut provider = MockTokenProvider::new();
        provider.expect_acquire().times(1).returning(|| {
            Ok(TokenGrant {
                token: "jwt-token".into(),
                stream_base: "https://stitcher.example".into(),
                device_id: "device".into(),
                session_id: "sid".into(),
            })
        });

        let mut adapter = StaticAdapter::new(Catalog::Flat(vec![channel("a", "A", 0)]));
        adapter.token_provider = Some(Arc::new(provider));

        let playlist = pipeline().run(&adapter, &PlaylistRequest::new("svc")).await.unwrap();
        let url = &playlist.entries()[0].url;
        assert!(url.starts_with("https://stitcher.example/v2/stitch/hls/channel/a/master.m3u8?"));
        assert!(url.ends_with("jwt=jwt-token"));
    }

    #[tokio::test]
    async fn test_drm_policy_and_format() {
        let licensed = channel("a", "A", 0)
            .with_logo(Some("https://l/a.png".into()))
            .with_drm(Some(crate::models::DrmInfo::widevine("https://lic/a")));
        let plain = channel("b", "B", 1);

        let mut excluding = StaticAdapter::new(Catalog::Flat(vec![licensed.clone(), plain.clone()]));
        excluding.policy = ServicePolicy::new(GroupPolicy::Keep, DrmPolicy::ExcludeLicensed);
        let playlist = pipeline().run(&excluding, &PlaylistRequest::new("svc")).await.unwrap();
        assert_eq!(playlist.entries().len(), 1);
        assert_eq!(playlist.entries()[0].channel_id, "svc-b");

        let mut emitting = StaticAdapter::new(Catalog::Flat(vec![licensed, plain]));
        emitting.policy = ServicePolicy::new(GroupPolicy::Omit, DrmPolicy::EmitOnlyLicensed);
        let playlist = pipeline().run(&emitting, &PlaylistRequest::new("svc")).await.unwrap();
        assert_eq!(playlist.entries().len(), 1);
        assert_eq!(playlist.entries()[0].channel_id, "svc-a");
        assert_eq!(playlist.entries()[0].group, None);
    }

    #[tokio::test]
    async fn test_pass_through_keeps_body() {
        let adapter = StaticAdapter::new(Catalog::PassThrough(
            "#EXTM3U\n#EXTINF:-1,Movie\nhttps://s/movie.m3u8\n".into(),
        ));
        let playlist = pipeline().run(&adapter, &PlaylistRequest::new("svc")).await.unwrap();
        assert!(playlist.is_pass_through());
        assert!(playlist.render().ends_with("#EXTINF:-1,Movie\nhttps://s/movie.m3u8\n"));
    }

    #[tokio::test]
    async fn test_catalog_shape_must_match_capability() {
        let mut adapter = StaticAdapter::new(Catalog::Flat(vec![channel("a", "A", 0)]));
        adapter.capability = SourceCapability::PassThrough;

        let err = pipeline().run(&adapter, &PlaylistRequest::new("svc")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(!err.is_client_error());

        adapter.capability = SourceCapability::Flat;
        assert!(pipeline().run(&adapter, &PlaylistRequest::new("svc")).await.is_ok());
    }

    #[test]
    fn test_standard_format_is_default() {
        let adapter = StaticAdapter::new(Catalog::Flat(vec![]));
        assert_eq!(adapter.entry_format(), EntryFormat::Standard);
    }

    proptest! {
        #[test]
        fn prop_composite_ids_unique(
            region_sizes in prop::collection::vec(1usize..6, 1..4),
            include_mask in prop::collection::vec(any::<bool>(), 24),
            exclude_mask in prop::collection::vec(any::<bool>(), 24),
        ) {
            let regions: Vec<Region> = region_sizes
                .iter()
                .enumerate()
                .map(|(r, n)| {
                    Region::new(
                        format!("r{r}"),
                        None,
                        (0..*n).map(|i| channel(&format!("c{i}"), &format!("C{i}"), r * 10 + i)).collect(),
                    )
                })
                .collect();

            let ids: Vec<String> = regions
                .iter()
                .flat_map(|r| r.channels.iter().map(move |c| format!("svc-{}-{}", c.key, r.code)))
                .collect();
            let pick = |mask: &[bool]| -> Vec<String> {
                ids.iter().zip(mask).filter(|(_, m)| **m).map(|(id, _)| id.clone()).collect()
            };
            let request = PlaylistRequest::new("svc")
                .with_region(RegionSelector::All)
                .with_include(pick(&include_mask))
                .with_exclude(pick(&exclude_mask));

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let adapter = StaticAdapter::new(Catalog::Partitioned(regions));
            let playlist = runtime.block_on(pipeline().run(&adapter, &request)).unwrap();

            let unique: HashSet<&str> = playlist.entries().iter().map(|e| e.channel_id.as_str()).collect();
            prop_assert_eq!(unique.len(), playlist.entries().len());
        }
    }
}
