//! Service registry and source adapter factory
//!
//! The `service` selector is matched case-insensitively against the known
//! services; anything else is served by the generic app-catalog adapter using
//! the name exactly as supplied.

use std::sync::Arc;

use crate::config::Config;
use crate::utils::DecompressingHttpClient;

use super::app_catalog::AppCatalogAdapter;
use super::pbs::PbsAdapter;
use super::plex::PlexAdapter;
use super::pluto::PlutoAdapter;
use super::token::PlutoSessionTokenProvider;
use super::traits::{DrmPolicy, GroupPolicy, ServicePolicy, SourceAdapter};
use super::tubi::TubiAdapter;

/// A resolved `service` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Service {
    PlutoTv,
    Plex,
    Pbs,
    PbsKids,
    Tubi,
    Roku,
    SamsungTvPlus,
    Stirr,
    /// Any other i.mjh.nz app catalog, name as supplied
    Other(String),
}

impl Service {
    pub fn from_selector(selector: &str) -> Self {
        let selector = selector.trim();
        match selector.to_lowercase().as_str() {
            "plutotv" => Service::PlutoTv,
            "plex" => Service::Plex,
            "pbs" => Service::Pbs,
            "pbskids" => Service::PbsKids,
            "tubi" => Service::Tubi,
            "roku" => Service::Roku,
            "samsungtvplus" => Service::SamsungTvPlus,
            "stirr" => Service::Stirr,
            _ => Service::Other(selector.to_string()),
        }
    }

    /// Services advertised on the home page
    pub fn known() -> [Service; 8] {
        [
            Service::Plex,
            Service::Roku,
            Service::SamsungTvPlus,
            Service::PlutoTv,
            Service::Pbs,
            Service::PbsKids,
            Service::Stirr,
            Service::Tubi,
        ]
    }

    /// Lowercase key used in composite identifiers and config lookups
    pub fn key(&self) -> String {
        match self {
            Service::Other(name) => name.to_lowercase(),
            known => known.upstream_name().to_lowercase(),
        }
    }

    /// Directory name on the catalog and guide hosts
    pub fn upstream_name(&self) -> &str {
        match self {
            Service::PlutoTv => "PlutoTV",
            Service::Plex => "Plex",
            Service::Pbs => "PBS",
            Service::PbsKids => "PBSKids",
            Service::Tubi => "Tubi",
            Service::Roku => "Roku",
            Service::SamsungTvPlus => "SamsungTVPlus",
            Service::Stirr => "Stirr",
            Service::Other(name) => name,
        }
    }

    pub fn policy(&self) -> ServicePolicy {
        match self {
            Service::Pbs => ServicePolicy::new(GroupPolicy::Omit, DrmPolicy::EmitOnlyLicensed),
            Service::PbsKids => ServicePolicy::new(GroupPolicy::Omit, DrmPolicy::ExcludeLicensed),
            Service::Roku => ServicePolicy::new(GroupPolicy::Blank, DrmPolicy::ExcludeLicensed),
            Service::PlutoTv | Service::Plex | Service::SamsungTvPlus => {
                ServicePolicy::new(GroupPolicy::ReplaceWithRegion, DrmPolicy::ExcludeLicensed)
            }
            Service::Tubi => ServicePolicy::new(GroupPolicy::Keep, DrmPolicy::ExcludeLicensed),
            Service::Stirr | Service::Other(_) => ServicePolicy::default(),
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.upstream_name())
    }
}

/// Factory for creating source adapters
pub struct SourceAdapterFactory;

impl SourceAdapterFactory {
    /// Create the adapter serving `service`
    pub fn create_adapter(
        service: &Service,
        config: &Config,
        http_client: Arc<dyn DecompressingHttpClient>,
    ) -> Arc<dyn SourceAdapter> {
        match service {
            Service::PlutoTv => {
                let pluto = &config.services.pluto;
                let adapter = PlutoAdapter::new(&config.upstream, http_client.clone());
                if pluto.token_bootstrap {
                    let provider = PlutoSessionTokenProvider::new(pluto.clone(), http_client);
                    Arc::new(adapter.with_token_provider(Arc::new(provider)))
                } else {
                    Arc::new(adapter)
                }
            }
            Service::Plex => Arc::new(PlexAdapter::new(
                &config.upstream,
                &config.services.plex,
                http_client,
            )),
            Service::Pbs => Arc::new(PbsAdapter::pbs(&config.upstream, &config.services.drm, http_client)),
            Service::PbsKids => Arc::new(PbsAdapter::kids(&config.upstream, http_client)),
            Service::Tubi => Arc::new(TubiAdapter::new(&config.services.tubi, http_client)),
            other => Arc::new(AppCatalogAdapter::new(other.clone(), &config.upstream, http_client)),
        }
    }
}
