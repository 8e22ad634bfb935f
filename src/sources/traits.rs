//! Source adapter trait definitions
//!
//! Every upstream service is reached through a [`SourceAdapter`]. Adapters
//! only fetch and map; region resolution, filtering, ordering and rendering
//! happen in the pipeline, steered by the [`ServicePolicy`] each adapter
//! reports.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::models::{Catalog, EntryFormat, GuideHeader, RegionSelector};

use super::token::TokenProvider;

/// Shape of what an adapter's fetch yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCapability {
    /// One channel mapping, region selector ignored
    Flat,
    /// Channels partitioned by region
    RegionPartitioned,
    /// Upstream playlist proxied verbatim
    PassThrough,
    /// Either `Flat` or `RegionPartitioned`, decided by the fetched document
    AppCatalog,
}

impl SourceCapability {
    /// Whether a fetched catalog has the shape this capability promises
    pub fn admits(&self, catalog: &Catalog) -> bool {
        matches!(
            (self, catalog),
            (SourceCapability::Flat, Catalog::Flat(_))
                | (SourceCapability::RegionPartitioned, Catalog::Partitioned(_))
                | (SourceCapability::PassThrough, Catalog::PassThrough(_))
                | (SourceCapability::AppCatalog, Catalog::Flat(_) | Catalog::Partitioned(_))
        )
    }
}

/// How a channel's group label is rewritten once regions are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPolicy {
    /// Leave the source group as-is
    Keep,
    /// Always emit an empty group
    Blank,
    /// No group attribute at all
    Omit,
    /// Use the owning region's display name when the channel carries one
    ReplaceWithRegion,
    /// Append ` (<REGION NAME>)` when the channel carries a region
    AppendRegion,
}

/// Which channels a service may emit with respect to license data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrmPolicy {
    /// Drop every channel that carries a license reference
    ExcludeLicensed,
    /// Emit only channels with complete DRM data, rendered with key lines
    EmitOnlyLicensed,
}

/// Per-service rendering and filtering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePolicy {
    pub group: GroupPolicy,
    pub drm: DrmPolicy,
}

impl ServicePolicy {
    pub const fn new(group: GroupPolicy, drm: DrmPolicy) -> Self {
        Self { group, drm }
    }

    pub fn emits_drm(&self) -> bool {
        self.drm == DrmPolicy::EmitOnlyLicensed
    }
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self::new(GroupPolicy::AppendRegion, DrmPolicy::ExcludeLicensed)
    }
}

/// Core source adapter trait
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Lowercase key used in composite channel identifiers
    fn service_key(&self) -> &str;

    fn capability(&self) -> SourceCapability;

    fn policy(&self) -> ServicePolicy;

    /// Header line referencing the guide for `region`
    fn guide_header(&self, region: &RegionSelector) -> GuideHeader;

    /// How entries are rendered
    fn entry_format(&self) -> EntryFormat {
        EntryFormat::Standard
    }

    /// Fetch and map the upstream catalog
    async fn fetch(&self, region: &RegionSelector) -> AppResult<Catalog>;

    /// Token provider for services whose streams need a bearer token
    fn token_provider(&self) -> Option<Arc<dyn TokenProvider>> {
        None
    }
}
