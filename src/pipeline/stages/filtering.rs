//! Filtering stage
//!
//! Applies the service's DRM policy, then the include whitelist, then the
//! exclude list. Identifiers are matched against `<service>-<key>`; the
//! service prefix is case-insensitive, the channel key is not.

use std::collections::HashSet;
use tracing::debug;

use crate::models::Channel;
use crate::sources::DrmPolicy;

pub struct FilteringStage {
    drm_policy: DrmPolicy,
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl FilteringStage {
    pub fn new(
        service_key: &str,
        drm_policy: DrmPolicy,
        include: &[String],
        exclude: &[String],
    ) -> Self {
        let normalize = |ids: &[String]| -> HashSet<String> {
            ids.iter()
                .map(|id| normalize_identifier(service_key, id))
                .collect()
        };
        Self {
            drm_policy,
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    pub fn process(&self, channels: Vec<Channel>) -> Vec<Channel> {
        let before = channels.len();
        let kept: Vec<Channel> = channels.into_iter().filter(|c| self.accepts(c)).collect();
        debug!(
            "Filtering kept {} of {} channels ({} include, {} exclude)",
            kept.len(),
            before,
            self.include.len(),
            self.exclude.len()
        );
        kept
    }

    fn accepts(&self, channel: &Channel) -> bool {
        let drm_ok = match self.drm_policy {
            DrmPolicy::ExcludeLicensed => !channel.has_license(),
            DrmPolicy::EmitOnlyLicensed => channel.is_drm_complete(),
        };
        if !drm_ok {
            return false;
        }

        let id = channel.composite_id();
        (self.include.is_empty() || self.include.contains(&id)) && !self.exclude.contains(&id)
    }
}

/// Rewrite a `<Service>-<key>` identifier onto the lowercase service key
fn normalize_identifier(service_key: &str, id: &str) -> String {
    let split = service_key.len();
    match (id.get(..split), id.get(split..)) {
        (Some(prefix), Some(rest))
            if rest.starts_with('-') && prefix.to_lowercase() == service_key =>
        {
            format!("{service_key}{rest}")
        }
        _ => id.to_string(),
    }
}
