//! Identifier normalization stage
//!
//! Sets every channel's guide identifier from its storage key with the region
//! suffix removed, and rewrites group labels according to the service's
//! group policy.

use crate::models::Channel;
use crate::sources::GroupPolicy;

/// Strip one trailing `-xx` suffix, where `xx` are two ASCII word characters
pub fn strip_region_suffix(key: &str) -> &str {
    let Some((stem, suffix)) = key.rsplit_once('-') else {
        return key;
    };
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if suffix.chars().count() == 2 && suffix.chars().all(is_word) {
        stem
    } else {
        key
    }
}

pub struct IdentifierNormalizer {
    group_policy: GroupPolicy,
}

impl IdentifierNormalizer {
    pub fn new(group_policy: GroupPolicy) -> Self {
        Self { group_policy }
    }

    pub fn process(&self, channels: &mut [Channel]) {
        normalize_guide_ids(channels);
        for channel in channels.iter_mut() {
            channel.group = apply_group_policy(self.group_policy, channel);
        }
    }
}

/// `guide_key := strip(key)` for every channel
///
/// Derived from the storage key alone, so running it again changes nothing.
pub fn normalize_guide_ids(channels: &mut [Channel]) {
    for channel in channels.iter_mut() {
        channel.guide_key = strip_region_suffix(&channel.key).to_string();
    }
}

fn apply_group_policy(policy: GroupPolicy, channel: &Channel) -> Option<String> {
    match (policy, channel.region_name.as_deref()) {
        (GroupPolicy::Omit, _) => None,
        (GroupPolicy::Blank, _) => Some(String::new()),
        (GroupPolicy::ReplaceWithRegion, Some(region)) => Some(region.to_string()),
        (GroupPolicy::AppendRegion, Some(region)) => Some(format!(
            "{} ({})",
            channel.group.as_deref().unwrap_or_default(),
            region.to_uppercase()
        )),
        (GroupPolicy::Keep | GroupPolicy::ReplaceWithRegion | GroupPolicy::AppendRegion, _) => {
            channel.group.clone()
        }
    }
}
