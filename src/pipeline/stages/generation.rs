//! Playlist generation stage

use tracing::debug;

use crate::models::{Channel, EntryFormat, GuideHeader, Playlist, PlaylistEntry};

pub struct GenerationStage {
    header: GuideHeader,
    format: EntryFormat,
}

impl GenerationStage {
    pub fn new(header: GuideHeader, format: EntryFormat) -> Self {
        Self { header, format }
    }

    pub fn process(self, channels: Vec<Channel>) -> Playlist {
        let drm = matches!(self.format, EntryFormat::Drm { .. });
        let total = channels.len();

        let entries: Vec<PlaylistEntry> = channels
            .into_iter()
            .filter(|channel| {
                let renderable = !drm || channel.is_drm_complete();
                if !renderable {
                    debug!("Skipping {}: incomplete DRM data", channel.composite_id());
                }
                renderable
            })
            .map(|channel| PlaylistEntry {
                channel_id: channel.composite_id(),
                name: channel.name,
                guide_id: channel.guide_key,
                logo: channel.logo.unwrap_or_default(),
                group: channel.group,
                number: channel.number,
                url: channel.stream_url,
                drm: channel.drm,
            })
            .collect();

        debug!("Generated {} of {} entries", entries.len(), total);
        Playlist::new(self.header, self.format, entries)
    }

    /// Upstream playlist with only the header rewritten
    pub fn pass_through(self, body: &str) -> Playlist {
        Playlist::pass_through(self.header, body)
    }
}
