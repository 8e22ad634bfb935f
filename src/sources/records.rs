//! Mapping raw upstream channel records onto [`Channel`]

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{Channel, ChannelFields};
use crate::utils::UrlUtils;

/// Where a record's stream URL comes from
#[derive(Debug, Clone, Copy)]
pub enum StreamUrlSource<'a> {
    /// The record's own `url` field
    Record,
    /// A template with `{id}` replaced by the record key
    Template(&'a str),
}

/// Map one record; `None` for records without a usable name or stream URL
pub fn channel_from_record(
    service_key: &str,
    key: &str,
    value: Value,
    stream: StreamUrlSource<'_>,
) -> Option<(Channel, ChannelFields)> {
    let Some(fields) = ChannelFields::from_value(value) else {
        debug!("Skipping malformed {} record {}", service_key, key);
        return None;
    };

    let Some(name) = fields.display_name() else {
        debug!("Skipping {} record {} without a name", service_key, key);
        return None;
    };

    let stream_url = match stream {
        StreamUrlSource::Record => match fields.stream_url() {
            Some(url) => url.to_string(),
            None => {
                debug!("Skipping {} record {} without a stream URL", service_key, key);
                return None;
            }
        },
        StreamUrlSource::Template(template) => UrlUtils::fill_template(template, key),
    };

    let channel = Channel::new(service_key, key, name, stream_url)
        .with_logo(fields.logo.clone())
        .with_number(fields.chno)
        .with_drm(fields.drm());

    Some((channel, fields))
}

/// Map a `{key: record}` object in document order
///
/// Source indices continue from `offset` so that indices stay unique when
/// several mappings feed one catalog.
pub fn channels_from_map(
    service_key: &str,
    records: Map<String, Value>,
    stream: StreamUrlSource<'_>,
    offset: usize,
) -> Vec<Channel> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, (key, value))| {
            channel_from_record(service_key, &key, value, stream).map(|(channel, fields)| {
                channel
                    .with_group(Some(fields.group.unwrap_or_default()))
                    .with_source_index(offset + index)
            })
        })
        .collect()
}
