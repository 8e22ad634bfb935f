use std::fmt;

use super::channel::DrmInfo;

/// Header attribute naming the guide URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAttribute {
    UrlTvg,
    XTvgUrl,
}

impl GuideAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideAttribute::UrlTvg => "url-tvg",
            GuideAttribute::XTvgUrl => "x-tvg-url",
        }
    }
}

/// The `#EXTM3U` line carrying the guide reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideHeader {
    pub attribute: GuideAttribute,
    pub url: String,
}

impl GuideHeader {
    pub fn url_tvg<S: Into<String>>(url: S) -> Self {
        Self {
            attribute: GuideAttribute::UrlTvg,
            url: url.into(),
        }
    }

    pub fn x_tvg_url<S: Into<String>>(url: S) -> Self {
        Self {
            attribute: GuideAttribute::XTvgUrl,
            url: url.into(),
        }
    }
}

impl fmt::Display for GuideHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#EXTM3U {}=\"{}\"", self.attribute.as_str(), self.url)
    }
}

/// How entries are written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFormat {
    /// `#EXTINF` line followed by the stream URL
    Standard,
    /// `#EXTINF`, three `#KODIPROP` lines, then the URL with a user-agent suffix.
    /// `user_agent` is already percent-encoded.
    Drm { user_agent: String },
}

/// One rendered lineup entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub channel_id: String,
    pub name: String,
    pub guide_id: String,
    pub logo: String,
    pub group: Option<String>,
    pub number: Option<u32>,
    pub url: String,
    pub drm: Option<DrmInfo>,
}

impl PlaylistEntry {
    fn write_to(&self, format: &EntryFormat, out: &mut String) {
        out.push_str(&format!(
            "#EXTINF:-1 channel-id=\"{}\" tvg-name=\"{}\" tvg-id=\"{}\" tvg-logo=\"{}\"",
            attribute_value(&self.channel_id),
            attribute_value(&self.name),
            attribute_value(&self.guide_id),
            attribute_value(&self.logo),
        ));
        if let Some(group) = &self.group {
            out.push_str(&format!(" group-title=\"{}\"", attribute_value(group)));
        }
        if let Some(number) = self.number {
            out.push_str(&format!(" tvg-chno=\"{number}\""));
        }
        out.push(',');
        out.push_str(&self.name);
        out.push('\n');

        match (format, &self.drm) {
            (EntryFormat::Drm { user_agent }, Some(drm)) => {
                out.push_str("#KODIPROP:inputstream.adaptive.manifest_type=mpd\n");
                out.push_str(&format!(
                    "#KODIPROP:inputstream.adaptive.license_type={}\n",
                    drm.key_system.as_str()
                ));
                out.push_str(&format!(
                    "#KODIPROP:inputstream.adaptive.license_key={}|Content-Type=application%2Foctet-stream&user-agent={}|R{{SSM}}|\n",
                    drm.license_url, user_agent
                ));
                out.push_str(&format!("{}|user-agent={}\n", self.url, user_agent));
            }
            _ => {
                out.push_str(&self.url);
                out.push('\n');
            }
        }
    }
}

/// Double quotes would terminate the attribute early
fn attribute_value(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains('"') {
        value.replace('"', "'").into()
    } else {
        value.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlaylistContent {
    Entries {
        format: EntryFormat,
        entries: Vec<PlaylistEntry>,
    },
    /// Upstream body with its header already rewritten
    Verbatim(String),
}

/// Rendered playlist, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    header: GuideHeader,
    content: PlaylistContent,
}

impl Playlist {
    pub fn new(header: GuideHeader, format: EntryFormat, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            header,
            content: PlaylistContent::Entries { format, entries },
        }
    }

    /// Wrap an upstream playlist, replacing its `#EXTM3U` line with `header`
    /// (or prepending `header` when the body has none)
    pub fn pass_through(header: GuideHeader, body: &str) -> Self {
        let body = body.trim_start_matches('\u{feff}');
        let rest = match body.split_once('\n') {
            Some((first, rest)) if first.trim_start().starts_with("#EXTM3U") => rest,
            None if body.trim_start().starts_with("#EXTM3U") => "",
            _ => body,
        };
        let mut text = header.to_string();
        text.push('\n');
        text.push_str(rest);

        Self {
            header,
            content: PlaylistContent::Verbatim(text),
        }
    }

    /// Structured entries; empty for a pass-through playlist
    pub fn entries(&self) -> &[PlaylistEntry] {
        match &self.content {
            PlaylistContent::Entries { entries, .. } => entries,
            PlaylistContent::Verbatim(_) => &[],
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.content, PlaylistContent::Verbatim(_))
    }

    pub fn render(&self) -> String {
        match &self.content {
            PlaylistContent::Verbatim(text) => text.clone(),
            PlaylistContent::Entries { format, entries } => {
                let mut out = self.header.to_string();
                out.push('\n');
                for entry in entries {
                    entry.write_to(format, &mut out);
                }
                out
            }
        }
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
