//! Domain model for lineup aggregation
//!
//! - [`channel`]: the normalized channel entity and the raw upstream record
//! - [`catalog`]: per-adapter fetch results (flat, partitioned, pass-through)
//! - [`request`]: the parsed request selector
//! - [`playlist`]: the immutable rendered artifact

pub mod catalog;
pub mod channel;
pub mod playlist;
pub mod request;

pub use catalog::{Catalog, CatalogDocument, Region, RegionDocument};
pub use channel::{Channel, ChannelFields, DrmInfo, KeySystem};
pub use playlist::{EntryFormat, GuideAttribute, GuideHeader, Playlist, PlaylistEntry};
pub use request::{PlaylistRequest, RegionSelector, SortOrder};
