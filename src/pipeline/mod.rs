//! Playlist synthesis pipeline
//!
//! [`PlaylistPipeline`] drives a [`crate::sources::SourceAdapter`] through the
//! [`stages`] and yields an immutable [`crate::models::Playlist`].

pub mod orchestrator;
pub mod stages;

pub use orchestrator::PlaylistPipeline;
