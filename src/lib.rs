//! Aggregates free streaming-service channel lineups into M3U playlists.
//!
//! A request names a service and region; the matching source adapter fetches
//! the upstream catalog and the [`pipeline`] turns it into a playlist.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;
pub mod web;
