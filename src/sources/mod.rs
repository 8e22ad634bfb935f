//! Source adapters
//!
//! One adapter per upstream service. Each implements [`SourceAdapter`] and is
//! created by [`SourceAdapterFactory`] from the resolved [`Service`].
//!
//! - [`app_catalog`]: generic i.mjh.nz `.app.json` catalogs (Roku, Samsung TV Plus, Stirr, ...)
//! - [`pluto`]: Pluto TV, with optional session tokens ([`token`])
//! - [`plex`]: Plex, with the genre cross-reference feed
//! - [`pbs`]: PBS (DRM) and PBS Kids
//! - [`tubi`]: Tubi pass-through playlist

pub mod app_catalog;
pub mod factory;
pub mod pbs;
pub mod plex;
pub mod pluto;
pub mod records;
pub mod token;
pub mod traits;
pub mod tubi;

pub use factory::{Service, SourceAdapterFactory};
pub use token::{PlutoSessionTokenProvider, TokenGrant, TokenProvider};
pub use traits::*;
