//! Utility modules for the lineup service
//!
//! Upstream fetching (with transparent decompression) and URL helpers shared
//! by the source adapters.

pub mod decompression;
pub mod http_client;
pub mod url;

pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::{DecompressingHttpClient, StandardHttpClient, decode_json};
pub use url::UrlUtils;
