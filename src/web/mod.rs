//! Web layer module
//!
//! Thin axum front end over [`PlaylistPipeline`]:
//! - **Handlers**: home page, playlist and health endpoints
//! - **Responses**: `text/plain` playlists and error mapping
//! - **Extractors**: query parameter parsing

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::pipeline::PlaylistPipeline;
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

pub mod extractors;
pub mod handlers;
pub mod responses;

/// Shared, immutable per-process state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<PlaylistPipeline>,
}

impl AppState {
    pub fn new(config: Arc<Config>, http_client: Arc<dyn DecompressingHttpClient>) -> Self {
        let pipeline = Arc::new(PlaylistPipeline::new(config.clone(), http_client));
        Self { config, pipeline }
    }

    /// State backed by a reqwest client built from the upstream configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let http_client = StandardHttpClient::from_config(&config.upstream)
            .context("Failed to build upstream HTTP client")?;
        Ok(Self::new(Arc::new(config), Arc::new(http_client)))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::playlist::root))
        .route("/playlist.m3u8", get(handlers::playlist::playlist))
        .route("/health", get(handlers::health::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", state.config.web.host, state.config.web.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    state.config.web.host, state.config.web.port
                )
            })?;

        Ok(Self {
            app: router(state),
            addr,
        })
    }

    /// Start the web server, stopping on Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        info!("Listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
