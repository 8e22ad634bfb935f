//! HTTP response types and error mapping
//!
//! Playlists and errors are plain text; `/health` is the only JSON endpoint.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::AppError;
use crate::models::Playlist;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Serve a rendered playlist
pub fn playlist_response(playlist: &Playlist) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        playlist.render(),
    )
        .into_response()
}

/// Map an application error onto a `text/plain` status response
pub fn handle_error(error: AppError) -> Response {
    let status = if error.is_client_error() {
        warn!("Rejected request: {}", error);
        StatusCode::BAD_REQUEST
    } else {
        error!("Request failed: {}", error);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        format!("Error: {error}"),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}
