//! Playlist handlers

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::web::{
    AppState,
    extractors::PlaylistQuery,
    responses::{handle_error, playlist_response},
};

use super::index::home_page;

/// `GET /`: the home page without a `service`, otherwise the playlist
pub async fn root(State(state): State<AppState>, Query(query): Query<PlaylistQuery>) -> Response {
    if !query.has_service() {
        return home_page(&state).into_response();
    }
    serve_playlist(&state, query).await
}

/// `GET /playlist.m3u8`
pub async fn playlist(State(state): State<AppState>, Query(query): Query<PlaylistQuery>) -> Response {
    serve_playlist(&state, query).await
}

async fn serve_playlist(state: &AppState, query: PlaylistQuery) -> Response {
    let request = match query.into_request() {
        Ok(request) => request,
        Err(e) => return handle_error(e),
    };
    debug!(
        "Playlist request service={} region={} sort={:?}",
        request.service, request.region, request.sort
    );

    match state.pipeline.generate(&request).await {
        Ok(playlist) => playlist_response(&playlist),
        Err(e) => handle_error(e),
    }
}
