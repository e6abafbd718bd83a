//! Aggregation API.
//!
//! JSON endpoints over the assembled source managers: multi-source search,
//! playlist listings, and track listings, all in canonical shapes. Mounted
//! under `/api` by the binary.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use polyaudiocache::SESSION_HEADER;
use polysource::{ManagerRegistry, MusicSourceError, Session, SourceManager, SourceTag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub fn api_router(registry: Arc<ManagerRegistry>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/sources", get(sources))
        .route("/{source}/playlists", get(playlists))
        .route("/{source}/playlists/{playlist_id}/tracks", get(playlist_tracks))
        .route("/{source}/albums/{album_id}/tracks", get(album_tracks))
        .with_state(registry)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps source errors onto API statuses
fn source_error(e: MusicSourceError) -> Response {
    let status = match &e {
        MusicSourceError::NoSourceForTag(_)
        | MusicSourceError::NotSupported(_)
        | MusicSourceError::SearchNotSupported
        | MusicSourceError::TrackNotFound(_) => StatusCode::NOT_FOUND,
        MusicSourceError::Auth(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, e.to_string())
}

async fn manager_from(
    registry: &ManagerRegistry,
    headers: &HeaderMap,
) -> Result<Arc<SourceManager>, Response> {
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|token| !token.is_empty())
        .map(Session::new);

    let manager = match session {
        Some(session) => registry.manager_for(&session).await,
        None => registry.ensure_fallback().await,
    };

    manager.map_err(|e| {
        warn!("Source manager unavailable: {e}");
        error_response(StatusCode::BAD_GATEWAY, e.to_string())
    })
}

fn parse_tag(source: &str) -> Result<SourceTag, Response> {
    SourceTag::parse(source)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("unknown source '{source}'")))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

/// `GET /api/search?q=` — fan-out over every search-capable source
async fn search(
    State(registry): State<Arc<ManagerRegistry>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Response {
    let manager = match manager_from(&registry, &headers).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    Json(manager.search_all(&params.q).await).into_response()
}

/// `GET /api/sources` — tags available to the caller's manager
async fn sources(
    State(registry): State<Arc<ManagerRegistry>>,
    headers: HeaderMap,
) -> Response {
    let manager = match manager_from(&registry, &headers).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    let tags: Vec<String> = manager.tags().iter().map(|t| t.to_string()).collect();
    Json(serde_json::json!({ "sources": tags })).into_response()
}

/// `GET /api/{source}/playlists`
async fn playlists(
    State(registry): State<Arc<ManagerRegistry>>,
    Path(source): Path<String>,
    headers: HeaderMap,
) -> Response {
    let tag = match parse_tag(&source) {
        Ok(tag) => tag,
        Err(response) => return response,
    };
    let manager = match manager_from(&registry, &headers).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    match manager.list_playlists(tag).await {
        Ok(playlists) => Json(playlists).into_response(),
        Err(e) => source_error(e),
    }
}

/// `GET /api/{source}/playlists/{playlist_id}/tracks`
async fn playlist_tracks(
    State(registry): State<Arc<ManagerRegistry>>,
    Path((source, playlist_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let tag = match parse_tag(&source) {
        Ok(tag) => tag,
        Err(response) => return response,
    };
    let manager = match manager_from(&registry, &headers).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    match manager.playlist_tracks(tag, &playlist_id).await {
        Ok(tracks) => Json(tracks).into_response(),
        Err(e) => source_error(e),
    }
}

/// `GET /api/{source}/albums/{album_id}/tracks`
async fn album_tracks(
    State(registry): State<Arc<ManagerRegistry>>,
    Path((source, album_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let tag = match parse_tag(&source) {
        Ok(tag) => tag,
        Err(response) => return response,
    };
    let manager = match manager_from(&registry, &headers).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };
    match manager.album_tracks(tag, &album_id).await {
        Ok(tracks) => Json(tracks).into_response(),
        Err(e) => source_error(e),
    }
}
