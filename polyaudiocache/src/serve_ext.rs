//! HTTP surface of the streaming cache.
//!
//! Exposes `GET /stream/{id}` with an optional `?next=` query naming another
//! composite id to warm opportunistically once the primary response has been
//! dispatched. The router is meant to be mounted at the server root.

use crate::engine::StreamEngine;
use crate::prefetch::Prefetcher;
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use polysource::{ManagerRegistry, Session};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Session tokens ride on this header; issuing them is out of scope here
pub const SESSION_HEADER: &str = "x-session-token";

/// Shared state behind the stream route
pub struct StreamState {
    pub engine: StreamEngine,
    pub prefetcher: Arc<Prefetcher>,
    pub registry: Arc<ManagerRegistry>,
    /// Disabling this ignores `?next=` hints entirely
    pub prefetch_enabled: bool,
}

/// Builds the router serving `GET /stream/{id}`
pub fn stream_router(state: Arc<StreamState>) -> Router {
    Router::new()
        .route("/stream/{id}", get(stream_track))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct StreamParams {
    /// Composite id to prefetch after the primary response is dispatched
    next: Option<String>,
}

/// `GET /stream/{id}` — the opaque id arrives percent-decoded via the axum
/// path extractor; the inbound `Range` header, if any, is handed to the
/// engine verbatim.
async fn stream_track(
    State(state): State<Arc<StreamState>>,
    Path(opaque_id): Path<String>,
    Query(params): Query<StreamParams>,
    headers: HeaderMap,
) -> Response {
    let manager = match session_from(&headers) {
        Some(session) => state.registry.manager_for(&session).await,
        None => state.registry.ensure_fallback().await,
    };
    let manager = match manager {
        Ok(manager) => manager,
        Err(e) => {
            warn!("Source manager unavailable: {e}");
            return Response::builder()
                .status(StatusCode::BAD_GATEWAY)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(Body::from(format!("source manager unavailable: {e}")))
                .expect("static response construction");
        }
    };

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = state.engine.serve(&manager, &opaque_id, range.as_deref()).await;

    // Fire-and-forget: the primary response never waits on the warm-up
    if state.prefetch_enabled {
        if let Some(next) = params.next {
            let prefetcher = Arc::clone(&state.prefetcher);
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                prefetcher.prefetch(&manager, &next).await;
            });
        }
    }

    response
}

fn session_from(headers: &HeaderMap) -> Option<Session> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|token| !token.is_empty())
        .map(Session::new)
}
