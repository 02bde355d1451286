//! HTTP routes for originals, thumbnails, and health.

use crate::headers::backend_header_middleware;
use crate::response::{ApiError, ResolvedResponse, internal_error};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use thumbra_core::{ImageLocator, ThumbnailLocator};
use thumbra_engine::{Conditions, Engine, Resolution};
use thumbra_error::ThumbraResult;

/// Route serving originals.
pub const ORIGINAL_ROUTE: &str = "/:wiki/:hash1/:hash2/:filename/revision/:revision";

/// Route serving thumbnails.
pub const THUMBNAIL_ROUTE: &str =
    "/:wiki/:hash1/:hash2/:filename/revision/:revision/scale-to-width/:width";

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: Engine,
    request_timeout: Duration,
}

impl AppState {
    /// Creates new state; `request_timeout` bounds each request's processing.
    pub fn new(engine: Engine, request_timeout: Duration) -> Self {
        Self {
            engine,
            request_timeout,
        }
    }

    /// The resolution engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// Path segments of an original request.
#[derive(Debug, Deserialize)]
pub struct OriginalPath {
    wiki: String,
    hash1: String,
    hash2: String,
    filename: String,
    revision: String,
}

impl From<OriginalPath> for ImageLocator {
    fn from(path: OriginalPath) -> Self {
        ImageLocator::new(path.wiki, path.hash1, path.hash2, path.filename, path.revision)
    }
}

/// Path segments of a thumbnail request.
#[derive(Debug, Deserialize)]
pub struct ThumbnailPath {
    wiki: String,
    hash1: String,
    hash2: String,
    filename: String,
    revision: String,
    width: String,
}

impl From<ThumbnailPath> for ThumbnailLocator {
    fn from(path: ThumbnailPath) -> Self {
        ThumbnailLocator::new(
            ImageLocator::new(path.wiki, path.hash1, path.hash2, path.filename, path.revision),
            path.width,
        )
    }
}

/// Creates the media router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(ORIGINAL_ROUTE, get(serve_original))
        .route(THUMBNAIL_ROUTE, get(serve_thumbnail))
        .with_state(state)
        .layer(middleware::from_fn(backend_header_middleware))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[tracing::instrument(skip(state, headers))]
async fn serve_original(
    State(state): State<AppState>,
    Path(path): Path<OriginalPath>,
    headers: HeaderMap,
) -> Response {
    let locator = ImageLocator::from(path);
    let conditions = conditions(&headers);
    bounded(
        state.request_timeout,
        state.engine.resolve_original(&locator, &conditions),
    )
    .await
}

#[tracing::instrument(skip(state, headers))]
async fn serve_thumbnail(
    State(state): State<AppState>,
    Path(path): Path<ThumbnailPath>,
    headers: HeaderMap,
) -> Response {
    let locator = ThumbnailLocator::from(path);
    let conditions = conditions(&headers);
    bounded(
        state.request_timeout,
        state.engine.resolve_thumbnail(&locator, &conditions),
    )
    .await
}

/// Run a resolution under the request bound and render the outcome.
async fn bounded<F>(limit: Duration, resolution: F) -> Response
where
    F: Future<Output = ThumbraResult<Resolution>>,
{
    match tokio::time::timeout(limit, resolution).await {
        Ok(Ok(resolution)) => ResolvedResponse(resolution).into_response(),
        Ok(Err(e)) => ApiError(e).into_response(),
        Err(_) => {
            tracing::error!(limit_secs = limit.as_secs(), "Request exceeded processing bound");
            internal_error()
        }
    }
}

/// Client validators; unreadable header values count as absent.
fn conditions(headers: &HeaderMap) -> Conditions {
    let read = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Conditions::new(read(header::IF_NONE_MATCH), read(header::IF_MODIFIED_SINCE))
}
