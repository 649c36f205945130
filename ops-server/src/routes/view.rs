//! Read-view proxy routes
//!
//! Views are whole JSON arrays relayed from the object store, with a
//! short CDN cache window so a stampede of dashboard tabs does not
//! hammer upstream.

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use http::{HeaderValue, header};
use serde_json::Value;

use crate::error::{RequestId, RouteError, RouteResult};
use crate::state::ServerState;
use crate::upstream::UpstreamError;

const CACHE_CONTROL: &str = "s-maxage=300, stale-while-revalidate=60";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/view/item-metrics", get(item_metrics))
        .route("/api/view/mirror-mismatch", get(mirror_mismatch))
        .route("/api/view/unmapped-listings", get(unmapped_listings))
        .route(
            "/api/view/yahoo-unmapped-listings",
            get(yahoo_unmapped_listings),
        )
        .route("/api/view/listing-snapshot", get(listing_snapshot))
}

fn cached_json(value: Value) -> Response {
    let mut response = axum::Json(value).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL),
    );
    response
}

async fn relay_view(
    request_id: RequestId,
    result: Result<Value, UpstreamError>,
) -> RouteResult<Response> {
    let value = result.map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(cached_json(value))
}

async fn item_metrics(
    State(state): State<ServerState>,
    request_id: RequestId,
) -> RouteResult<Response> {
    relay_view(request_id, state.views.item_metrics().await).await
}

async fn mirror_mismatch(
    State(state): State<ServerState>,
    request_id: RequestId,
) -> RouteResult<Response> {
    relay_view(request_id, state.views.mirror_mismatch().await).await
}

async fn unmapped_listings(
    State(state): State<ServerState>,
    request_id: RequestId,
) -> RouteResult<Response> {
    relay_view(request_id, state.views.unmapped_listings().await).await
}

async fn yahoo_unmapped_listings(
    State(state): State<ServerState>,
    request_id: RequestId,
) -> RouteResult<Response> {
    relay_view(request_id, state.views.yahoo_unmapped_listings().await).await
}

async fn listing_snapshot(
    State(state): State<ServerState>,
    request_id: RequestId,
) -> RouteResult<Response> {
    relay_view(request_id, state.views.listing_snapshot().await).await
}
