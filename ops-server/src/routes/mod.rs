use axum::Json;
use axum::Router;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use http::{HeaderName, HeaderValue};
use serde_json::Value;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId as TowerRequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::RequestId;
use crate::middleware;
use crate::state::ServerState;

pub mod health;
pub mod master;
pub mod po;
pub mod view;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<TowerRequestId> {
        let id = Uuid::new_v4().to_string();
        Some(TowerRequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Relay an upstream envelope verbatim at HTTP 200.
///
/// Business rejections (`ok:false` with codes like `not_found` or
/// `cannot_delete_sent`) are data, not proxy faults, so the status
/// stays 200 and the browser client branches on the body.
pub(crate) fn relay(request_id: &RequestId, operation: &str, value: Value) -> Response {
    if value.get("ok") == Some(&Value::Bool(false)) {
        let code = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::warn!(
            request_id = %request_id.0,
            operation = %operation,
            code = %code,
            "upstream rejected the operation"
        );
    }
    Json(value).into_response()
}

/// Decode and validate an inbound JSON payload, or reject with 400
pub(crate) fn decode_payload<T>(request_id: &RequestId, raw: Value) -> Result<T, crate::error::RouteError>
where
    T: serde::de::DeserializeOwned + validator::Validate,
{
    let payload: T = serde_json::from_value(raw).map_err(|e| {
        crate::error::RouteError::bad_request(request_id, format!("invalid payload: {e}"))
    })?;
    payload
        .validate()
        .map_err(|e| crate::error::RouteError::bad_request(request_id, e.to_string()))?;
    Ok(payload)
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Purchase-order API - authentication required
        .merge(po::router())
        // Listing-handling master API - authentication required
        .merge(master::router())
        // Read-view API - authentication required
        .merge(view::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware
///
/// This is used by both the HTTP server and the integration tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // Request logging - innermost so CurrentOperator is already set
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Session check - runs before logging, injects CurrentOperator
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_operator,
        ))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Request ID - outermost so every inner layer sees it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
}
