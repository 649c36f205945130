//! Purchase-order proxy routes
//!
//! Inbound payloads are validated before anything reaches the
//! spreadsheet API; upstream envelopes come back verbatim at 200.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use shared::models::{PoCreatePayload, PoDeletePayload, PoUpdateStatusPayload};

use crate::error::{RequestId, RouteError, RouteResult};
use crate::routes::{decode_payload, relay};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/po/list", get(list))
        .route("/api/po/detail", get(detail))
        .route("/api/po/create", post(create))
        .route("/api/po/update-status", post(update_status))
        .route("/api/po/confirm", post(confirm))
        .route("/api/po/delete", post(delete))
}

async fn list(State(state): State<ServerState>, request_id: RequestId) -> RouteResult<Response> {
    let value = state
        .sheet
        .get("po/list", &[])
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/list", value))
}

#[derive(Debug, Deserialize)]
struct DetailParams {
    #[serde(default)]
    po_id: String,
}

async fn detail(
    State(state): State<ServerState>,
    request_id: RequestId,
    Query(params): Query<DetailParams>,
) -> RouteResult<Response> {
    let po_id = params.po_id.trim();
    if po_id.is_empty() {
        return Err(RouteError::bad_request(&request_id, "po_id is required"));
    }

    let value = state
        .sheet
        .get("po/detail", &[("po_id", po_id)])
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/detail", value))
}

async fn create(
    State(state): State<ServerState>,
    request_id: RequestId,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: PoCreatePayload = decode_payload(&request_id, raw)?;

    let value = state
        .sheet
        .post("po/create", &payload)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/create", value))
}

async fn update_status(
    State(state): State<ServerState>,
    request_id: RequestId,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: PoUpdateStatusPayload = decode_payload(&request_id, raw)?;

    let value = state
        .sheet
        .post("po/update_status", &payload)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/update_status", value))
}

async fn confirm(
    State(state): State<ServerState>,
    request_id: RequestId,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: PoCreatePayload = decode_payload(&request_id, raw)?;

    let value = state
        .sheet
        .post("po/confirm", &payload)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/confirm", value))
}

async fn delete(
    State(state): State<ServerState>,
    request_id: RequestId,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: PoDeletePayload = decode_payload(&request_id, raw)?;

    let value = state
        .sheet
        .post("po/delete", &payload)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "po/delete", value))
}
