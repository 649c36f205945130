//! Listing-handling master proxy routes
//!
//! Upserts are stamped with the verified operator's email before they
//! go upstream; clients cannot claim another identity.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use shared::models::{ListingHandlingBulkPayload, ListingHandlingUpsertPayload};

use crate::auth::CurrentOperator;
use crate::error::{RequestId, RouteError, RouteResult};
use crate::routes::{decode_payload, relay};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/master/listing-handling", get(list).post(upsert))
        .route("/api/master/listing-handling/bulk", post(bulk_upsert))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
}

async fn list(
    State(state): State<ServerState>,
    request_id: RequestId,
    Query(params): Query<ListParams>,
) -> RouteResult<Response> {
    // Unrecognized filter values are dropped, not rejected.
    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(status) = params.status.as_deref() {
        if status == "normal" || status == "unavailable" {
            query.push(("handling_status", status));
        }
    }

    let value = state
        .sheet
        .get("master/listing_handling/list", &query)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "master/listing_handling/list", value))
}

fn stamp_updated_by(payload: &impl serde::Serialize, operator: &CurrentOperator) -> Value {
    let mut value = serde_json::to_value(payload).unwrap_or(Value::Null);
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "updated_by".to_string(),
            Value::String(operator.email.clone()),
        );
    }
    value
}

async fn upsert(
    State(state): State<ServerState>,
    request_id: RequestId,
    Extension(operator): Extension<CurrentOperator>,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: ListingHandlingUpsertPayload = decode_payload(&request_id, raw)?;
    let body = stamp_updated_by(&payload, &operator);

    let value = state
        .sheet
        .post("master/listing_handling/upsert", &body)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "master/listing_handling/upsert", value))
}

async fn bulk_upsert(
    State(state): State<ServerState>,
    request_id: RequestId,
    Extension(operator): Extension<CurrentOperator>,
    Json(raw): Json<Value>,
) -> RouteResult<Response> {
    let payload: ListingHandlingBulkPayload = decode_payload(&request_id, raw)?;
    let body = stamp_updated_by(&payload, &operator);

    let value = state
        .sheet
        .post("master/listing_handling/bulk", &body)
        .await
        .map_err(|e| RouteError::upstream(&request_id, e))?;
    Ok(relay(&request_id, "master/listing_handling/bulk", value))
}
