//! Integration tests: full middleware stack against mock upstreams

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::get;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use ops_server::{Config, ServerState, routes};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const SESSION_SECRET: &str = "test-session-secret";
const SHEET_KEY: &str = "test-sheet-key";

async fn sheet_get(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    assert_eq!(params.get("api_key").map(String::as_str), Some(SHEET_KEY));
    match params.get("path").map(String::as_str) {
        Some("po/list") => axum::Json(json!({
            "ok": true,
            "items": [
                {"po_id": "PO-1", "created_at": "2025-06-01T00:00:00Z", "status": "draft"},
            ],
        })),
        Some("po/detail") => match params.get("po_id").map(String::as_str) {
            Some("PO-1") => axum::Json(json!({
                "ok": true,
                "header": {"po_id": "PO-1", "created_at": "2025-06-01T00:00:00Z", "status": "draft"},
                "lines": [],
            })),
            _ => axum::Json(json!({"ok": false, "error": "not_found"})),
        },
        Some("master/listing_handling/list") => axum::Json(json!({
            "ok": true,
            "items": [],
            "filter": params.get("handling_status"),
        })),
        other => axum::Json(json!({"ok": false, "error": format!("unknown path {other:?}")})),
    }
}

async fn sheet_post(
    Query(params): Query<HashMap<String, String>>,
    axum::Json(body): axum::Json<Value>,
) -> impl IntoResponse {
    assert_eq!(params.get("api_key").map(String::as_str), Some(SHEET_KEY));
    match params.get("path").map(String::as_str) {
        Some("po/create") => {
            assert!(!body["lines"].as_array().unwrap().is_empty());
            axum::Json(json!({"ok": true, "po_id": "PO-NEW"}))
        }
        Some("po/delete") => match body["po_id"].as_str() {
            Some("PO-SENT") => axum::Json(json!({
                "ok": false,
                "error": "cannot_delete_sent",
                "message": "sent orders cannot be deleted",
            })),
            _ => axum::Json(json!({"ok": true})),
        },
        Some("master/listing_handling/upsert") => axum::Json(json!({
            "ok": true,
            "listing_id": body["listing_id"],
            "updated_by": body["updated_by"],
        })),
        other => axum::Json(json!({"ok": false, "error": format!("unknown path {other:?}")})),
    }
}

async fn view_object(Path(name): Path<String>) -> impl IntoResponse {
    match name.as_str() {
        "item_metrics.json" => axum::Json(json!([{
            "internal_id": "ITM-1",
            "name": "Widget",
            "derived_stock": 40.0,
            "avg_daily_consumption": 2.0,
            "days_of_cover": 20.0,
            "lead_time_days": 14,
            "safety_stock": 10.0,
            "lot_size": 10,
            "target_cover_days": 30,
            "need_qty": 0.0,
            "reorder_qty_suggested": 0,
            "risk_level": "green",
        }]))
        .into_response(),
        "mirror_mismatch.json" => axum::Json(json!([])).into_response(),
        _ => (StatusCode::NOT_FOUND, "no such object").into_response(),
    }
}

async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/sheet", get(sheet_get).post(sheet_post))
        .route("/views/view/{name}", get(view_object));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn test_state() -> ServerState {
    let upstream = spawn_upstream().await;
    let config = Config {
        http_port: 0,
        environment: "development".into(),
        sheet_api_url: format!("{upstream}/sheet"),
        sheet_api_key: SHEET_KEY.into(),
        view_store_url: format!("{upstream}/views"),
        view_store_token: Some("view-token".into()),
        allowed_emails: "ops@example.com, Second@Example.com".into(),
        session_jwt_secret: SESSION_SECRET.into(),
        log_level: "info".into(),
        log_dir: None,
        request_timeout_ms: 5000,
    };
    ServerState::initialize(&config).unwrap()
}

fn app(state: &ServerState) -> Router {
    routes::build_app(state).with_state(state.clone())
}

fn mint_token(email: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::new(Algorithm::HS256),
        &json!({"email": email, "exp": exp}),
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_request(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let state = test_state().await;
    let response = app(&state)
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_api_requires_session() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(get_request("/api/po/list", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_api_rejects_operator_off_the_allow_list() {
    let state = test_state().await;
    let token = mint_token("stranger@example.com");

    let response = app(&state)
        .oneshot(get_request("/api/po/list", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_allow_list_comparison_is_case_insensitive() {
    let state = test_state().await;
    let token = mint_token("second@EXAMPLE.com");

    let response = app(&state)
        .oneshot(get_request("/api/po/list", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_po_list_relays_envelope_with_request_id() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(get_request("/api/po/list", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["items"][0]["po_id"], "PO-1");
}

#[tokio::test]
async fn test_po_detail_requires_po_id() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(get_request("/api/po/detail", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["requestId"].is_string());
}

#[tokio::test]
async fn test_po_create_validates_before_upstream() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(post_request(
            "/api/po/create",
            &token,
            json!({"supplier": "ACME", "lines": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_po_create_relays_success() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(post_request(
            "/api/po/create",
            &token,
            json!({
                "supplier": "ACME",
                "lines": [{"internal_id": "SKU-1", "qty": 10, "unit_cost": 120.0}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["po_id"], "PO-NEW");
}

#[tokio::test]
async fn test_po_delete_business_rejection_stays_200() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(post_request(
            "/api/po/delete",
            &token,
            json!({"po_id": "PO-SENT"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "cannot_delete_sent");
}

#[tokio::test]
async fn test_master_bulk_cap_rejected() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let items: Vec<Value> = (0..51)
        .map(|i| json!({"listing_id": format!("L{i}"), "handling_status": "unavailable"}))
        .collect();
    let response = app(&state)
        .oneshot(post_request(
            "/api/master/listing-handling/bulk",
            &token,
            json!({"items": items}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_master_upsert_stamps_verified_operator() {
    let state = test_state().await;
    let token = mint_token("Ops@Example.com");

    let response = app(&state)
        .oneshot(post_request(
            "/api/master/listing-handling",
            &token,
            json!({"listing_id": "L-1", "handling_status": "unavailable", "updated_by": "spoofed@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    // The verified session identity wins over anything in the payload.
    assert_eq!(body["updated_by"], "ops@example.com");
}

#[tokio::test]
async fn test_master_list_forwards_filter_as_handling_status() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(get_request(
            "/api/master/listing-handling?status=unavailable",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    // The mock upstream echoes the `handling_status` parameter it saw.
    assert_eq!(body["filter"], "unavailable");
}

#[tokio::test]
async fn test_master_list_drops_unknown_status_filter() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(get_request(
            "/api/master/listing-handling?status=paused",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert!(body["filter"].is_null());
}

#[tokio::test]
async fn test_view_relay_sets_cache_control() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let response = app(&state)
        .oneshot(get_request("/api/view/item-metrics", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "s-maxage=300, stale-while-revalidate=60"
    );

    let body = body_json(response).await;
    assert_eq!(body[0]["internal_id"], "ITM-1");
}

/// Shared in-memory sink for captured log output
#[derive(Clone, Default)]
struct LogSink(Arc<Mutex<Vec<u8>>>);

impl LogSink {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_request_log_carries_operator_identity() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let response = app(&state)
        .oneshot(get_request("/api/po/list", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The session check runs before the request log, so the log line
    // names the verified operator rather than None.
    let logs = sink.contents();
    assert!(logs.contains(r#"operator=Some("ops@example.com")"#), "{logs}");
}

#[tokio::test]
async fn test_view_upstream_failure_is_upstream_error() {
    let state = test_state().await;
    let token = mint_token("ops@example.com");

    // listing_snapshot.json is not served by the mock store.
    let response = app(&state)
        .oneshot(get_request("/api/view/listing-snapshot", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "upstream_error");
    // The view-store token must never leak into the error message.
    assert!(!body["message"].as_str().unwrap().contains("view-token"));
}
