//! Unified route error handling
//!
//! Route failures caused by the proxy itself render as an `ok:false`
//! envelope with a taxonomy code and the request id, at the matching
//! HTTP status. Upstream business rejections never pass through here;
//! handlers relay those bodies verbatim at 200.

use crate::upstream::UpstreamError;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderValue, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::convert::Infallible;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id taken from `x-request-id`, minted when absent
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Ok(RequestId(id))
    }
}

/// Proxy-side failure
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Inbound payload rejected before reaching upstream (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upstream call failed (500)
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Session missing, invalid, or not on the allow list (401)
    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Unauthorized(_) => "unauthorized",
        }
    }
}

/// A route failure tagged with its request id
#[derive(Debug)]
pub struct RouteError {
    pub request_id: String,
    pub error: ApiError,
}

impl RouteError {
    pub fn new(request_id: &RequestId, error: ApiError) -> Self {
        Self {
            request_id: request_id.0.clone(),
            error,
        }
    }

    pub fn bad_request(request_id: &RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id, ApiError::BadRequest(message.into()))
    }

    pub fn upstream(request_id: &RequestId, error: UpstreamError) -> Self {
        Self::new(request_id, ApiError::Upstream(error))
    }

    pub fn unauthorized(request_id: &RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id, ApiError::Unauthorized(message.into()))
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let message = self.error.to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %self.request_id,
                code = %self.error.code(),
                error = %message,
                "request failed"
            );
        } else {
            tracing::warn!(
                request_id = %self.request_id,
                code = %self.error.code(),
                error = %message,
                "request rejected"
            );
        }

        let body = Json(json!({
            "ok": false,
            "error": self.error.code(),
            "message": message,
            "requestId": self.request_id,
        }));

        let mut response = (status, body).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

/// Result type for route handlers
pub type RouteResult<T> = Result<T, RouteError>;
