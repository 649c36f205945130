//! Error-code taxonomy for the dashboard API
//!
//! Codes travel on the wire as snake_case strings inside the
//! `{ok: false, error, message}` envelope. `bad_request` and
//! `upstream_error` are proxy-level faults and map to 4xx/5xx;
//! the remaining codes are business-level rejections relayed from
//! the upstream service inside an HTTP 200 response.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error codes recognized by the dashboard API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Inbound payload failed schema validation
    BadRequest,
    /// Reaching or parsing the upstream service failed
    UpstreamError,
    /// Referenced entity absent upstream
    NotFound,
    /// Purchase order already sent; deletion refused upstream
    CannotDeleteSent,
    /// Order was written but the outgoing mail failed; stays in draft
    MailFailed,
}

impl ErrorCode {
    /// Wire form of the code
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::UpstreamError => "upstream_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::CannotDeleteSent => "cannot_delete_sent",
            ErrorCode::MailFailed => "mail_failed",
        }
    }

    /// HTTP status the proxy answers with when it raises this code
    /// itself. Business-level codes are relayed inside 200 responses.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::UpstreamError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::NotFound | ErrorCode::CannotDeleteSent | ErrorCode::MailFailed => {
                StatusCode::OK
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unrecognized code string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bad_request" => Ok(ErrorCode::BadRequest),
            "upstream_error" => Ok(ErrorCode::UpstreamError),
            "not_found" => Ok(ErrorCode::NotFound),
            "cannot_delete_sent" => Ok(ErrorCode::CannotDeleteSent),
            "mail_failed" => Ok(ErrorCode::MailFailed),
            other => Err(UnknownErrorCode(other.to_string())),
        }
    }
}
