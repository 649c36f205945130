//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    /// Response body was not JSON
    #[error("Non-JSON response: {excerpt}")]
    NotJson { excerpt: String },

    /// Response body did not match the expected schema
    #[error("Schema mismatch ({schema}): {message}")]
    Schema {
        schema: &'static str,
        message: String,
        excerpt: String,
    },

    /// Outbound payload failed validation before sending
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Server relayed an upstream rejection the caller cannot
    /// interpret as a typed outcome
    #[error("API error `{code}`: {message}")]
    Api { code: String, message: String },
}

impl ClientError {
    pub(crate) fn invalid_payload(errors: validator::ValidationErrors) -> Self {
        ClientError::InvalidPayload(errors.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
