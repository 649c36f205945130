//! Operator session verification
//!
//! The proxy does not issue sessions; it only verifies tokens minted
//! by the sign-in service (HS256 over a shared secret) and checks the
//! claimed email against a static allow list. An empty allow list
//! denies everyone.

use crate::error::{RequestId, RouteError};
use crate::state::ServerState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::collections::HashSet;

/// Claims the sign-in service puts in a session token
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    #[allow(dead_code)]
    pub exp: usize,
}

/// Verified operator identity, injected into request extensions
#[derive(Debug, Clone)]
pub struct CurrentOperator {
    pub email: String,
}

/// Static operator allow list, compared case-insensitively
#[derive(Debug, Clone)]
pub struct AllowList {
    emails: HashSet<String>,
}

impl AllowList {
    /// Parse a comma-separated email list
    pub fn from_csv(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { emails }
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn permits(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }
}

/// HS256 session token verifier
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

/// Authentication middleware - requires an allow-listed operator
///
/// Skips `OPTIONS` (CORS preflight) and non-`/api/` paths, so health
/// stays public. On success a [`CurrentOperator`] lands in request
/// extensions for handlers that stamp `updated_by`.
pub async fn require_operator(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, RouteError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let request_id = RequestId(
        req.headers()
            .get(crate::error::REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );

    let token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| RouteError::unauthorized(&request_id, "missing session token"))?;

    let claims = state.sessions.verify(token).map_err(|e| {
        tracing::warn!(request_id = %request_id.0, error = %e, "session verification failed");
        RouteError::unauthorized(&request_id, "invalid session token")
    })?;

    if !state.allow_list.permits(&claims.email) {
        tracing::warn!(request_id = %request_id.0, "operator not on allow list");
        return Err(RouteError::unauthorized(&request_id, "operator not allowed"));
    }

    req.extensions_mut().insert(CurrentOperator {
        email: claims.email.trim().to_lowercase(),
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn mint(secret: &str, email: &str, exp: i64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &json!({"email": email, "exp": exp}),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let list = AllowList::from_csv("Ops@Example.com, second@example.com ,");
        assert!(list.permits("ops@example.com"));
        assert!(list.permits("OPS@EXAMPLE.COM"));
        assert!(list.permits(" second@example.com "));
        assert!(!list.permits("third@example.com"));
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let list = AllowList::from_csv("  ,  ");
        assert!(list.is_empty());
        assert!(!list.permits("anyone@example.com"));
    }

    #[test]
    fn test_verifier_accepts_valid_token() {
        let verifier = SessionVerifier::new("secret");
        let token = mint("secret", "ops@example.com", future_exp());
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.email, "ops@example.com");
    }

    #[test]
    fn test_verifier_rejects_wrong_secret_and_expired() {
        let verifier = SessionVerifier::new("secret");

        let wrong = mint("other-secret", "ops@example.com", future_exp());
        assert!(verifier.verify(&wrong).is_err());

        let expired = mint("secret", "ops@example.com", chrono::Utc::now().timestamp() - 3600);
        assert!(verifier.verify(&expired).is_err());
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
