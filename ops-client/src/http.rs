//! HTTP transport for the typed API clients

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::Envelope;

const EXCERPT_LEN: usize = 200;

/// Truncate a response body for error reporting
pub(crate) fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let mut cut = EXCERPT_LEN;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &trimmed[..cut])
    }
}

/// Decode an envelope body, reporting which schema was expected on
/// mismatch.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    value: Value,
    schema: &'static str,
) -> ClientResult<Envelope<T>> {
    let raw = value.to_string();
    serde_json::from_value(value).map_err(|e| ClientError::Schema {
        schema,
        message: e.to_string(),
        excerpt: excerpt(&raw),
    })
}

/// HTTP client for making requests to the dashboard proxy
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Make a GET request and decode the body as JSON
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Value> {
        let mut request = self.client.get(self.url(path)).query(query);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with a JSON body and decode the response
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Read the body once, then branch on status.
    ///
    /// Non-success responses still carry an `ok:false` envelope when
    /// the proxy itself rejected the request; those surface as
    /// `ClientError::Api` with the wire code. An empty success body
    /// decodes as `{}` so optional-field schemas accept it.
    async fn handle_response(response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                if let Some(code) = value.get("error").and_then(Value::as_str) {
                    let message = value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or(code)
                        .to_string();
                    return Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                    });
                }
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                excerpt: excerpt(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&text).map_err(|_| ClientError::NotJson {
            excerpt: excerpt(&text),
        })
    }
}
