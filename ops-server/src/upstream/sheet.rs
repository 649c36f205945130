//! Spreadsheet API client
//!
//! The upstream is a single web-app endpoint dispatching on a `path`
//! query parameter; the API key rides along as an `api_key` parameter.
//! Log lines only ever carry the origin and path portion of the URL,
//! never the query string.

use super::{UpstreamError, excerpt};
use crate::config::Config;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Client for the order/master spreadsheet API
#[derive(Debug, Clone)]
pub struct SheetClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SheetClient {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        if config.sheet_api_url.is_empty() {
            return Err(UpstreamError::Config("SHEET_API_URL is not set".into()));
        }
        if config.sheet_api_key.is_empty() {
            return Err(UpstreamError::Config("SHEET_API_KEY is not set".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.sheet_api_url.clone(),
            api_key: config.sheet_api_key.clone(),
        })
    }

    /// Loggable form of the endpoint: origin and path, no query
    fn safe_url(&self) -> String {
        match reqwest::Url::parse(&self.base_url) {
            Ok(url) => format!("{}{}", url.origin().ascii_serialization(), url.path()),
            Err(_) => "<invalid sheet url>".to_string(),
        }
    }

    /// Call an upstream operation via GET
    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, UpstreamError> {
        let mut query: Vec<(&str, &str)> =
            vec![("path", path), ("api_key", self.api_key.as_str())];
        query.extend_from_slice(params);

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        self.decode(path, response).await
    }

    /// Call an upstream operation via POST with a JSON body
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, UpstreamError> {
        let query: Vec<(&str, &str)> = vec![("path", path), ("api_key", self.api_key.as_str())];

        let response = self
            .client
            .post(&self.base_url)
            .query(&query)
            .json(body)
            .send()
            .await?;
        self.decode(path, response).await
    }

    /// Decode an upstream response into an `ok`-discriminated object
    async fn decode(&self, path: &str, response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                endpoint = %self.safe_url(),
                path = %path,
                status = %status.as_u16(),
                "sheet API returned an error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                excerpt: excerpt(&text),
            });
        }

        let value: Value = serde_json::from_str(&text).map_err(|_| {
            tracing::warn!(
                endpoint = %self.safe_url(),
                path = %path,
                "sheet API returned a non-JSON body"
            );
            UpstreamError::NonJson {
                excerpt: excerpt(&text),
            }
        })?;

        let ok_is_bool = value
            .as_object()
            .and_then(|obj| obj.get("ok"))
            .map(Value::is_boolean)
            .unwrap_or(false);
        if !ok_is_bool {
            return Err(UpstreamError::Schema {
                schema: "envelope",
                message: "missing or non-boolean `ok` discriminant".into(),
            });
        }

        Ok(value)
    }
}
