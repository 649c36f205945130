//! Read-view object store client
//!
//! Views are published as whole JSON arrays under fixed object names.
//! The proxy relays them as-is; the bearer token stays server-side.

use super::{UpstreamError, excerpt};
use crate::config::Config;
use serde_json::Value;
use std::time::Duration;

const ITEM_METRICS_OBJECT: &str = "view/item_metrics.json";
const MIRROR_MISMATCH_OBJECT: &str = "view/mirror_mismatch.json";
const UNMAPPED_LISTINGS_OBJECT: &str = "view/unmapped_listings.json";
const YAHOO_UNMAPPED_LISTINGS_OBJECT: &str = "view/yahoo_unmapped_listings.json";
const LISTING_SNAPSHOT_OBJECT: &str = "view/listing_snapshot.json";

/// Client for the published read views
#[derive(Debug, Clone)]
pub struct ViewStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ViewStore {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        if config.view_store_url.is_empty() {
            return Err(UpstreamError::Config("VIEW_STORE_URL is not set".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.view_store_url.trim_end_matches('/').to_string(),
            token: config.view_store_token.clone(),
        })
    }

    pub async fn item_metrics(&self) -> Result<Value, UpstreamError> {
        self.fetch(ITEM_METRICS_OBJECT).await
    }

    pub async fn mirror_mismatch(&self) -> Result<Value, UpstreamError> {
        self.fetch(MIRROR_MISMATCH_OBJECT).await
    }

    pub async fn unmapped_listings(&self) -> Result<Value, UpstreamError> {
        self.fetch(UNMAPPED_LISTINGS_OBJECT).await
    }

    pub async fn yahoo_unmapped_listings(&self) -> Result<Value, UpstreamError> {
        self.fetch(YAHOO_UNMAPPED_LISTINGS_OBJECT).await
    }

    pub async fn listing_snapshot(&self) -> Result<Value, UpstreamError> {
        self.fetch(LISTING_SNAPSHOT_OBJECT).await
    }

    /// Fetch one view object; the body must be a JSON array
    async fn fetch(&self, object: &'static str) -> Result<Value, UpstreamError> {
        let url = format!("{}/{}", self.base_url, object);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                object = %object,
                status = %status.as_u16(),
                "view store returned an error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                excerpt: excerpt(&text),
            });
        }

        let value: Value = serde_json::from_str(&text).map_err(|_| UpstreamError::NonJson {
            excerpt: excerpt(&text),
        })?;
        if !value.is_array() {
            return Err(UpstreamError::Schema {
                schema: object,
                message: "expected a JSON array".into(),
            });
        }

        Ok(value)
    }
}
