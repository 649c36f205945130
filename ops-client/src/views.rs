//! Typed read-view client
//!
//! Views are whole JSON arrays relayed by the proxy from object
//! storage; there is no envelope, a body either parses as the view's
//! row type or the payload is rejected as a schema mismatch.

use crate::http::{HttpClient, excerpt};
use crate::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{
    ItemMetric, ListingSnapshot, MirrorMismatch, UnmappedListing, YahooUnmappedListing,
};

/// Cache keys for pairing the view client with a `RemoteCache`
pub const ITEM_METRICS_KEY: &str = "view:item-metrics";
pub const MIRROR_MISMATCH_KEY: &str = "view:mirror-mismatch";
pub const UNMAPPED_LISTINGS_KEY: &str = "view:unmapped-listings";
pub const YAHOO_UNMAPPED_LISTINGS_KEY: &str = "view:yahoo-unmapped-listings";
pub const LISTING_SNAPSHOT_KEY: &str = "view:listing-snapshot";

fn parse_rows<T: DeserializeOwned>(value: Value, schema: &'static str) -> ClientResult<Vec<T>> {
    let raw = value.to_string();
    serde_json::from_value(value).map_err(|e| ClientError::Schema {
        schema,
        message: e.to_string(),
        excerpt: excerpt(&raw),
    })
}

/// Read-view API client
#[derive(Debug, Clone)]
pub struct ViewClient {
    http: HttpClient,
}

impl ViewClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Per-item inventory metrics (BOM-expanded)
    pub async fn item_metrics(&self) -> ClientResult<Vec<ItemMetric>> {
        let value = self.http.get_json("/api/view/item-metrics", &[]).await?;
        parse_rows(value, "view/item_metrics")
    }

    /// Stock drift between the two mirrored storefronts
    pub async fn mirror_mismatch(&self) -> ClientResult<Vec<MirrorMismatch>> {
        let value = self.http.get_json("/api/view/mirror-mismatch", &[]).await?;
        parse_rows(value, "view/mirror_mismatch")
    }

    /// Rakuten listings with no BOM mapping
    pub async fn unmapped_listings(&self) -> ClientResult<Vec<UnmappedListing>> {
        let value = self
            .http
            .get_json("/api/view/unmapped-listings", &[])
            .await?;
        parse_rows(value, "view/unmapped_listings")
    }

    /// Yahoo listings with no BOM mapping
    pub async fn yahoo_unmapped_listings(&self) -> ClientResult<Vec<YahooUnmappedListing>> {
        let value = self
            .http
            .get_json("/api/view/yahoo-unmapped-listings", &[])
            .await?;
        parse_rows(value, "view/yahoo_unmapped_listings")
    }

    /// Raw per-listing stock snapshot
    pub async fn listing_snapshot(&self) -> ClientResult<Vec<ListingSnapshot>> {
        let value = self.http.get_json("/api/view/listing-snapshot", &[]).await?;
        parse_rows(value, "view/listing_snapshot")
    }
}
