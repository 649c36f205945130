//! Listing-handling exception list
//!
//! Per-listing handling flags maintained upstream and toggled from the
//! dashboard, individually or in bulk (capped at 50 per call).

use crate::models::views::StoreId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Handling status of a storefront listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlingStatus {
    Normal,
    Unavailable,
}

/// A listing-handling record as stored upstream. `store_id` is kept
/// loose here because historical rows predate the store enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHandlingRecord {
    pub listing_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rakuten_item_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rakuten_sku: Option<String>,
    pub handling_status: HandlingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// `master/listing_handling/upsert` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListingHandlingUpsertPayload {
    #[validate(length(min = 1))]
    pub listing_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rakuten_item_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rakuten_sku: Option<String>,
    pub handling_status: HandlingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Bulk variant of the upsert; the upstream call is capped at 50
/// items, enforced here at the schema boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ListingHandlingBulkPayload {
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Vec<ListingHandlingUpsertPayload>,
}

// ==================== ok:true response bodies ====================

/// `master/listing_handling/list` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHandlingListOk {
    #[serde(default)]
    pub items: Vec<ListingHandlingRecord>,
}

/// `master/listing_handling/upsert` success body (echo of the row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHandlingUpsertOk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handling_status: Option<HandlingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Bulk-upsert success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHandlingBulkOk {
    #[serde(default)]
    pub updated: i64,
}
