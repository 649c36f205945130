//! Read-view records produced by the external ETL pipeline
//!
//! Each view is published as a whole JSON array in object storage and
//! only displayed by the dashboard; no field here is computed locally.

use serde::{Deserialize, Serialize};

/// The two mirrored storefronts sharing one warehouse. `metro` stock
/// is authoritative; `windy` is monitored for drift only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreId {
    Metro,
    Windy,
}

/// Stock-risk classification computed by the ETL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Red,
    Yellow,
    Green,
}

/// Per-listing breakdown attached to an item metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingMetric {
    pub listing_id: String,
    pub store_id: StoreId,
    pub rakuten_item_no: String,
    pub rakuten_sku: String,
    pub title: String,
    pub stock_qty: i64,
    pub last_month_sales: i64,
    pub this_month_sales: i64,
    pub r_hat: f64,
    pub bom_qty: i64,
    pub contribution_stock: f64,
    pub contribution_consumption: f64,
}

/// Inventory metrics for one internal item (BOM-expanded).
///
/// `days_of_cover` is null when average daily consumption is zero;
/// the ETL normalizes the infinite case to null before publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetric {
    pub internal_id: String,
    pub name: String,
    pub derived_stock: f64,
    pub avg_daily_consumption: f64,
    pub days_of_cover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro_last_month_sales: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metro_this_month_sales: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windy_last_month_sales: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windy_this_month_sales: Option<f64>,
    pub lead_time_days: i64,
    pub safety_stock: f64,
    pub lot_size: i64,
    pub target_cover_days: i64,
    pub need_qty: f64,
    pub reorder_qty_suggested: i64,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings: Option<Vec<ListingMetric>>,
}

/// Stock drift between the two mirrored storefronts for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorMismatch {
    pub rakuten_item_no: String,
    pub rakuten_sku: String,
    pub metro_stock_qty: i64,
    pub windy_stock_qty: i64,
    pub diff: i64,
}

/// Rakuten listing with no BOM mapping to an internal item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedListing {
    pub store_id: StoreId,
    pub listing_id: String,
    pub rakuten_item_no: String,
    pub rakuten_sku: String,
    pub stock_qty: i64,
    pub last_month_sales: i64,
    pub this_month_sales: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Yahoo listing with no BOM mapping to an internal item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YahooUnmappedListing {
    pub listing_id: String,
    pub yahoo_item_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yahoo_sub_code: Option<String>,
    pub stock_qty: i64,
    pub last_month_sales: i64,
    pub this_month_sales: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Raw per-listing snapshot row (before BOM expansion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub store_id: StoreId,
    pub listing_id: String,
    pub rakuten_item_no: String,
    pub rakuten_sku: String,
    pub stock_qty: i64,
    pub last_month_sales: i64,
    pub this_month_sales: i64,
}
