//! Data model for the dashboard wire contracts

pub mod listing_handling;
pub mod po;
pub mod views;

pub use listing_handling::{
    HandlingStatus, ListingHandlingBulkOk, ListingHandlingBulkPayload, ListingHandlingListOk,
    ListingHandlingRecord, ListingHandlingUpsertOk, ListingHandlingUpsertPayload,
};
pub use po::{
    PoConfirmOk, PoCreateLine, PoCreateOk, PoCreatePayload, PoDeletePayload, PoDetailOk, PoHeader,
    PoLine, PoListOk, PoStatus, PoUpdateStatusOk, PoUpdateStatusPayload,
};
pub use views::{
    ItemMetric, ListingMetric, ListingSnapshot, MirrorMismatch, RiskLevel, StoreId,
    UnmappedListing, YahooUnmappedListing,
};
