//! Typed listing-handling master client

use crate::http::{HttpClient, parse_envelope};
use crate::{ClientError, ClientResult};
use shared::Envelope;
use shared::models::{
    HandlingStatus, ListingHandlingBulkOk, ListingHandlingBulkPayload, ListingHandlingListOk,
    ListingHandlingRecord, ListingHandlingUpsertOk, ListingHandlingUpsertPayload,
};
use validator::Validate;

/// Listing-handling master API client
#[derive(Debug, Clone)]
pub struct MasterClient {
    http: HttpClient,
}

impl MasterClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// List handling records, optionally filtered by status
    pub async fn list_handling(
        &self,
        status: Option<HandlingStatus>,
    ) -> ClientResult<Vec<ListingHandlingRecord>> {
        let query: Vec<(&str, &str)> = match status {
            Some(HandlingStatus::Normal) => vec![("status", "normal")],
            Some(HandlingStatus::Unavailable) => vec![("status", "unavailable")],
            None => vec![],
        };
        let value = self
            .http
            .get_json("/api/master/listing-handling", &query)
            .await?;
        match parse_envelope::<ListingHandlingListOk>(value, "master/listing_handling/list")? {
            Envelope::Ok(body) => Ok(body.items),
            Envelope::Failure(failure) => Err(ClientError::Api {
                code: failure.error.clone(),
                message: failure.describe().to_string(),
            }),
        }
    }

    /// Upsert a single handling record
    pub async fn upsert_handling(
        &self,
        payload: &ListingHandlingUpsertPayload,
    ) -> ClientResult<ListingHandlingUpsertOk> {
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self
            .http
            .post_json("/api/master/listing-handling", payload)
            .await?;
        match parse_envelope::<ListingHandlingUpsertOk>(value, "master/listing_handling/upsert")? {
            Envelope::Ok(body) => Ok(body),
            Envelope::Failure(failure) => Err(ClientError::Api {
                code: failure.error.clone(),
                message: failure.describe().to_string(),
            }),
        }
    }

    /// Upsert up to 50 handling records in one call, returning the
    /// number of rows written
    pub async fn bulk_upsert_handling(
        &self,
        payload: &ListingHandlingBulkPayload,
    ) -> ClientResult<i64> {
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self
            .http
            .post_json("/api/master/listing-handling/bulk", payload)
            .await?;
        match parse_envelope::<ListingHandlingBulkOk>(value, "master/listing_handling/bulk")? {
            Envelope::Ok(body) => Ok(body.updated),
            Envelope::Failure(failure) => Err(ClientError::Api {
                code: failure.error.clone(),
                message: failure.describe().to_string(),
            }),
        }
    }
}
