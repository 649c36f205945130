//! Typed purchase-order client
//!
//! Expected business rejections (`not_found`, `cannot_delete_sent`,
//! `mail_failed`) are lifted into outcome enums so callers match on
//! them; anything else surfaces as `ClientError::Api`.

use crate::http::{HttpClient, parse_envelope};
use crate::{ClientError, ClientResult};
use shared::error::ErrorCode;
use shared::models::{
    PoConfirmOk, PoCreateOk, PoCreatePayload, PoDeletePayload, PoDetailOk, PoHeader, PoLine,
    PoListOk, PoUpdateStatusOk, PoUpdateStatusPayload,
};
use shared::{Envelope, Failure};
use validator::Validate;

/// Result of a `po/detail` lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PoDetailOutcome {
    Found {
        header: PoHeader,
        lines: Vec<PoLine>,
    },
    NotFound,
}

/// Result of a `po/update_status` call
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatusOutcome {
    Updated {
        mail_sent: Option<bool>,
        mail_error: Option<String>,
    },
    NotFound,
}

/// Result of a `po/confirm` call.
///
/// `MailFailed` means the order was created but the supplier mail was
/// rejected; it stays a draft upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Sent { po_id: String },
    MailFailed { po_id: Option<String>, message: String },
}

/// Result of a `po/delete` call
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    CannotDeleteSent,
}

fn api_error(failure: &Failure) -> ClientError {
    ClientError::Api {
        code: failure.error.clone(),
        message: failure.describe().to_string(),
    }
}

/// Purchase-order API client
#[derive(Debug, Clone)]
pub struct PoClient {
    http: HttpClient,
}

impl PoClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// List purchase-order headers, newest first
    pub async fn list(&self) -> ClientResult<Vec<PoHeader>> {
        let value = self.http.get_json("/api/po/list", &[]).await?;
        match parse_envelope::<PoListOk>(value, "po/list")? {
            Envelope::Ok(body) => Ok(body.items),
            Envelope::Failure(failure) => Err(api_error(&failure)),
        }
    }

    /// Fetch one order's header and lines
    pub async fn detail(&self, po_id: &str) -> ClientResult<PoDetailOutcome> {
        let value = self
            .http
            .get_json("/api/po/detail", &[("po_id", po_id)])
            .await?;
        match parse_envelope::<PoDetailOk>(value, "po/detail")? {
            Envelope::Ok(body) => Ok(PoDetailOutcome::Found {
                header: body.header,
                lines: body.lines,
            }),
            Envelope::Failure(failure) if failure.code() == Some(ErrorCode::NotFound) => {
                Ok(PoDetailOutcome::NotFound)
            }
            Envelope::Failure(failure) => Err(api_error(&failure)),
        }
    }

    /// Create a draft order, returning its id
    pub async fn create(&self, payload: &PoCreatePayload) -> ClientResult<String> {
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self.http.post_json("/api/po/create", payload).await?;
        match parse_envelope::<PoCreateOk>(value, "po/create")? {
            Envelope::Ok(body) => Ok(body.po_id),
            Envelope::Failure(failure) => Err(api_error(&failure)),
        }
    }

    /// Transition an order's status (`draft → sent` triggers the
    /// supplier mail upstream)
    pub async fn update_status(
        &self,
        payload: &PoUpdateStatusPayload,
    ) -> ClientResult<UpdateStatusOutcome> {
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self.http.post_json("/api/po/update-status", payload).await?;
        match parse_envelope::<PoUpdateStatusOk>(value, "po/update_status")? {
            Envelope::Ok(body) => Ok(UpdateStatusOutcome::Updated {
                mail_sent: body.mail_sent,
                mail_error: body.mail_error,
            }),
            Envelope::Failure(failure) if failure.code() == Some(ErrorCode::NotFound) => {
                Ok(UpdateStatusOutcome::NotFound)
            }
            Envelope::Failure(failure) => Err(api_error(&failure)),
        }
    }

    /// Create an order and mail it to the supplier in one step
    pub async fn confirm(&self, payload: &PoCreatePayload) -> ClientResult<ConfirmOutcome> {
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self.http.post_json("/api/po/confirm", payload).await?;
        match parse_envelope::<PoConfirmOk>(value, "po/confirm")? {
            Envelope::Ok(body) => Ok(ConfirmOutcome::Sent { po_id: body.po_id }),
            Envelope::Failure(failure) if failure.code() == Some(ErrorCode::MailFailed) => {
                Ok(ConfirmOutcome::MailFailed {
                    po_id: failure.extra_str("po_id").map(str::to_string),
                    message: failure.describe().to_string(),
                })
            }
            Envelope::Failure(failure) => Err(api_error(&failure)),
        }
    }

    /// Delete a draft order
    pub async fn delete(&self, po_id: &str) -> ClientResult<DeleteOutcome> {
        let payload = PoDeletePayload {
            po_id: po_id.to_string(),
        };
        payload.validate().map_err(ClientError::invalid_payload)?;

        let value = self.http.post_json("/api/po/delete", &payload).await?;
        let envelope: Envelope<serde_json::Value> = parse_envelope(value, "po/delete")?;
        match envelope {
            Envelope::Ok(_) => Ok(DeleteOutcome::Deleted),
            Envelope::Failure(failure) => match failure.code() {
                Some(ErrorCode::NotFound) => Ok(DeleteOutcome::NotFound),
                Some(ErrorCode::CannotDeleteSent) => Ok(DeleteOutcome::CannotDeleteSent),
                _ => Err(api_error(&failure)),
            },
        }
    }
}
