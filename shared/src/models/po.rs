//! Purchase-order wire model
//!
//! Headers and line items are owned by the upstream spreadsheet
//! service; these types mirror its JSON contract. Payload structs
//! carry the inbound validation rules enforced at the proxy boundary.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Purchase-order lifecycle status.
///
/// Allowed transitions: `draft → sent`, `draft → cancelled`.
/// Deletion is only permitted while `draft` (upstream enforces
/// `cannot_delete_sent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    Draft,
    Sent,
    Cancelled,
}

/// Purchase-order header as listed upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoHeader {
    pub po_id: String,
    pub created_at: String,
    pub status: PoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_qty: Option<i64>,
}

/// Purchase-order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoLine {
    pub po_id: String,
    pub line_no: i64,
    pub internal_id: String,
    pub qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_need_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_days_of_cover: Option<f64>,
}

/// Line of a `po/create` (or `po/confirm`) payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PoCreateLine {
    #[validate(length(min = 1))]
    pub internal_id: String,
    pub qty: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_need_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_days_of_cover: Option<f64>,
}

/// `po/create` payload; `po/confirm` shares the same shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PoCreatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<PoCreateLine>,
}

/// `po/update_status` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PoUpdateStatusPayload {
    #[validate(length(min = 1))]
    pub po_id: String,
    pub status: PoStatus,
}

/// `po/delete` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PoDeletePayload {
    #[validate(length(min = 1))]
    pub po_id: String,
}

// ==================== ok:true response bodies ====================

/// `po/list` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoListOk {
    pub items: Vec<PoHeader>,
}

/// `po/detail` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoDetailOk {
    pub header: PoHeader,
    pub lines: Vec<PoLine>,
}

/// `po/create` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoCreateOk {
    pub po_id: String,
}

/// `po/update_status` success body; mail fields only appear when the
/// transition was `draft → sent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoUpdateStatusOk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_error: Option<String>,
}

/// `po/confirm` success body: the order was created and mailed, so it
/// is already `sent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoConfirmOk {
    pub po_id: String,
    pub status: PoStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_form() {
        assert_eq!(serde_json::to_string(&PoStatus::Draft).unwrap(), "\"draft\"");
        let status: PoStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, PoStatus::Cancelled);
    }

    #[test]
    fn test_header_optional_fields() {
        let header: PoHeader = serde_json::from_value(json!({
            "po_id": "PO-001",
            "created_at": "2025-06-01T00:00:00Z",
            "status": "draft",
        }))
        .unwrap();
        assert_eq!(header.supplier, None);
        assert_eq!(header.item_count, None);

        let value = serde_json::to_value(&header).unwrap();
        assert!(value.get("supplier").is_none());
    }

    #[test]
    fn test_create_payload_requires_lines() {
        use validator::Validate;

        let empty = PoCreatePayload {
            supplier: None,
            note: None,
            lines: vec![],
        };
        assert!(empty.validate().is_err());

        let valid = PoCreatePayload {
            supplier: Some("ACME".to_string()),
            note: None,
            lines: vec![PoCreateLine {
                internal_id: "SKU-1".to_string(),
                qty: 10,
                unit_cost: Some(120.0),
                basis_need_qty: None,
                basis_days_of_cover: None,
            }],
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_create_payload_rejects_blank_internal_id() {
        use validator::Validate;

        let payload = PoCreatePayload {
            supplier: None,
            note: None,
            lines: vec![PoCreateLine {
                internal_id: String::new(),
                qty: 10,
                unit_cost: None,
                basis_need_qty: None,
                basis_days_of_cover: None,
            }],
        };
        assert!(payload.validate().is_err());
    }
}
