//! Draft purchase-order cart
//!
//! The cart is persisted as one versioned JSON snapshot under a fixed
//! key. Every read re-normalizes the raw snapshot, so quantities
//! always sit on lot boundaries and malformed or foreign-version
//! payloads degrade to an empty cart instead of an error.

mod storage;
mod store;

pub use storage::{CartStorage, MemoryCartStorage, RedbCartStorage, StorageError};
pub use store::CartStore;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot format version; anything else is discarded on read
pub const CART_VERSION: u64 = 1;

/// One cart line. `qty` is always a multiple of `lot_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub internal_id: String,
    pub name: String,
    pub qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_cost: Decimal,
    pub lot_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_need_qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_days_of_cover: Option<f64>,
    pub added_at: i64,
}

/// The whole persisted cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub version: u64,
    pub supplier: String,
    pub note: String,
    pub lines: Vec<CartLine>,
    pub updated_at: i64,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            version: CART_VERSION,
            supplier: String::new(),
            note: String::new(),
            lines: Vec::new(),
            updated_at: 0,
        }
    }
}

/// Input for adding a line to the cart
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub internal_id: String,
    pub name: String,
    pub qty: i64,
    pub unit_cost: Decimal,
    pub lot_size: i64,
    pub basis_need_qty: Option<f64>,
    pub basis_days_of_cover: Option<f64>,
}

/// Partial update of an existing line; `None` keeps the field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartLinePatch {
    pub name: Option<String>,
    pub qty: Option<i64>,
    pub unit_cost: Option<Decimal>,
    pub lot_size: Option<i64>,
    pub basis_need_qty: Option<f64>,
    pub basis_days_of_cover: Option<f64>,
}

/// Partial update of the cart header fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartMeta {
    pub supplier: Option<String>,
    pub note: Option<String>,
}

/// Round a quantity up to the nearest lot multiple
pub fn ceil_to_lot(qty: i64, lot: i64) -> i64 {
    let lot = lot.max(1);
    ((qty.max(0) as u64).div_ceil(lot as u64) as i64) * lot
}

fn clamp_cost(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn clamp_lot(value: i64) -> i64 {
    value.max(1)
}

impl Cart {
    /// Decode a persisted snapshot, dropping anything that does not
    /// normalize. A foreign version yields the empty cart.
    pub fn from_persisted(raw: &str) -> Cart {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Cart::default();
        };
        Self::normalize(&value)
    }

    fn normalize(value: &Value) -> Cart {
        let Some(obj) = value.as_object() else {
            return Cart::default();
        };
        if obj.get("version").and_then(Value::as_u64) != Some(CART_VERSION) {
            return Cart::default();
        }

        let supplier = obj
            .get("supplier")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let note = obj
            .get("note")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let updated_at = obj.get("updated_at").and_then(Value::as_i64).unwrap_or(0);

        let mut lines = Vec::new();
        for raw_line in obj.get("lines").and_then(Value::as_array).into_iter().flatten() {
            if let Some(line) = normalize_line(raw_line) {
                lines.push(line);
            }
        }

        Cart {
            version: CART_VERSION,
            supplier,
            note,
            lines,
            updated_at,
        }
    }
}

fn normalize_line(value: &Value) -> Option<CartLine> {
    let obj = value.as_object()?;
    let internal_id = obj.get("internal_id").and_then(Value::as_str)?.to_string();
    if internal_id.is_empty() {
        return None;
    }

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(&internal_id)
        .to_string();
    let unit_cost = obj
        .get("unit_cost")
        .and_then(Value::as_f64)
        .and_then(Decimal::from_f64_retain)
        .map(clamp_cost)
        .unwrap_or_default();
    let lot_size = obj
        .get("lot_size")
        .and_then(Value::as_f64)
        .map(|v| clamp_lot(v.floor() as i64))
        .unwrap_or(1);
    // Fractional quantities from older snapshots round up before lot
    // alignment.
    let qty = obj
        .get("qty")
        .and_then(Value::as_f64)
        .map(|v| ceil_to_lot(v.ceil() as i64, lot_size))
        .unwrap_or(0);
    let added_at = obj.get("added_at").and_then(Value::as_i64).unwrap_or(0);
    let basis_need_qty = obj.get("basis_need_qty").and_then(Value::as_f64);
    let basis_days_of_cover = obj.get("basis_days_of_cover").and_then(Value::as_f64);

    Some(CartLine {
        internal_id,
        name,
        qty,
        unit_cost,
        lot_size,
        basis_need_qty,
        basis_days_of_cover,
        added_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ceil_to_lot() {
        assert_eq!(ceil_to_lot(0, 10), 0);
        assert_eq!(ceil_to_lot(1, 10), 10);
        assert_eq!(ceil_to_lot(10, 10), 10);
        assert_eq!(ceil_to_lot(11, 10), 20);
        assert_eq!(ceil_to_lot(-5, 10), 0);
        assert_eq!(ceil_to_lot(7, 0), 7);
        assert_eq!(ceil_to_lot(7, -3), 7);
    }

    #[test]
    fn test_foreign_version_yields_empty_cart() {
        let cart = Cart::from_persisted(&json!({"version": 2, "lines": [{"internal_id": "A", "qty": 5}]}).to_string());
        assert_eq!(cart, Cart::default());

        let cart = Cart::from_persisted("not json at all");
        assert_eq!(cart, Cart::default());

        let cart = Cart::from_persisted("[1,2,3]");
        assert_eq!(cart, Cart::default());
    }

    #[test]
    fn test_normalize_skips_lines_without_internal_id() {
        let cart = Cart::from_persisted(
            &json!({
                "version": 1,
                "supplier": "ACME",
                "note": "",
                "updated_at": 1718000000000i64,
                "lines": [
                    {"qty": 5},
                    {"internal_id": "", "qty": 5},
                    {"internal_id": "SKU-1", "qty": 5, "lot_size": 10},
                    "garbage",
                ],
            })
            .to_string(),
        );
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].internal_id, "SKU-1");
        assert_eq!(cart.lines[0].qty, 10);
        assert_eq!(cart.lines[0].name, "SKU-1");
        assert_eq!(cart.supplier, "ACME");
    }

    #[test]
    fn test_normalize_fractional_qty_rounds_up_to_lot() {
        let cart = Cart::from_persisted(
            &json!({
                "version": 1,
                "lines": [
                    {"internal_id": "A", "qty": 10.2, "lot_size": 10},
                    {"internal_id": "B", "qty": 0.4, "lot_size": 3.9},
                ],
            })
            .to_string(),
        );
        assert_eq!(cart.lines[0].qty, 20);
        assert_eq!(cart.lines[1].lot_size, 3);
        assert_eq!(cart.lines[1].qty, 3);
    }

    #[test]
    fn test_normalize_clamps_cost_and_lot() {
        let cart = Cart::from_persisted(
            &json!({
                "version": 1,
                "lines": [
                    {"internal_id": "A", "qty": 5, "unit_cost": -3.5, "lot_size": 0},
                ],
            })
            .to_string(),
        );
        assert_eq!(cart.lines[0].unit_cost, Decimal::ZERO);
        assert_eq!(cart.lines[0].lot_size, 1);
        assert_eq!(cart.lines[0].qty, 5);
    }
}
