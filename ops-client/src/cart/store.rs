//! Cart store: read-modify-write commits over a storage backend
//!
//! Every mutation runs under one commit lock, re-reads the snapshot,
//! applies the change, stamps `updated_at` and writes the whole cart
//! back, then notifies subscribers. A second notification path exists
//! for backends whose file changed underneath us.

use super::storage::{CartStorage, StorageError};
use super::{Cart, CartLine, CartLinePatch, CartMeta, NewCartLine, ceil_to_lot, clamp_cost, clamp_lot};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

const EVENT_CAPACITY: usize = 64;

/// Shared draft-order cart over a persistence backend
#[derive(Clone)]
pub struct CartStore {
    storage: Arc<dyn CartStorage>,
    commit_lock: Arc<parking_lot::Mutex<()>>,
    events: broadcast::Sender<()>,
}

impl CartStore {
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            commit_lock: Arc::new(parking_lot::Mutex::new(())),
            events,
        }
    }

    /// Subscribe to cart-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.events.subscribe()
    }

    fn notify(&self) {
        let _ = self.events.send(());
    }

    /// Notify subscribers after the backend changed outside a commit
    /// (another process wrote the same file)
    pub fn notify_external_change(&self) {
        self.notify();
    }

    /// Current normalized cart
    pub fn snapshot(&self) -> Result<Cart, StorageError> {
        let cart = match self.storage.read()? {
            Some(raw) => Cart::from_persisted(&raw),
            None => Cart::default(),
        };
        Ok(cart)
    }

    fn commit<F>(&self, mutator: F) -> Result<Cart, StorageError>
    where
        F: FnOnce(Cart) -> Cart,
    {
        let _guard = self.commit_lock.lock();

        let prev = match self.storage.read()? {
            Some(raw) => Cart::from_persisted(&raw),
            None => Cart::default(),
        };
        let mut next = mutator(prev);
        next.updated_at = now_ms();

        let raw = serde_json::to_string(&next)?;
        self.storage.write(&raw)?;
        drop(_guard);

        self.notify();
        Ok(next)
    }

    /// Reset to the empty cart
    pub fn clear(&self) -> Result<Cart, StorageError> {
        self.commit(|_| Cart::default())
    }

    /// Update the supplier/note header fields
    pub fn set_meta(&self, meta: CartMeta) -> Result<Cart, StorageError> {
        self.commit(move |mut prev| {
            if let Some(supplier) = meta.supplier {
                prev.supplier = supplier;
            }
            if let Some(note) = meta.note {
                prev.note = note;
            }
            prev
        })
    }

    /// Add a line, merging by `internal_id`.
    ///
    /// On merge the quantities sum and round up to the existing
    /// line's lot; the existing unit cost and lot size win, and basis
    /// fields only backfill when absent.
    pub fn add_line(&self, line: NewCartLine) -> Result<Cart, StorageError> {
        self.commit(move |mut prev| {
            let internal_id = line.internal_id.trim().to_string();
            if internal_id.is_empty() {
                return prev;
            }
            let name = {
                let trimmed = line.name.trim();
                if trimmed.is_empty() {
                    internal_id.clone()
                } else {
                    trimmed.to_string()
                }
            };
            let unit_cost = clamp_cost(line.unit_cost);
            let incoming_lot = clamp_lot(line.lot_size);
            let incoming_qty = line.qty.max(0);

            match prev.lines.iter_mut().find(|l| l.internal_id == internal_id) {
                None => {
                    prev.lines.push(CartLine {
                        internal_id,
                        name,
                        qty: ceil_to_lot(incoming_qty, incoming_lot),
                        unit_cost,
                        lot_size: incoming_lot,
                        basis_need_qty: line.basis_need_qty,
                        basis_days_of_cover: line.basis_days_of_cover,
                        added_at: now_ms(),
                    });
                }
                Some(existing) => {
                    let lot = if existing.lot_size >= 1 {
                        existing.lot_size
                    } else {
                        incoming_lot
                    };
                    existing.qty = ceil_to_lot(existing.qty + incoming_qty, lot);
                    if existing.name.is_empty() {
                        existing.name = name;
                    }
                    if existing.basis_need_qty.is_none() {
                        existing.basis_need_qty = line.basis_need_qty;
                    }
                    if existing.basis_days_of_cover.is_none() {
                        existing.basis_days_of_cover = line.basis_days_of_cover;
                    }
                }
            }
            prev
        })
    }

    /// Patch one line; unknown ids are a no-op
    pub fn update_line(&self, internal_id: &str, patch: CartLinePatch) -> Result<Cart, StorageError> {
        let internal_id = internal_id.to_string();
        self.commit(move |mut prev| {
            let Some(line) = prev.lines.iter_mut().find(|l| l.internal_id == internal_id) else {
                return prev;
            };

            if let Some(name) = patch.name {
                line.name = name;
            }
            if let Some(unit_cost) = patch.unit_cost {
                line.unit_cost = clamp_cost(unit_cost);
            }
            if let Some(lot_size) = patch.lot_size {
                line.lot_size = clamp_lot(lot_size);
            }
            let qty = patch.qty.unwrap_or(line.qty);
            line.qty = ceil_to_lot(qty, line.lot_size);

            if patch.basis_need_qty.is_some() {
                line.basis_need_qty = patch.basis_need_qty;
            }
            if patch.basis_days_of_cover.is_some() {
                line.basis_days_of_cover = patch.basis_days_of_cover;
            }
            prev
        })
    }

    /// Remove one line; unknown ids are a no-op
    pub fn remove_line(&self, internal_id: &str) -> Result<Cart, StorageError> {
        let internal_id = internal_id.to_string();
        self.commit(move |mut prev| {
            prev.lines.retain(|l| l.internal_id != internal_id);
            prev
        })
    }
}
