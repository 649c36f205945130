//! Cart persistence backends
//!
//! The store only needs a single-slot string read/write; backends
//! decide durability. The redb backend keeps the snapshot under a
//! fixed key in one table.

use redb::{Database, ReadableDatabase, TableDefinition, TableError};
use std::path::Path;
use thiserror::Error;

const CART_TABLE: TableDefinition<&str, &str> = TableDefinition::new("cart");
const CART_KEY: &str = "po_cart_v1";

/// Cart persistence error
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart storage: {0}")]
    Backend(#[from] redb::Error),

    #[error("cart encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Single-slot snapshot persistence
pub trait CartStorage: Send + Sync {
    /// The last written snapshot, if any
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the snapshot
    fn write(&self, raw: &str) -> Result<(), StorageError>;
}

/// Durable cart storage backed by a redb file
pub struct RedbCartStorage {
    db: Database,
}

impl RedbCartStorage {
    /// Open (or create) the cart database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path).map_err(redb::Error::from)?;
        Ok(Self { db })
    }
}

impl CartStorage for RedbCartStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(CART_TABLE) {
            Ok(table) => table,
            // A fresh database has no table until the first write.
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(redb::Error::from(err).into()),
        };
        let value = table
            .get(CART_KEY)
            .map_err(redb::Error::from)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(CART_TABLE).map_err(redb::Error::from)?;
            table.insert(CART_KEY, raw).map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}

/// In-memory cart storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryCartStorage {
    slot: parking_lot::Mutex<Option<String>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryCartStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        *self.slot.lock() = Some(raw.to_string());
        Ok(())
    }
}
