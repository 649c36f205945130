//! Ops Client - typed access to the dashboard proxy
//!
//! Provides validating API clients for purchase orders, the
//! listing-handling master and the read views, plus the local draft
//! cart and a keyed remote-data cache with request coalescing.

pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod master;
pub mod po;
pub mod remote_cache;
pub mod views;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

pub use master::MasterClient;
pub use po::{ConfirmOutcome, DeleteOutcome, PoClient, PoDetailOutcome, UpdateStatusOutcome};
pub use views::ViewClient;

pub use cart::{Cart, CartLine, CartLinePatch, CartMeta, CartStore, NewCartLine, ceil_to_lot};
pub use remote_cache::{CacheEvent, FetchError, RemoteCache, RemoteState};

// Re-export shared types for convenience
pub use shared::{Envelope, ErrorCode, Failure};
