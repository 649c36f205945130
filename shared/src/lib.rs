//! Shared wire types for the mirror-ops dashboard
//!
//! Common types used by both the proxy server and the typed client:
//! the error-code taxonomy, the `ok: true | false` response envelope,
//! and the purchase-order / listing-handling / read-view data model.

pub mod envelope;
pub mod error;
pub mod models;

// Re-exports
pub use envelope::{Envelope, Failure};
pub use error::ErrorCode;
pub use serde::{Deserialize, Serialize};
