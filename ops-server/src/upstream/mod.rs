//! Upstream services the proxy fronts
//!
//! Two backends: the spreadsheet API holding orders and master rows,
//! and the object store serving the published read views. Both keep
//! their credentials server-side; error text never carries them.

mod object_store;
mod sheet;

pub use object_store::ViewStore;
pub use sheet::SheetClient;

use thiserror::Error;

const EXCERPT_LEN: usize = 200;

/// Truncate an upstream body for error reporting
pub(crate) fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let mut cut = EXCERPT_LEN;
        while !trimmed.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &trimmed[..cut])
    }
}

/// Upstream call failure
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned non-JSON: {excerpt}")]
    NonJson { excerpt: String },

    #[error("upstream returned HTTP {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("upstream payload did not match {schema}: {message}")]
    Schema {
        schema: &'static str,
        message: String,
    },

    #[error("upstream misconfigured: {0}")]
    Config(String),
}
