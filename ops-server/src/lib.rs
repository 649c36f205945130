//! Ops Server - API proxy for the inventory & purchase-order dashboard
//!
//! The proxy sits between the browser dashboard and two upstreams:
//! the spreadsheet API owning orders and master rows, and the object
//! store serving the published read views. It verifies operator
//! sessions, validates inbound payloads, keeps upstream credentials
//! server-side, and relays `ok`-discriminated envelopes verbatim.
//!
//! # Module structure
//!
//! ```text
//! ops-server/src/
//! ├── config.rs      # Environment-driven configuration
//! ├── state.rs       # Shared upstream clients and auth handles
//! ├── error.rs       # RouteError envelope and request ids
//! ├── auth.rs        # Session verification and allow list
//! ├── upstream/      # Spreadsheet API and view-store clients
//! ├── routes/        # HTTP routes and middleware stack
//! └── server.rs      # Startup and graceful shutdown
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod upstream;

pub use auth::{AllowList, CurrentOperator, SessionVerifier};
pub use config::Config;
pub use error::{ApiError, RequestId, RouteError, RouteResult};
pub use server::Server;
pub use state::ServerState;
pub use upstream::{SheetClient, UpstreamError, ViewStore};

pub use logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging from the environment
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json_format = std::env::var("ENVIRONMENT")
        .map(|e| e == "production")
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(&level, json_format, log_dir.as_deref())
}
