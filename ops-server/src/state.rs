//! Server state - shared handles to upstream clients and auth
//!
//! Cloning is shallow; everything heavy sits behind an `Arc` or a
//! `reqwest::Client`'s own internal pool.

use crate::auth::{AllowList, SessionVerifier};
use crate::config::Config;
use crate::upstream::{SheetClient, UpstreamError, ViewStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub sheet: SheetClient,
    pub views: ViewStore,
    pub sessions: Arc<SessionVerifier>,
    pub allow_list: Arc<AllowList>,
}

impl ServerState {
    pub fn initialize(config: &Config) -> Result<Self, UpstreamError> {
        if config.session_jwt_secret.is_empty() {
            return Err(UpstreamError::Config("SESSION_JWT_SECRET is not set".into()));
        }

        let allow_list = AllowList::from_csv(&config.allowed_emails);
        if allow_list.is_empty() {
            tracing::warn!("AUTH_ALLOWED_EMAILS is empty; all API requests will be denied");
        }

        Ok(Self {
            config: Arc::new(config.clone()),
            sheet: SheetClient::new(config)?,
            views: ViewStore::new(config)?,
            sessions: Arc::new(SessionVerifier::new(&config.session_jwt_secret)),
            allow_list: Arc::new(allow_list),
        })
    }
}
