/// Proxy configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub environment: String,

    /// Spreadsheet API endpoint and its server-held key. The key is
    /// only ever sent upstream; it must not appear in logs or
    /// responses.
    pub sheet_api_url: String,
    pub sheet_api_key: String,

    /// Object-store endpoint serving the published read views
    pub view_store_url: String,
    pub view_store_token: Option<String>,

    /// Comma-separated operator emails; empty denies everyone
    pub allowed_emails: String,
    pub session_jwt_secret: String,

    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            sheet_api_url: std::env::var("SHEET_API_URL").unwrap_or_default(),
            sheet_api_key: std::env::var("SHEET_API_KEY").unwrap_or_default(),

            view_store_url: std::env::var("VIEW_STORE_URL").unwrap_or_default(),
            view_store_token: std::env::var("VIEW_STORE_TOKEN").ok(),

            allowed_emails: std::env::var("AUTH_ALLOWED_EMAILS").unwrap_or_default(),
            session_jwt_secret: std::env::var("SESSION_JWT_SECRET").unwrap_or_default(),

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
