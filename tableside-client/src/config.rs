//! Client configuration

use std::time::Duration;

/// Order list refresh period
pub const ORDER_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Dashboard summary refresh period
pub const SUMMARY_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// How long a notification stays visible
pub const NOTICE_DWELL: Duration = Duration::from_secs(5);

/// Client configuration for connecting to the order service
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | TABLESIDE_API_URL | http://localhost:8000 | Order service base URL |
/// | TABLESIDE_API_PREFIX | /api/qr-menu | Path prefix for every endpoint |
/// | TABLESIDE_TIMEOUT_SECS | 30 | Per-request timeout |
/// | TABLESIDE_ADMIN_SECRET | (unset) | Dashboard shared secret |
///
/// A `.env` file in the working directory is loaded first.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Path prefix prepended to every endpoint
    pub api_prefix: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Refresh period for order feeds
    pub order_poll_interval: Duration,

    /// Refresh period for the dashboard summary feed
    pub summary_poll_interval: Duration,

    /// Notification dwell time
    pub notice_dwell: Duration,

    /// Currency symbol for formatted prices
    pub currency_symbol: String,

    /// Dashboard shared secret; dashboard access is disabled when unset
    pub admin_secret: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: "/api/qr-menu".to_string(),
            timeout: 30,
            order_poll_interval: ORDER_POLL_INTERVAL,
            summary_poll_interval: SUMMARY_POLL_INTERVAL,
            notice_dwell: NOTICE_DWELL,
            currency_symbol: "₹".to_string(),
            admin_secret: None,
        }
    }

    /// Load configuration from the environment
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        let mut config = Self::new(
            std::env::var("TABLESIDE_API_URL").unwrap_or_else(|_| "http://localhost:8000".into()),
        );
        if let Ok(prefix) = std::env::var("TABLESIDE_API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(timeout) = std::env::var("TABLESIDE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = timeout;
        }
        config.admin_secret = std::env::var("TABLESIDE_ADMIN_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        config
    }

    /// Set the path prefix
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set both poll intervals
    pub fn with_poll_intervals(mut self, orders: Duration, summary: Duration) -> Self {
        self.order_poll_interval = orders;
        self.summary_poll_interval = summary;
        self
    }

    /// Set the notification dwell time
    pub fn with_notice_dwell(mut self, dwell: Duration) -> Self {
        self.notice_dwell = dwell;
        self
    }

    /// Set the currency symbol
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Set the dashboard shared secret
    pub fn with_admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    /// Join base URL, prefix and path
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        match self.api_prefix.trim_matches('/') {
            "" => format!("{}/{}", base, path),
            prefix => format!("{}/{}/{}", base, prefix, path),
        }
    }

    /// Create an HTTP order service from this configuration
    pub fn build_order_service(&self) -> crate::ClientResult<crate::NetworkOrderService> {
        crate::NetworkOrderService::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
