//! Gateway configuration.
//!
//! Resolved once at startup and handed to [`crate::HttpClinicalApi`], so request
//! handling never reads process environment.

use std::env;
use std::time::Duration;

use tracing::{debug, warn};

/// Base URL used when `HISTORIA_API_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Request timeout used when `HISTORIA_API_TIMEOUT_SECS` is not set
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings for the HTTP gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base path every endpoint is appended to, without trailing slash
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl GatewayConfig {
    /// Create a configuration for the given base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the configuration from the environment (and `.env` if present)
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_err() {
            debug!(".env file not found, using process environment only");
        }

        let base_url = env::var("HISTORIA_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env::var("HISTORIA_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "Invalid HISTORIA_API_TIMEOUT_SECS '{}', using {}",
                    raw, DEFAULT_TIMEOUT_SECS
                );
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs))
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
