use std::time::Duration;

use auth::JwtConfig;
use cashbook_service::CarryPolicy;
use db::DbConfig;

/// Secret used when `JWT_SECRET` is not set. Only fit for local development.
pub const DEVELOPMENT_SECRET: &str = "cashbook-development-secret";

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP listen address
    pub http_addr: String,

    /// Token validation settings
    pub jwt: JwtConfig,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Ledger carry-over policy
    pub carry_policy: CarryPolicy,

    /// MySQL settings; `None` selects the in-memory store
    pub database: Option<DbConfig>,

    /// Service version
    pub version: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:8080".to_string(),
            jwt: JwtConfig::new(DEVELOPMENT_SECRET, "cashbook", 86_400),
            request_timeout_secs: 30,
            carry_policy: CarryPolicy::AllowCredit,
            database: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("GATEWAY_HTTP_ADDR") {
            config.http_addr = addr;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if secret.is_empty() {
                tracing::warn!("JWT_SECRET is empty, keeping the development secret");
            } else {
                config.jwt.secret = secret;
            }
        }

        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.jwt.issuer = issuer;
        }

        if let Ok(expires) = std::env::var("JWT_EXPIRES_IN_SECS") {
            match expires.parse() {
                Ok(n) => config.jwt.expires_in_secs = n,
                Err(_) => tracing::warn!("Ignoring invalid JWT_EXPIRES_IN_SECS: {}", expires),
            }
        }

        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(n) => config.request_timeout_secs = n,
                Err(_) => tracing::warn!("Ignoring invalid REQUEST_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Ok(policy) = std::env::var("CASHBOOK_CARRY_POLICY") {
            match policy.parse() {
                Ok(p) => config.carry_policy = p,
                Err(e) => tracing::warn!("Ignoring CASHBOOK_CARRY_POLICY: {}", e),
            }
        }

        config.database = DbConfig::from_env();

        config
    }

    /// Whether tokens are validated with [`DEVELOPMENT_SECRET`]
    pub fn uses_development_secret(&self) -> bool {
        self.jwt.secret == DEVELOPMENT_SECRET
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
