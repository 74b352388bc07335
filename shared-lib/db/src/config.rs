//! Database configuration.

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

/// Database configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub username: String,
    /// Password
    #[serde(skip_serializing)]
    pub password: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl DbConfig {
    /// Create a new database configuration.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Read `DATABASE_*` variables. Returns `None` when no host is configured.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("DATABASE_HOST").ok().filter(|h| !h.is_empty())?;
        let mut config = Self {
            host,
            ..Self::default()
        };

        if let Ok(port) = std::env::var("DATABASE_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DATABASE_PORT: {}", port),
            }
        }
        if let Ok(name) = std::env::var("DATABASE_NAME") {
            config.database = name;
        }
        if let Ok(user) = std::env::var("DATABASE_USER") {
            config.username = user;
        }
        if let Ok(password) = std::env::var("DATABASE_PASSWORD") {
            config.password = password;
        }
        if let Ok(max) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            match max.parse() {
                Ok(max) => config.max_connections = max,
                Err(_) => tracing::warn!("Ignoring invalid DATABASE_MAX_CONNECTIONS: {}", max),
            }
        }

        Some(config)
    }

    /// Set the maximum number of connections.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the minimum number of connections.
    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Build connection options. Credentials are passed as-is, never through a URL.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: "cashbook".to_string(),
            username: "root".to_string(),
            password: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}
