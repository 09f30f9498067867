//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use grid_connect::db::DatabaseConfig;
use std::net::{Ipv4Addr, SocketAddr};

/// Bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 6969);

/// Shortest accepted JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; `None` keeps matches in memory
    pub database: Option<DatabaseConfig>,
    /// Security configuration
    pub security: SecurityConfig,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT verification secret (required)
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?,
                Err(_) => DEFAULT_BIND,
            },
        };

        let database = match database_url_override {
            Some(url) => Some(DatabaseConfig::with_url(url)),
            None => DatabaseConfig::from_env(),
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let config = ServerConfig {
            bind,
            database,
            security: SecurityConfig { jwt_secret },
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        if let Some(database) = &self.database {
            if database.database_url.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_URL".to_string(),
                    reason: "Must not be empty".to_string(),
                });
            }

            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed DB_MAX_CONNECTIONS ({})",
                        database.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
