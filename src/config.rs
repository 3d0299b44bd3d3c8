//! Configuration module for loading and parsing TOML configuration files.
//!
//! Every section is optional and defaulted. After loading, environment
//! variables (`HOST`, `PORT`, `DATABASE_URL`, `DB_*`, `ORDER_PREFIX`) take
//! precedence over file values.

use crate::orders::{DEFAULT_ORDER_PREFIX, DEFAULT_SEQUENCE_BASE};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Order numbering configuration.
    pub orders: OrdersConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Database configuration.
///
/// `url` wins over the individual fields when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string.
    pub url: Option<String>,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Password.
    pub password: String,
    /// Database name.
    pub name: String,
    /// libpq-style SSL mode (`disable`, `prefer`, `require`, ...).
    pub sslmode: String,
    /// Pool size.
    pub max_connections: u32,
    /// Connect and acquire timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postgres".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Order numbering configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Order number prefix.
    pub prefix: String,
    /// Sequence base; the first order number is `base + 1`.
    pub sequence_base: u64,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ORDER_PREFIX.to_string(),
            sequence_base: DEFAULT_SEQUENCE_BASE,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require an admin bearer token on `/api/admin/*`.
    pub protect_admin: bool,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: ["localhost", "127.0.0.1"]
                .iter()
                .flat_map(|host| {
                    (3000..=3002).map(move |port| format!("http://{}:{}", host, port))
                })
                .collect(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies process environment overrides and re-validates.
    ///
    /// # Errors
    /// Returns error if an override has an invalid value.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable source. Empty values are
    /// ignored.
    ///
    /// # Errors
    /// Returns error if an override has an invalid value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = parse_port("PORT", &port)?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = var("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = var("DB_PORT") {
            self.database.port = parse_port("DB_PORT", &port)?;
        }
        if let Some(user) = var("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = var("DB_NAME") {
            self.database.name = name;
        }
        if let Some(sslmode) = var("DB_SSLMODE") {
            self.database.sslmode = sslmode;
        }
        if let Some(prefix) = var("ORDER_PREFIX") {
            self.orders.prefix = prefix;
        }

        self.validate()
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.orders.prefix.is_empty()
            || !self.orders.prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ConfigError::InvalidValue(format!(
                "orders.prefix '{}' must be non-empty and alphanumeric",
                self.orders.prefix
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be positive".to_string(),
            ));
        }
        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "database.connect_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{} '{}' is not a valid port", key, value)))
}
