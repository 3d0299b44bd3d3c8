//! Database connection pool management.

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{ConnectOptions, Connection, PgConnection, PgPool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Builds connection options from the database configuration.
///
/// # Errors
/// Returns an error if the URL or SSL mode cannot be parsed.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    if let Some(url) = config.url.as_deref() {
        return PgConnectOptions::from_str(url);
    }

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(PgSslMode::from_str(&config.sslmode)?))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Creates a new database pool from the configuration.
    ///
    /// # Arguments
    /// * `config` - Database section of the configuration
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established within the
    /// configured timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = connect_options(config)?;
        let timeout = Duration::from_secs(config.connect_timeout_secs);

        let pool = tokio::time::timeout(
            timeout,
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(timeout)
                .connect_with(options),
        )
        .await
        .map_err(|_| sqlx::Error::PoolTimedOut)??;

        info!("Database connection pool established");

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }
}

/// Opens a single connection with the given options and returns the server
/// version string.
///
/// # Errors
/// Returns an error if the server cannot be reached within `timeout` or
/// rejects the credentials.
pub async fn probe(options: PgConnectOptions, timeout: Duration) -> Result<String, sqlx::Error> {
    let options = options.disable_statement_logging();
    let mut conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
        .await
        .map_err(|_| {
            sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connection attempt timed out",
            ))
        })??;

    let (version,): (String,) = sqlx::query_as("SELECT version()")
        .fetch_one(&mut conn)
        .await?;
    conn.close().await?;

    debug!(%version, "Database probe succeeded");
    Ok(version)
}
