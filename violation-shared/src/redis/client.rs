/// Redis client wrapper with connection management and health checks
///
/// Wraps `redis::aio::ConnectionManager`, which reconnects on its own after a
/// dropped connection. The field cache is the only consumer.
///
/// # Example
///
/// ```no_run
/// use violation_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = RedisConfig::new("redis://localhost:6379");
/// let client = RedisClient::new(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Redis client errors
#[derive(Error, Debug)]
pub enum RedisClientError {
    /// Connection error
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    /// Command execution error
    #[error("Redis command error: {0}")]
    CommandError(String),

    /// Configuration error
    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    /// Command did not finish in time
    #[error("Redis command timed out after {0}s")]
    Timeout(u64),
}

impl From<RedisError> for RedisClientError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            ::redis::ErrorKind::IoError => {
                RedisClientError::ConnectionError(format!("IO error: {}", err))
            }
            _ => RedisClientError::CommandError(err.to_string()),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL
    ///
    /// Format: redis://[username:password@]host:port[/db]
    pub url: String,

    /// Command timeout in seconds
    pub command_timeout_secs: u64,
}

impl RedisConfig {
    /// Configuration for `url` with the default command timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            command_timeout_secs: 5,
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Cloneable Redis handle
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisClient {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            RedisClientError::ConfigError(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(url = %sanitize_url(&config.url), "Redis client connected");

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Sends PING and reports whether PONG came back
    pub async fn ping(&self) -> Result<bool, RedisClientError> {
        let mut conn = self.manager.clone();

        let reply: String = tokio::time::timeout(
            self.config.command_timeout(),
            ::redis::cmd("PING").query_async(&mut conn),
        )
        .await
        .map_err(|_| RedisClientError::Timeout(self.config.command_timeout_secs))??;

        if reply == "PONG" {
            Ok(true)
        } else {
            tracing::warn!(reply = %reply, "Unexpected reply to PING");
            Ok(false)
        }
    }

    /// Connection handle for issuing commands
    pub fn get_connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

/// Replaces credentials in a Redis URL with `***:***` for logging
pub fn sanitize_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > scheme_end {
            return format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..]);
        }
    }
    url.to_string()
}
