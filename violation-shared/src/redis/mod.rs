/// Redis connectivity
///
/// Backs the shared field cache when `REDIS_URL` is configured.
///
/// # Example
///
/// ```no_run
/// use violation_shared::redis::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::new("redis://localhost:6379")).await?;
/// println!("Redis healthy: {}", client.ping().await?);
/// # Ok(())
/// # }
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
