/// Redis-backed field cache
///
/// The active field list is stored as one JSON string under
/// [`ACTIVE_FIELDS_KEY`](super::ACTIVE_FIELDS_KEY) with a TTL, so every API
/// instance sharing the Redis sees the same invalidation. Invalidations also
/// increment [`GENERATION_KEY`](super::GENERATION_KEY); a write-back only lands
/// while that counter still matches the one read on the miss.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use violation_shared::cache::redis::RedisFieldCache;
/// use violation_shared::redis::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::new("redis://localhost:6379")).await?;
/// let cache = RedisFieldCache::new(client, Duration::from_secs(300));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::time::Duration;

use super::{CacheError, CachedFields, FieldCache, ACTIVE_FIELDS_KEY, GENERATION_KEY};
use crate::models::field_definition::FieldDefinition;
use crate::redis::RedisClient;

/// Sets KEYS[2] only if the counter at KEYS[1] still equals ARGV[1]
const PUT_IF_GENERATION: &str = r#"
local current = redis.call('GET', KEYS[1]) or '0'
if current == ARGV[1] then
    redis.call('SET', KEYS[2], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
"#;

impl From<::redis::RedisError> for CacheError {
    fn from(err: ::redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// Field cache stored in Redis
#[derive(Clone)]
pub struct RedisFieldCache {
    client: RedisClient,
    ttl: Duration,
}

impl RedisFieldCache {
    pub fn new(client: RedisClient, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    /// TTL in whole seconds; Redis rejects a zero expiry
    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl FieldCache for RedisFieldCache {
    async fn get_active(&self) -> Result<CachedFields, CacheError> {
        let mut conn = self.client.get_connection();
        let (raw, generation): (Option<String>, Option<u64>) = ::redis::cmd("MGET")
            .arg(ACTIVE_FIELDS_KEY)
            .arg(GENERATION_KEY)
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(json) => Ok(CachedFields::Hit(serde_json::from_str(&json)?)),
            None => Ok(CachedFields::Miss {
                generation: generation.unwrap_or(0),
            }),
        }
    }

    async fn put_active(
        &self,
        fields: &[FieldDefinition],
        generation: u64,
    ) -> Result<bool, CacheError> {
        let json = serde_json::to_string(fields)?;
        let mut conn = self.client.get_connection();
        let stored: i64 = ::redis::Script::new(PUT_IF_GENERATION)
            .key(GENERATION_KEY)
            .key(ACTIVE_FIELDS_KEY)
            .arg(generation)
            .arg(json)
            .arg(self.ttl_secs())
            .invoke_async(&mut conn)
            .await?;
        Ok(stored == 1)
    }

    async fn invalidate(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_connection();
        ::redis::pipe()
            .atomic()
            .incr(GENERATION_KEY, 1)
            .ignore()
            .del(ACTIVE_FIELDS_KEY)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), CacheError> {
        match self.client.ping().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CacheError::Backend("unexpected PING reply".to_string())),
            Err(e) => Err(CacheError::Backend(e.to_string())),
        }
    }
}
