/// Field definition cache
///
/// The report form reads the active field definitions on every page load, so they are
/// cached. Every mutation of `field_definitions` invalidates the cache wholesale;
/// readers reload from the database on the next miss.
///
/// Each invalidation bumps a generation counter. A miss reports the generation it
/// saw, and the reader's write-back is dropped if an invalidation happened since,
/// so rows loaded before a mutation never outlive its invalidation.
///
/// # Backends
///
/// - `memory`: In-process cache, used when no Redis is configured
/// - `redis`: Shared cache stored as one JSON value with a TTL
///
/// # Example
///
/// ```no_run
/// use violation_shared::cache::{load_active_fields, memory::MemoryFieldCache, FieldCache};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let cache = MemoryFieldCache::new();
///
/// // First call hits the database, second is served from the cache
/// let fields = load_active_fields(&cache, &pool).await?;
/// let again = load_active_fields(&cache, &pool).await?;
/// assert_eq!(fields, again);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::field_definition::FieldDefinition;

/// Cache key under which the active field list is stored
pub const ACTIVE_FIELDS_KEY: &str = "violation:fields:active";

/// Cache key holding the invalidation counter
pub const GENERATION_KEY: &str = "violation:fields:generation";

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache backend could not be reached or rejected the command
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// The cached value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CachedFields {
    /// The cached active fields
    Hit(Vec<FieldDefinition>),

    /// Nothing cached; `generation` is the invalidation count at lookup time
    Miss { generation: u64 },
}

/// Storage for the active field definitions
#[async_trait]
pub trait FieldCache: Send + Sync {
    /// Looks up the cached active fields
    async fn get_active(&self) -> Result<CachedFields, CacheError>;

    /// Stores the active fields if no invalidation happened since `generation`
    ///
    /// Returns whether the fields were stored.
    async fn put_active(
        &self,
        fields: &[FieldDefinition],
        generation: u64,
    ) -> Result<bool, CacheError>;

    /// Drops everything cached and bumps the generation
    async fn invalidate(&self) -> Result<(), CacheError>;

    /// Checks that the backend is reachable
    async fn health(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Returns the active fields, reading through the cache
///
/// Cache failures are logged and the database is used directly; only database
/// errors are returned.
pub async fn load_active_fields(
    cache: &dyn FieldCache,
    pool: &PgPool,
) -> Result<Vec<FieldDefinition>, sqlx::Error> {
    let generation = match cache.get_active().await {
        Ok(CachedFields::Hit(fields)) => {
            debug!(count = fields.len(), "Active fields served from cache");
            return Ok(fields);
        }
        Ok(CachedFields::Miss { generation }) => {
            debug!(generation, "Active field cache miss");
            Some(generation)
        }
        Err(e) => {
            warn!(error = %e, "Failed to read field cache");
            None
        }
    };

    let fields = FieldDefinition::list_active(pool).await?;

    if let Some(generation) = generation {
        match cache.put_active(&fields, generation).await {
            Ok(true) => {}
            Ok(false) => debug!(generation, "Field cache invalidated during load, not storing"),
            Err(e) => warn!(error = %e, "Failed to populate field cache"),
        }
    }

    Ok(fields)
}

/// Invalidates the cache after a mutation, logging instead of failing
pub async fn invalidate_after_mutation(cache: &dyn FieldCache) {
    match cache.invalidate().await {
        Ok(()) => debug!("Field cache invalidated"),
        Err(e) => warn!(error = %e, "Failed to invalidate field cache"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenCache {
        invalidations: AtomicUsize,
    }

    #[async_trait]
    impl FieldCache for BrokenCache {
        async fn get_active(&self) -> Result<CachedFields, CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }

        async fn put_active(
            &self,
            _fields: &[FieldDefinition],
            _generation: u64,
        ) -> Result<bool, CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }

        async fn invalidate(&self) -> Result<(), CacheError> {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Backend("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_invalidation_failure_is_swallowed() {
        let cache = BrokenCache {
            invalidations: AtomicUsize::new(0),
        };

        invalidate_after_mutation(&cache).await;
        assert_eq!(cache.invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_health_is_ok() {
        let cache = BrokenCache {
            invalidations: AtomicUsize::new(0),
        };
        assert!(cache.health().await.is_ok());
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::Backend("connection reset".to_string());
        assert_eq!(err.to_string(), "Cache backend error: connection reset");
    }
}
