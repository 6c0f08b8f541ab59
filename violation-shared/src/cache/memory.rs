/// In-process field cache

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheError, CachedFields, FieldCache};
use crate::models::field_definition::FieldDefinition;

#[derive(Debug, Default)]
struct State {
    generation: u64,
    active: Option<Vec<FieldDefinition>>,
}

/// Field cache held in process memory
///
/// Entries never expire; only invalidation clears them.
#[derive(Debug, Default)]
pub struct MemoryFieldCache {
    state: RwLock<State>,
}

impl MemoryFieldCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FieldCache for MemoryFieldCache {
    async fn get_active(&self) -> Result<CachedFields, CacheError> {
        let state = self.state.read().await;
        Ok(match &state.active {
            Some(fields) => CachedFields::Hit(fields.clone()),
            None => CachedFields::Miss {
                generation: state.generation,
            },
        })
    }

    async fn put_active(
        &self,
        fields: &[FieldDefinition],
        generation: u64,
    ) -> Result<bool, CacheError> {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return Ok(false);
        }
        state.active = Some(fields.to_vec());
        Ok(true)
    }

    async fn invalidate(&self) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.generation = state.generation.wrapping_add(1);
        state.active = None;
        Ok(())
    }
}
