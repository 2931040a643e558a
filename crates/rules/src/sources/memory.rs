//! In-process label cache.

use std::collections::HashMap;
use std::sync::RwLock;

use super::types::{EntityProfile, LabelCache, SourceError};

/// Label cache held in memory, keyed by lowercase address and chain id.
///
/// Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryLabelCache {
    entries: RwLock<HashMap<(String, u64), EntityProfile>>,
}

impl MemoryLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: &str, chain_id: u64, profile: EntityProfile) {
        // A poisoned lock only means a writer panicked mid-insert; the map is still usable.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert((address.to_lowercase(), chain_id), profile);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl LabelCache for MemoryLabelCache {
    async fn get(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<Option<EntityProfile>, SourceError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SourceError::Backend("label cache lock poisoned".into()))?;
        Ok(entries.get(&(address.to_lowercase(), chain_id)).cloned())
    }
}
