//! Cache-first entity label resolution.

use std::sync::Arc;

use tracing::debug;

use crate::evaluator::EvalError;

use super::types::{network_for_chain, EntityProfile, LabelCache, LabelIntelligence};

/// Cache-first entity lookup shared by the label and account-age checks.
pub struct LabelResolver {
    cache: Arc<dyn LabelCache>,
    intelligence: Arc<dyn LabelIntelligence>,
}

impl LabelResolver {
    pub fn new(cache: Arc<dyn LabelCache>, intelligence: Arc<dyn LabelIntelligence>) -> Self {
        Self {
            cache,
            intelligence,
        }
    }

    /// Consult the local cache, falling back to live intelligence on a miss.
    ///
    /// A cache hit is final even when it carries no entity type.
    pub async fn resolve(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<Option<EntityProfile>, EvalError> {
        if let Some(profile) = self.cache.get(address, chain_id).await? {
            debug!(address, chain_id, "label cache hit");
            return Ok(Some(profile));
        }

        let network = network_for_chain(chain_id).ok_or(EvalError::UnsupportedChain(chain_id))?;
        Ok(self.intelligence.lookup(address, network).await?)
    }
}
