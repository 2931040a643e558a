//! Arkham intelligence client.
//!
//! Queries the enriched-address endpoint, which answers with one object
//! per network:
//!
//! ```json
//! { "ethereum": { "arkhamEntity": { "id": "binance", "name": "Binance", "type": "cex" },
//!                 "arkhamLabel": { "name": "Hot Wallet 14" } },
//!   "bsc": { ... } }
//! ```

use serde_json::Value;
use tracing::debug;

use super::types::{EntityProfile, LabelIntelligence, SourceError};

pub const DEFAULT_ARKM_BASE_URL: &str = "https://api.arkm.com";

/// HTTP client for the Arkham label-intelligence API.
///
/// Holds one pooled `reqwest::Client`; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct ArkmClient {
    base_url: String,
    cookie: Option<String>,
    client: reqwest::Client,
}

impl ArkmClient {
    pub fn new(base_url: impl Into<String>, cookie: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie,
            client: reqwest::Client::new(),
        }
    }

    fn enriched_url(&self, address: &str) -> String {
        format!(
            "{}/intelligence/address_enriched/{}/all?includeTags=true&includeEntityPredictions=true&includeClusters=true",
            self.base_url, address
        )
    }
}

#[async_trait::async_trait]
impl LabelIntelligence for ArkmClient {
    async fn lookup(
        &self,
        address: &str,
        network: &str,
    ) -> Result<Option<EntityProfile>, SourceError> {
        let mut request = self.client.get(self.enriched_url(address));
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        let profile = parse_enriched(&body, network)?;

        debug!(
            address,
            network,
            entity_type = profile.as_ref().and_then(|p| p.entity_type.as_deref()),
            "arkham lookup"
        );
        Ok(profile)
    }
}

/// Extract the entity for `network` from an enriched-address response.
pub(crate) fn parse_enriched(
    body: &Value,
    network: &str,
) -> Result<Option<EntityProfile>, SourceError> {
    let networks = body
        .as_object()
        .ok_or_else(|| SourceError::Malformed("expected an object keyed by network".into()))?;

    let Some(chain_data) = networks.get(network) else {
        return Ok(None);
    };
    let Some(entity) = chain_data.get("arkhamEntity").filter(|e| e.is_object()) else {
        return Ok(None);
    };

    let text = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).map(str::to_string);

    let labels = chain_data
        .get("arkhamLabel")
        .and_then(|l| text(l, "name"))
        .into_iter()
        .collect();

    Ok(Some(EntityProfile {
        entity_id: text(entity, "id"),
        entity_type: text(entity, "type"),
        entity_name: text(entity, "name"),
        labels,
        created_at: None,
    }))
}
