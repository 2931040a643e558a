//! Collaborator traits, the entity profile they return, and their error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What is known about an address from a label source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entity_id: Option<String>,
    /// Classification, e.g. `"cex"`, `"hacker"`, `"dex"`.
    pub entity_type: Option<String>,
    pub entity_name: Option<String>,
    pub labels: Vec<String>,
    /// When the address was first seen / deployed.
    pub created_at: Option<DateTime<Utc>>,
}

impl EntityProfile {
    pub fn typed(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            ..Self::default()
        }
    }
}

/// Errors raised by collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no endpoint configured for chain {0}")]
    UnknownChain(u64),

    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("label store failed: {0}")]
    Backend(String),
}

/// Label-intelligence network name for a chain id.
pub fn network_for_chain(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("ethereum"),
        56 => Some("bsc"),
        137 => Some("polygon"),
        _ => None,
    }
}

/// Locally cached entity labels, populated by an external process.
///
/// Implementations must tolerate concurrent reads.
#[async_trait::async_trait]
pub trait LabelCache: Send + Sync {
    async fn get(&self, address: &str, chain_id: u64)
        -> Result<Option<EntityProfile>, SourceError>;
}

/// Remote label-intelligence service.
#[async_trait::async_trait]
pub trait LabelIntelligence: Send + Sync {
    /// Look up `address` on the service's `network` (e.g. `"ethereum"`).
    async fn lookup(&self, address: &str, network: &str)
        -> Result<Option<EntityProfile>, SourceError>;
}

/// Current gas price per chain, in wei.
#[async_trait::async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn gas_price(&self, chain_id: u64) -> Result<u128, SourceError>;
}
