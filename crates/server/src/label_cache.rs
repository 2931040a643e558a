//! Label cache backed by the `contract_addresses` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use exguard_rules::sources::{EntityProfile, LabelCache, SourceError};

#[derive(Debug, sqlx::FromRow)]
struct ContractAddressRow {
    entity_id: Option<String>,
    entity_type: Option<String>,
    entity_name: Option<String>,
    /// JSON array of label strings, stored as text.
    labels: Option<String>,
    address_create_time: Option<DateTime<Utc>>,
}

impl ContractAddressRow {
    fn into_profile(self) -> EntityProfile {
        let labels = self
            .labels
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(raw) {
                Ok(labels) => Some(labels),
                Err(e) => {
                    debug!(error = %e, "ignoring unparseable labels column");
                    None
                }
            })
            .unwrap_or_default();

        EntityProfile {
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            entity_name: self.entity_name,
            labels,
            created_at: self.address_create_time,
        }
    }
}

pub struct PgLabelCache {
    pool: PgPool,
}

impl PgLabelCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LabelCache for PgLabelCache {
    async fn get(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<Option<EntityProfile>, SourceError> {
        let chain_id = i64::try_from(chain_id).map_err(|_| SourceError::UnknownChain(chain_id))?;
        let row = sqlx::query_as::<_, ContractAddressRow>(
            "SELECT entity_id, entity_type, entity_name, labels, address_create_time \
             FROM contract_addresses \
             WHERE lower(contract_address) = lower($1) AND chain_id = $2 \
             LIMIT 1",
        )
        .bind(address)
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SourceError::Backend(e.to_string()))?;

        Ok(row.map(ContractAddressRow::into_profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(labels: Option<&str>) -> ContractAddressRow {
        ContractAddressRow {
            entity_id: Some("binance".into()),
            entity_type: Some("cex".into()),
            entity_name: Some("Binance".into()),
            labels: labels.map(String::from),
            address_create_time: Some(Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn row_maps_to_profile() {
        let profile = row(Some(r#"["Hot Wallet","Deposit"]"#)).into_profile();
        assert_eq!(profile.entity_type.as_deref(), Some("cex"));
        assert_eq!(profile.entity_name.as_deref(), Some("Binance"));
        assert_eq!(profile.labels, vec!["Hot Wallet", "Deposit"]);
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn bad_labels_column_yields_no_labels() {
        assert!(row(Some("not json")).into_profile().labels.is_empty());
        assert!(row(Some("")).into_profile().labels.is_empty());
        assert!(row(None).into_profile().labels.is_empty());
    }
}
