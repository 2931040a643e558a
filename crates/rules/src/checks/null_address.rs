use async_trait::async_trait;

use exguard_core::{AlertInput, DetailRecord, ProcessedResult};

use crate::evaluator::{EvalError, Evaluator};

pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub const NULL_ADDRESS_SCORE: f64 = 500.0;

/// Flags alerts whose victim is the zero address: funds "taken" from it
/// are a mint, not a theft.
pub struct NullAddressDetector {
    name: String,
}

impl NullAddressDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NullAddressDetector {
    fn default() -> Self {
        Self::new("VictimNULLAddressAlertProcessor")
    }
}

#[async_trait]
impl Evaluator for NullAddressDetector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
        if alert.attacked_address.eq_ignore_ascii_case(NULL_ADDRESS) {
            return Ok(ProcessedResult::stop(
                NULL_ADDRESS_SCORE,
                DetailRecord::reason(
                    "victim address is NULL_ADDRESS, it would be a suspicious mint.",
                )
                .with("entity_type", "victim"),
            ));
        }

        // Inconclusive: leave the decision to later checks.
        Ok(ProcessedResult::proceed(
            0.0,
            DetailRecord::reason("victim address is not NULL_ADDRESS")
                .with("entity_type", "victim"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_victim_is_suspicious_mint() {
        let alert = AlertInput::new(1, NULL_ADDRESS, "0xexploiter", "0xtx");
        let result = NullAddressDetector::default().evaluate(&alert).await;

        assert!(!result.need_more_check);
        assert_eq!(result.score, 500.0);
        let detail = &result.process_details[0];
        assert_eq!(detail.get_str("entity_type"), Some("victim"));
        assert!(detail.get_str("reason").unwrap().contains("NULL_ADDRESS"));
        assert!(detail.get_str("reason").unwrap().contains("suspicious mint"));
        assert_eq!(detail.evaluator_name(), Some("VictimNULLAddressAlertProcessor"));
    }

    #[tokio::test]
    async fn uppercase_hex_still_matches() {
        let alert = AlertInput::new(1, "0X0000000000000000000000000000000000000000", "0xe", "0xtx");
        let result = NullAddressDetector::default().decide(&alert).await.unwrap();
        assert_eq!(result.score, NULL_ADDRESS_SCORE);
    }

    #[tokio::test]
    async fn regular_victim_passes_through() {
        let alert = AlertInput::new(1, "0xdead00000000000000000000000000000000beef", "0xe", "0xtx");
        let result = NullAddressDetector::default().decide(&alert).await.unwrap();

        assert!(result.need_more_check);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.process_details.len(), 1);
    }
}
