//! Gas-cost anomaly check.
//!
//! Converts the chain's current gas price into fiat using the static
//! native-token price table and flags it above a fixed threshold. The
//! check always ends the chain.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use exguard_core::{AlertInput, DetailRecord, ProcessedResult};

use crate::evaluator::{EvalError, Evaluator};
use crate::sources::{GasPriceSource, NativeTokenPrices};

/// Threshold in the same scale as `gas_price / 1e18 * native_price`.
pub const GAS_PRICE_THRESHOLD_IN_USD: f64 = 100_000_000.0;

pub const HIGH_GAS_SCORE: f64 = 500.0;

const WEI_PER_NATIVE: f64 = 1e18;

#[derive(Debug, Clone)]
pub struct GasPriceCheckConfig {
    pub name: String,
    pub threshold_usd: f64,
}

impl Default for GasPriceCheckConfig {
    fn default() -> Self {
        Self {
            name: "TransactionGasPriceCheckAlertProcessor".to_string(),
            threshold_usd: GAS_PRICE_THRESHOLD_IN_USD,
        }
    }
}

pub struct GasPriceCheck {
    config: GasPriceCheckConfig,
    source: Arc<dyn GasPriceSource>,
    prices: NativeTokenPrices,
}

impl GasPriceCheck {
    pub fn new(
        config: GasPriceCheckConfig,
        source: Arc<dyn GasPriceSource>,
        prices: NativeTokenPrices,
    ) -> Self {
        Self {
            config,
            source,
            prices,
        }
    }
}

/// Gas price in wei as a JSON number, or a decimal string past `u64`.
fn wei_value(wei: u128) -> Value {
    match u64::try_from(wei) {
        Ok(v) => Value::from(v),
        Err(_) => Value::from(wei.to_string()),
    }
}

#[async_trait]
impl Evaluator for GasPriceCheck {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
        let native_price = self
            .prices
            .get(alert.chain_id)
            .ok_or(EvalError::MissingPrice(alert.chain_id))?;
        let gas_price = self.source.gas_price(alert.chain_id).await?;
        let gas_price_in_usd = gas_price as f64 / WEI_PER_NATIVE * native_price;
        let threshold = self.config.threshold_usd;

        if gas_price_in_usd > threshold {
            return Ok(ProcessedResult::stop(
                HIGH_GAS_SCORE,
                DetailRecord::new()
                    .with("gas_price", wei_value(gas_price))
                    .with("gas_price_in_usd", gas_price_in_usd)
                    .with(
                        "risk_reason",
                        format!(
                            "gas_price_in_usd({gas_price_in_usd}) > GasPriceThresholdInUSD({threshold}). \
                             It is a suspicious high gas price, please check it."
                        ),
                    ),
            ));
        }

        Ok(ProcessedResult::stop(
            0.0,
            DetailRecord::new().with("gas_price", wei_value(gas_price)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;

    struct FixedGas(u128);

    #[async_trait]
    impl GasPriceSource for FixedGas {
        async fn gas_price(&self, _chain_id: u64) -> Result<u128, SourceError> {
            Ok(self.0)
        }
    }

    struct DownRpc;

    #[async_trait]
    impl GasPriceSource for DownRpc {
        async fn gas_price(&self, chain_id: u64) -> Result<u128, SourceError> {
            Err(SourceError::UnknownChain(chain_id))
        }
    }

    fn check(source: Arc<dyn GasPriceSource>) -> GasPriceCheck {
        GasPriceCheck::new(
            GasPriceCheckConfig::default(),
            source,
            NativeTokenPrices::default(),
        )
    }

    fn alert(chain_id: u64) -> AlertInput {
        AlertInput::new(chain_id, "0xvictim", "0xexploiter", "0xtx")
    }

    #[tokio::test]
    async fn normal_gas_is_terminal_with_zero_score() {
        // 50 gwei at $2000 → 100 in threshold units
        let result = check(Arc::new(FixedGas(50_000_000_000)))
            .decide(&alert(1))
            .await
            .unwrap();

        assert!(!result.need_more_check);
        assert_eq!(result.score, 0.0);
        assert_eq!(
            result.process_details[0].get("gas_price"),
            Some(&Value::from(50_000_000_000u64))
        );
    }

    #[tokio::test]
    async fn extreme_gas_scores_high() {
        // 1e14 native units of gas price at $700 → 7e16, far above the threshold
        let wei = 100_000_000_000_000_000_000_000_000_000_000u128;
        let result = check(Arc::new(FixedGas(wei))).decide(&alert(56)).await.unwrap();

        assert!(!result.need_more_check);
        assert_eq!(result.score, HIGH_GAS_SCORE);
        let detail = &result.process_details[0];
        assert!(detail.get_str("risk_reason").unwrap().contains("suspicious high gas price"));
        assert_eq!(detail.get_str("gas_price"), Some(wei.to_string().as_str()));
    }

    #[tokio::test]
    async fn unpriced_chain_fails_closed() {
        let result = check(Arc::new(FixedGas(1))).evaluate(&alert(137)).await;
        assert!(result.is_failure());
        assert!(result.process_details[0]
            .get_str("reason")
            .unwrap()
            .contains("no native token price configured for chain 137"));
    }

    #[tokio::test]
    async fn rpc_failure_fails_closed() {
        let result = check(Arc::new(DownRpc)).evaluate(&alert(1)).await;
        assert!(result.is_failure());
    }
}
