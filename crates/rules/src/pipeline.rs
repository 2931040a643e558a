//! Assembly of the standard alert-scoring chain.

use std::sync::Arc;

use chrono::Duration;

use exguard_core::config::RiskConfig;
use exguard_core::Config;
use tracing::warn;

use crate::checks::{
    AccountAgeCheck, AccountAgeCheckConfig, Clock, GasPriceCheck, GasPriceCheckConfig, LabelCheck,
    LabelCheckConfig, NullAddressDetector, Subject,
};
use crate::evaluator::{ChainedEvaluator, Evaluator};
use crate::sources::{
    GasPriceSource, LabelCache, LabelIntelligence, LabelResolver, NativeTokenPrices,
};

/// Tunables of the standard chain.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub ignored_entity_types: Vec<String>,
    pub fresh_window: Duration,
    pub fresh_score: f64,
    pub gas: GasPriceCheckConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let age = AccountAgeCheckConfig::default();
        Self {
            ignored_entity_types: vec!["hacker".to_string()],
            fresh_window: age.fresh_window,
            fresh_score: age.fresh_score,
            gas: GasPriceCheckConfig::default(),
        }
    }
}

impl PipelineSettings {
    /// Settings from config. Out-of-range risk values fall back to the
    /// defaults.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let fresh_window = RiskConfig::checked_hours(config.risk.fresh_account_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| {
                warn!(
                    hours = config.risk.fresh_account_hours,
                    "fresh window out of range, using default"
                );
                defaults.fresh_window
            });
        let fresh_score = match RiskConfig::checked_score(config.risk.fresh_account_score) {
            Ok(score) => score,
            Err(e) => {
                warn!(error = %e, "using default fresh account score");
                defaults.fresh_score
            }
        };

        Self {
            ignored_entity_types: config.labels.ignored_entity_types.clone(),
            fresh_window,
            fresh_score,
            ..defaults
        }
    }
}

/// Shared handles the checks call out to. Built once per process.
#[derive(Clone)]
pub struct Collaborators {
    pub label_cache: Arc<dyn LabelCache>,
    pub intelligence: Arc<dyn LabelIntelligence>,
    pub gas_prices: Arc<dyn GasPriceSource>,
    pub token_prices: NativeTokenPrices,
    pub clock: Arc<dyn Clock>,
}

/// Build the standard chain:
/// null-address → exploiter label → victim label → exploiter age → gas cost.
pub fn standard_chain(
    settings: &PipelineSettings,
    collaborators: Collaborators,
) -> ChainedEvaluator {
    let resolver = Arc::new(LabelResolver::new(
        collaborators.label_cache,
        collaborators.intelligence,
    ));

    let label = |subject: Subject| -> Arc<dyn Evaluator> {
        Arc::new(LabelCheck::new(
            LabelCheckConfig::for_subject(subject).ignoring(settings.ignored_entity_types.clone()),
            resolver.clone(),
        ))
    };

    let age_config = AccountAgeCheckConfig {
        fresh_window: settings.fresh_window,
        fresh_score: settings.fresh_score,
        ..AccountAgeCheckConfig::default()
    };

    let children: Vec<Arc<dyn Evaluator>> = vec![
        Arc::new(NullAddressDetector::default()),
        label(Subject::Exploiter),
        label(Subject::Victim),
        Arc::new(AccountAgeCheck::new(age_config, resolver.clone(), collaborators.clock)),
        Arc::new(GasPriceCheck::new(
            settings.gas.clone(),
            collaborators.gas_prices,
            collaborators.token_prices,
        )),
    ];
    ChainedEvaluator::with_children(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::SystemClock;
    use crate::sources::{EntityProfile, MemoryLabelCache, SourceError};

    struct Offline;

    #[async_trait::async_trait]
    impl LabelIntelligence for Offline {
        async fn lookup(
            &self,
            _address: &str,
            _network: &str,
        ) -> Result<Option<EntityProfile>, SourceError> {
            Ok(None)
        }
    }

    #[async_trait::async_trait]
    impl GasPriceSource for Offline {
        async fn gas_price(&self, _chain_id: u64) -> Result<u128, SourceError> {
            Ok(0)
        }
    }

    #[test]
    fn out_of_range_risk_values_keep_defaults() {
        let mut config = Config::for_profile("PIPELINE_SETTINGS_TEST");
        config.risk.fresh_account_hours = i64::MAX;
        config.risk.fresh_account_score = -300.0;

        let settings = PipelineSettings::from_config(&config);

        assert_eq!(settings.fresh_window, Duration::hours(24));
        assert_eq!(settings.fresh_score, 300.0);
    }

    #[test]
    fn risk_values_flow_into_settings() {
        let mut config = Config::for_profile("PIPELINE_SETTINGS_TEST");
        config.risk.fresh_account_hours = 72;
        config.risk.fresh_account_score = 150.0;

        let settings = PipelineSettings::from_config(&config);

        assert_eq!(settings.fresh_window, Duration::hours(72));
        assert_eq!(settings.fresh_score, 150.0);
    }

    #[test]
    fn standard_chain_order() {
        let collaborators = Collaborators {
            label_cache: Arc::new(MemoryLabelCache::new()),
            intelligence: Arc::new(Offline),
            gas_prices: Arc::new(Offline),
            token_prices: NativeTokenPrices::default(),
            clock: Arc::new(SystemClock),
        };
        let chain = standard_chain(&PipelineSettings::default(), collaborators);
        assert_eq!(
            chain.child_names(),
            vec![
                "VictimNULLAddressAlertProcessor",
                "ExploiterARKMLabelCheckAlertProcessor",
                "VictimARKMLabelCheckAlertProcessor",
                "ExploiterCreateTimeProcessor",
                "TransactionGasPriceCheckAlertProcessor",
            ]
        );
    }
}
