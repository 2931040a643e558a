//! Account-age check on the exploiter address.
//!
//! Attack contracts and wallets are usually deployed or funded shortly
//! before the exploit. An exploiter first seen within `fresh_window` adds
//! `fresh_score`; older or undated addresses add nothing. The check never
//! ends the chain on its own.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use exguard_core::{AlertInput, DetailRecord, ProcessedResult};

use crate::evaluator::{EvalError, Evaluator};
use crate::sources::LabelResolver;

/// Source of "now", injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct AccountAgeCheckConfig {
    pub name: String,
    pub fresh_window: Duration,
    pub fresh_score: f64,
}

impl Default for AccountAgeCheckConfig {
    fn default() -> Self {
        Self {
            name: "ExploiterCreateTimeProcessor".to_string(),
            fresh_window: Duration::hours(24),
            fresh_score: 300.0,
        }
    }
}

pub struct AccountAgeCheck {
    config: AccountAgeCheckConfig,
    resolver: Arc<LabelResolver>,
    clock: Arc<dyn Clock>,
}

impl AccountAgeCheck {
    pub fn new(
        config: AccountAgeCheckConfig,
        resolver: Arc<LabelResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            resolver,
            clock,
        }
    }
}

#[async_trait]
impl Evaluator for AccountAgeCheck {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
        let created_at = self
            .resolver
            .resolve(&alert.exploiter_address, alert.chain_id)
            .await?
            .and_then(|profile| profile.created_at);

        let Some(created_at) = created_at else {
            return Ok(ProcessedResult::proceed(
                0.0,
                DetailRecord::reason("exploiter creation time unknown"),
            ));
        };

        let age = self.clock.now() - created_at;
        let window_hours = self.config.fresh_window.num_hours();
        let detail = DetailRecord::new()
            .with("created_at", created_at.to_rfc3339())
            .with("age_hours", age.num_hours());

        // A creation time in the future (clock skew) counts as fresh.
        if age < self.config.fresh_window {
            return Ok(ProcessedResult::proceed(
                self.config.fresh_score,
                detail.with(
                    "reason",
                    format!(
                        "exploiter address created {}h ago, within fresh window of {window_hours}h",
                        age.num_hours()
                    ),
                ),
            ));
        }

        Ok(ProcessedResult::proceed(
            0.0,
            detail.with(
                "reason",
                format!("exploiter address older than {window_hours}h"),
            ),
        ))
    }
}
