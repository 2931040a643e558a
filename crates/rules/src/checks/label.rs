//! Entity-label reputation checks for the exploiter and victim addresses.
//!
//! An address whose entity type is known and outside the ignore-set lets
//! the chain continue. An unlabeled address, or one whose type is in the
//! ignore-set (by default `hacker`), ends the chain with score 0.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use exguard_core::{AlertInput, DetailRecord, ProcessedResult};

use crate::evaluator::{EvalError, Evaluator};
use crate::sources::LabelResolver;

/// Which side of the alert a label check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Exploiter,
    Victim,
}

impl Subject {
    pub fn address<'a>(&self, alert: &'a AlertInput) -> &'a str {
        match self {
            Subject::Exploiter => &alert.exploiter_address,
            Subject::Victim => &alert.attacked_address,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Exploiter => "exploiter",
            Subject::Victim => "victim",
        }
    }

    fn default_name(&self) -> &'static str {
        match self {
            Subject::Exploiter => "ExploiterARKMLabelCheckAlertProcessor",
            Subject::Victim => "VictimARKMLabelCheckAlertProcessor",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LabelCheckConfig {
    pub name: String,
    pub subject: Subject,
    pub ignored_entity_types: Vec<String>,
    /// Let the chain continue for unlabeled addresses instead of stopping.
    pub continue_on_unlabeled: bool,
}

impl LabelCheckConfig {
    pub fn for_subject(subject: Subject) -> Self {
        Self {
            name: subject.default_name().to_string(),
            subject,
            ignored_entity_types: vec!["hacker".to_string()],
            continue_on_unlabeled: false,
        }
    }

    pub fn exploiter() -> Self {
        Self::for_subject(Subject::Exploiter)
    }

    pub fn victim() -> Self {
        Self::for_subject(Subject::Victim)
    }

    pub fn ignoring(mut self, entity_types: Vec<String>) -> Self {
        self.ignored_entity_types = entity_types;
        self
    }
}

pub struct LabelCheck {
    config: LabelCheckConfig,
    resolver: Arc<LabelResolver>,
}

impl LabelCheck {
    pub fn new(config: LabelCheckConfig, resolver: Arc<LabelResolver>) -> Self {
        Self { config, resolver }
    }

    fn is_ignored(&self, entity_type: &str) -> bool {
        self.config
            .ignored_entity_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(entity_type))
    }
}

#[async_trait]
impl Evaluator for LabelCheck {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
        let subject = self.config.subject.as_str();
        let address = self.config.subject.address(alert);

        let entity_type = self
            .resolver
            .resolve(address, alert.chain_id)
            .await?
            .and_then(|profile| profile.entity_type);

        let result = match entity_type {
            Some(t) if self.is_ignored(&t) => ProcessedResult::stop(
                0.0,
                DetailRecord::reason(format!("entity type {t} is in ignored entity list"))
                    .with("entity_type", t),
            ),
            Some(t) => ProcessedResult::proceed(
                0.0,
                DetailRecord::reason(format!(
                    "{subject} is a {t} entity, not in ignored entity list"
                ))
                .with("entity_type", t),
            ),
            None => {
                let detail = DetailRecord::reason(format!(
                    "{subject} is not a entity, normal user or not tagged entity wallet"
                ))
                .with("entity_type", Value::Null);
                if self.config.continue_on_unlabeled {
                    ProcessedResult::proceed(0.0, detail)
                } else {
                    ProcessedResult::stop(0.0, detail)
                }
            }
        };
        Ok(result)
    }
}
