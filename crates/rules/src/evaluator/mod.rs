//! The evaluator contract shared by every risk check.
//!
//! A check implements [`Evaluator::decide`], its raw decision function.
//! Callers use [`Evaluator::evaluate`], which adds two behaviors on top:
//! - **Tagging**: the first detail record is stamped with the evaluator name.
//! - **Fail-closed conversion**: a decision error or panic never escapes; it
//!   becomes the terminal [`ProcessedResult::failure`] sentinel (score 1000, stop).

mod chained;

use std::any::Any;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, info};

use exguard_core::{AlertInput, ProcessedResult};

use crate::sources::SourceError;

pub use chained::{ChainedEvaluator, DEFAULT_CHAIN_NAME};

// ── Errors ──────────────────────────────────────────────────────────

/// Why a decision function could not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A collaborator (label cache, label intelligence, RPC) failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// No label-intelligence network is known for the chain.
    #[error("chain {0} has no label intelligence network")]
    UnsupportedChain(u64),

    /// No native token price is configured for the chain.
    #[error("no native token price configured for chain {0}")]
    MissingPrice(u64),

    /// A child of a composite failed; carries the child's name.
    #[error("{evaluator}: {source}")]
    Child {
        evaluator: String,
        source: Box<EvalError>,
    },

    #[error("{0}")]
    Other(String),
}

impl EvalError {
    /// Annotate the error with the evaluator it escaped from.
    pub fn within(self, evaluator: &str) -> Self {
        EvalError::Child {
            evaluator: evaluator.to_string(),
            source: Box::new(self),
        }
    }
}

/// Render a caught panic payload for the failure reason.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ── Evaluator trait ─────────────────────────────────────────────────

/// One risk heuristic applied to an alert.
///
/// Instances are built once and shared across concurrent evaluations,
/// hence `Send + Sync`; any per-call state lives on the stack of `decide`.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Configured name, used for tagging and error reasons.
    fn name(&self) -> &str;

    /// The check-specific decision function. Errors propagate.
    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError>;

    /// Run the check under the fail-closed contract. Never fails, and a
    /// panic inside `decide` is caught and escalated like an error.
    async fn evaluate(&self, alert: &AlertInput) -> ProcessedResult {
        let outcome = AssertUnwindSafe(self.decide(alert)).catch_unwind().await;
        let decided = match outcome {
            Ok(decided) => decided,
            Err(payload) => {
                let reason = format!("panic: {}", panic_message(payload.as_ref()));
                error!(
                    evaluator = self.name(),
                    tx_hash = %alert.tx_hash,
                    error = %reason,
                    "evaluation panicked, escalating"
                );
                return ProcessedResult::failure(self.name(), &reason);
            }
        };

        match decided {
            Ok(mut result) => {
                result.tag_first(self.name());
                info!(
                    evaluator = self.name(),
                    tx_hash = %alert.tx_hash,
                    score = result.score,
                    need_more_check = result.need_more_check,
                    details = result.process_details.len(),
                    "alert processed"
                );
                result
            }
            Err(e) => {
                error!(
                    evaluator = self.name(),
                    tx_hash = %alert.tx_hash,
                    error = %e,
                    "evaluation failed, escalating"
                );
                ProcessedResult::failure(self.name(), &e)
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use exguard_core::{DetailRecord, FAILURE_SCORE};

    struct Fixed(ProcessedResult);

    #[async_trait]
    impl Evaluator for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }
        async fn decide(&self, _alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl Evaluator for Broken {
        fn name(&self) -> &str {
            "Broken"
        }
        async fn decide(&self, _alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
            Err(EvalError::MissingPrice(10))
        }
    }

    struct Buggy;

    #[async_trait]
    impl Evaluator for Buggy {
        fn name(&self) -> &str {
            "Buggy"
        }
        async fn decide(&self, _alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
            let records: Vec<DetailRecord> = Vec::new();
            Ok(ProcessedResult::stop(0.0, records[0].clone()))
        }
    }

    fn alert() -> AlertInput {
        AlertInput::new(1, "0xvictim", "0xexploiter", "0xtx")
    }

    #[tokio::test]
    async fn success_tags_first_record() {
        let evaluator = Fixed(ProcessedResult::stop(500.0, DetailRecord::reason("hit")));
        let result = evaluator.evaluate(&alert()).await;
        assert_eq!(result.score, 500.0);
        assert_eq!(result.process_details[0].evaluator_name(), Some("Fixed"));
    }

    #[tokio::test]
    async fn empty_details_get_a_tagged_record() {
        let evaluator = Fixed(ProcessedResult::default());
        let result = evaluator.evaluate(&alert()).await;
        assert_eq!(result.process_details.len(), 1);
        assert_eq!(result.process_details[0].evaluator_name(), Some("Fixed"));
    }

    #[tokio::test]
    async fn error_becomes_sentinel() {
        let result = Broken.evaluate(&alert()).await;
        assert!(!result.need_more_check);
        assert_eq!(result.score, FAILURE_SCORE);
        assert_eq!(result.process_details.len(), 1);
        assert_eq!(
            result.process_details[0].get_str("reason"),
            Some("error in Broken: no native token price configured for chain 10")
        );
    }

    #[tokio::test]
    async fn panic_becomes_sentinel() {
        let result = Buggy.evaluate(&alert()).await;
        assert!(!result.need_more_check);
        assert_eq!(result.score, FAILURE_SCORE);
        let reason = result.process_details[0].get_str("reason").unwrap();
        assert!(reason.starts_with("error in Buggy: panic: "));
        assert!(reason.contains("index out of bounds"));
    }

    #[tokio::test]
    async fn panic_does_not_kill_spawned_task() {
        let handle = tokio::spawn(async move { Buggy.evaluate(&alert()).await });
        let result = handle.await.expect("task must not panic");
        assert!(result.is_failure());
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), "unknown panic payload");
    }

    #[test]
    fn within_prefixes_child_name() {
        let err = EvalError::UnsupportedChain(5).within("Leaf").within("Inner");
        assert_eq!(
            err.to_string(),
            "Inner: Leaf: chain 5 has no label intelligence network"
        );
    }
}
