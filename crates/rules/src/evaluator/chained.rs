//! Composite evaluator running an ordered list of children.
//!
//! Children run strictly one after another. Each child's score is added to
//! a running total and its details appended; the first child that answers
//! `need_more_check = false` ends the run. The composite itself always
//! answers `need_more_check = false` to its caller.
//!
//! Children are invoked through their raw `decide`, not `evaluate`, so a
//! child error aborts the whole run and discards what was accumulated.
//! The composite's own `evaluate` then turns it into the failure sentinel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use exguard_core::{AlertInput, ProcessedResult};

use super::{EvalError, Evaluator};

pub const DEFAULT_CHAIN_NAME: &str = "ChainedProcessor";

/// Ordered, short-circuiting composition of evaluators.
pub struct ChainedEvaluator {
    name: String,
    children: Vec<Arc<dyn Evaluator>>,
}

impl ChainedEvaluator {
    pub fn new(name: impl Into<String>, children: Vec<Arc<dyn Evaluator>>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// A chain named [`DEFAULT_CHAIN_NAME`].
    pub fn with_children(children: Vec<Arc<dyn Evaluator>>) -> Self {
        Self::new(DEFAULT_CHAIN_NAME, children)
    }

    /// Append a child at the end of the chain.
    pub fn then(mut self, child: Arc<dyn Evaluator>) -> Self {
        self.children.push(child);
        self
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[async_trait]
impl Evaluator for ChainedEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&self, alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
        let mut score = 0.0;
        let mut details = Vec::new();

        for child in &self.children {
            let mut result = child
                .decide(alert)
                .await
                .map_err(|e| e.within(child.name()))?;
            result.tag_first(child.name());

            debug!(
                chain = %self.name,
                evaluator = child.name(),
                score = result.score,
                need_more_check = result.need_more_check,
                "chain step"
            );

            score += result.score;
            details.extend(result.process_details);

            if !result.need_more_check {
                return Ok(ProcessedResult {
                    need_more_check: false,
                    score,
                    process_details: details,
                });
            }
        }

        Ok(ProcessedResult {
            need_more_check: false,
            score,
            process_details: details,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
