//! Value objects exchanged between ingress, the evaluation pipeline and
//! the notification layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Score returned when an evaluator could not assess an alert.
///
/// Higher than any score a single check can legitimately produce, so a
/// failed assessment always dominates the aggregate.
pub const FAILURE_SCORE: f64 = 1000.0;

/// Detail key under which the producing evaluator's name is stamped.
pub const EVALUATOR_NAME_KEY: &str = "evaluator_name";

// ── AlertInput ──────────────────────────────────────────────────────

/// One exploit alert as delivered by the ingress webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertInput {
    pub chain_id: u64,
    pub attacked_address: String,
    pub exploiter_address: String,
    pub tx_hash: String,
}

impl AlertInput {
    pub fn new(
        chain_id: u64,
        attacked_address: impl Into<String>,
        exploiter_address: impl Into<String>,
        tx_hash: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            attacked_address: attacked_address.into(),
            exploiter_address: exploiter_address.into(),
            tx_hash: tx_hash.into(),
        }
    }

    /// Reject alerts with blank address or hash fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("attacked_address", &self.attacked_address),
            ("exploiter_address", &self.exploiter_address),
            ("tx_hash", &self.tx_hash),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidAlert(format!("`{field}` must not be empty")));
            }
        }
        Ok(())
    }
}

// ── DetailRecord ────────────────────────────────────────────────────

/// One structured entry of a result's reasoning trail.
///
/// Serialized as a flat JSON object, e.g.
/// `{"entity_type": "victim", "reason": "...", "evaluator_name": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailRecord(Map<String, Value>);

impl DetailRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record carrying only a `reason`.
    pub fn reason(reason: impl Into<String>) -> Self {
        Self::new().with("reason", reason.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn evaluator_name(&self) -> Option<&str> {
        self.get_str(EVALUATOR_NAME_KEY)
    }

    /// Stamp the evaluator name unless a (deeper) evaluator already did.
    pub fn tag(&mut self, evaluator: &str) {
        self.0
            .entry(EVALUATOR_NAME_KEY.to_string())
            .or_insert_with(|| Value::String(evaluator.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── ProcessedResult ─────────────────────────────────────────────────

/// Outcome of one evaluator call, or the aggregate of a whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    /// `true` = continue with the next check, `false` = stop here.
    pub need_more_check: bool,
    /// Non-negative risk score, summed across a chain.
    pub score: f64,
    pub process_details: Vec<DetailRecord>,
}

impl Default for ProcessedResult {
    fn default() -> Self {
        Self {
            need_more_check: true,
            score: 0.0,
            process_details: Vec::new(),
        }
    }
}

impl ProcessedResult {
    /// An inconclusive result: later checks should still run.
    pub fn proceed(score: f64, detail: DetailRecord) -> Self {
        Self {
            need_more_check: true,
            score,
            process_details: vec![detail],
        }
    }

    /// A conclusive result: the chain stops here.
    pub fn stop(score: f64, detail: DetailRecord) -> Self {
        Self {
            need_more_check: false,
            score,
            process_details: vec![detail],
        }
    }

    /// Terminal sentinel for an evaluator whose decision failed.
    pub fn failure(evaluator: &str, error: &dyn std::fmt::Display) -> Self {
        Self::stop(
            FAILURE_SCORE,
            DetailRecord::reason(format!("error in {evaluator}: {error}")),
        )
    }

    /// Stamp the first detail record with `evaluator`.
    ///
    /// A result with no records gets one holding just the name.
    pub fn tag_first(&mut self, evaluator: &str) {
        match self.process_details.first_mut() {
            Some(first) => first.tag(evaluator),
            None => {
                let mut record = DetailRecord::new();
                record.tag(evaluator);
                self.process_details.push(record);
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        self.score >= FAILURE_SCORE && !self.need_more_check
    }
}

// ── Tests ───────────────────────────────────────────────────────────
