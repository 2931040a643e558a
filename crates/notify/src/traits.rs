//! Notifier trait definition and shared error types.

use exguard_core::{AlertInput, ProcessedResult};

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint rejected notification: {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Payload delivered for an alert whose score crossed the threshold.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RiskNotice {
    pub alert_id: String,
    pub attacked_address: String,
    pub exploiter_address: String,
    pub risk_score: f64,
    pub result: ProcessedResult,
}

impl RiskNotice {
    pub fn new(alert_id: impl Into<String>, alert: &AlertInput, result: ProcessedResult) -> Self {
        Self {
            alert_id: alert_id.into(),
            attacked_address: alert.attacked_address.clone(),
            exploiter_address: alert.exploiter_address.clone(),
            risk_score: result.score,
            result,
        }
    }
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notice through this channel.
    async fn send(&self, notice: &RiskNotice) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "webhook").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching a notice to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub alert_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use exguard_core::DetailRecord;

    #[test]
    fn notice_carries_alert_parties_and_score() {
        let alert = AlertInput::new(1, "0xvictim", "0xexploiter", "0xtx");
        let result = ProcessedResult::stop(500.0, DetailRecord::reason("high gas"));

        let notice = RiskNotice::new("a-1", &alert, result);
        let json = serde_json::to_value(&notice).unwrap();

        assert_eq!(json["alert_id"], "a-1");
        assert_eq!(json["attacked_address"], "0xvictim");
        assert_eq!(json["exploiter_address"], "0xexploiter");
        assert_eq!(json["risk_score"], 500.0);
        assert_eq!(json["result"]["need_more_check"], false);
        assert_eq!(json["result"]["process_details"][0]["reason"], "high gas");
    }
}
