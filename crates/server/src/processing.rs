//! Background scoring of a stored alert.

use tracing::{error, info, warn};

use exguard_core::{AlertInput, ProcessedResult};
use exguard_notify::RiskNotice;

use crate::state::AppState;

/// Render a score the way it is persisted, keeping the fractional part
/// (`500.0`, not `500`).
pub fn score_label(score: f64) -> String {
    format!("{score:?}")
}

/// Score `alert`, record the score on `alert_id` and notify when it is
/// high enough. Never fails: storage and delivery problems are logged.
pub async fn process_alert(
    state: &AppState,
    alert_id: &str,
    alert: &AlertInput,
) -> ProcessedResult {
    let result = state.evaluator.evaluate(alert).await;

    match state.store.set_risk_score(alert_id, &score_label(result.score)).await {
        Ok(true) => info!(alert_id, score = result.score, "risk score recorded"),
        Ok(false) => warn!(alert_id, "alert record missing, risk score not recorded"),
        Err(e) => error!(alert_id, error = %e, "failed to record risk score"),
    }

    let notice = RiskNotice::new(alert_id, alert, result.clone());
    let deliveries = state.dispatcher.dispatch(&notice).await;
    if deliveries.iter().any(|d| !d.success) {
        warn!(alert_id, "one or more notification channels failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use exguard_core::DetailRecord;
    use exguard_notify::{Dispatcher, Notifier, NotifyError};
    use exguard_rules::{EvalError, Evaluator};

    use crate::store::{AlertRecord, AlertStore, MemoryAlertStore};

    struct Scored(f64);

    #[async_trait::async_trait]
    impl Evaluator for Scored {
        fn name(&self) -> &str {
            "Scored"
        }
        async fn decide(&self, _alert: &AlertInput) -> Result<ProcessedResult, EvalError> {
            Ok(ProcessedResult::stop(self.0, DetailRecord::reason("fixed")))
        }
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl Notifier for Counting {
        async fn send(&self, _notice: &RiskNotice) -> Result<(), NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn channel_name(&self) -> &str {
            "counting"
        }
    }

    async fn run(score: f64) -> (Option<String>, usize) {
        let sent = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(MemoryAlertStore::new());
        let channels: Vec<Box<dyn Notifier>> = vec![Box::new(Counting(sent.clone()))];
        let state = AppState {
            api_key: "k".into(),
            store: store.clone(),
            evaluator: Arc::new(Scored(score)),
            dispatcher: Arc::new(Dispatcher::new(channels, 200.0)),
            risk_check_enabled: true,
        };
        let alert = AlertInput::new(1, "0xvictim", "0xexploiter", "0xtx");
        store.insert(&AlertRecord::received("a-1", &alert)).await.unwrap();

        process_alert(&state, "a-1", &alert).await;

        let stored = store.get("a-1").await.unwrap().unwrap();
        (stored.risk_score, sent.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn high_score_is_recorded_and_notified() {
        let (score, sent) = run(500.0).await;
        assert_eq!(score.as_deref(), Some("500.0"));
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn threshold_score_is_not_notified() {
        let (score, sent) = run(200.0).await;
        assert_eq!(score.as_deref(), Some("200.0"));
        assert_eq!(sent, 0);
    }

    #[test]
    fn score_label_keeps_fraction() {
        assert_eq!(score_label(0.0), "0.0");
        assert_eq!(score_label(1000.0), "1000.0");
        assert_eq!(score_label(12.5), "12.5");
    }
}
