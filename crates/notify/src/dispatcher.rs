//! Score-gated fan-out of risk notices.
//!
//! Only results scoring strictly above the threshold are delivered. Every
//! configured channel is tried; one channel failing does not block the
//! others.

use crate::traits::{DispatchResult, Notifier, RiskNotice};

/// Default notification threshold.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 200.0;

pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
    score_threshold: f64,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>, score_threshold: f64) -> Self {
        Self {
            channels,
            score_threshold,
        }
    }

    /// A dispatcher with no channels; `dispatch` is a no-op.
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_SCORE_THRESHOLD)
    }

    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn should_notify(&self, score: f64) -> bool {
        score > self.score_threshold
    }

    /// Deliver `notice` to every channel if its score clears the threshold.
    ///
    /// Returns one result per attempted delivery; empty when gated out or
    /// when no channels are configured.
    pub async fn dispatch(&self, notice: &RiskNotice) -> Vec<DispatchResult> {
        if !self.should_notify(notice.risk_score) {
            tracing::debug!(
                alert_id = %notice.alert_id,
                score = notice.risk_score,
                threshold = self.score_threshold,
                "score below notification threshold"
            );
            return Vec::new();
        }

        if self.channels.is_empty() {
            tracing::debug!(alert_id = %notice.alert_id, "no notification channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.send(notice).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        alert_id = %notice.alert_id,
                        channel = channel.channel_name(),
                        duration_ms,
                        "notification delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        alert_id = %notice.alert_id,
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "notification delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                alert_id: notice.alert_id.clone(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use exguard_core::{AlertInput, DetailRecord, ProcessedResult};

    use crate::traits::NotifyError;

    struct MockNotifier {
        name: String,
        send_count: Arc<AtomicUsize>,
        should_fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, _notice: &RiskNotice) -> Result<(), NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(NotifyError::Config("mock failure".to_string()))
            } else {
                Ok(())
            }
        }
        fn channel_name(&self) -> &str {
            &self.name
        }
    }

    fn mock(name: &str, should_fail: bool) -> (Box<dyn Notifier>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let notifier: Box<dyn Notifier> = Box::new(MockNotifier {
            name: name.to_string(),
            send_count: count.clone(),
            should_fail,
        });
        (notifier, count)
    }

    fn notice(score: f64) -> RiskNotice {
        let alert = AlertInput::new(1, "0xvictim", "0xexploiter", "0xtx");
        RiskNotice::new(
            "alert-1",
            &alert,
            ProcessedResult::stop(score, DetailRecord::reason("test")),
        )
    }

    #[tokio::test]
    async fn dispatch_to_all_channels() {
        let (a, count_a) = mock("a", false);
        let (b, count_b) = mock("b", false);
        let dispatcher = Dispatcher::new(vec![a, b], 200.0);

        let results = dispatcher.dispatch(&notice(500.0)).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success && r.alert_id == "alert-1"));
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn partial_failure_doesnt_block() {
        let (fail, _) = mock("fail", true);
        let (ok, count) = mock("ok", false);
        let dispatcher = Dispatcher::new(vec![fail, ok], 200.0);

        let results = dispatcher.dispatch(&notice(1000.0)).await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("Configuration error: mock failure"));
        assert!(results[1].success);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn threshold_is_strict() {
        let (a, count) = mock("a", false);
        let dispatcher = Dispatcher::new(vec![a], 200.0);

        assert!(dispatcher.dispatch(&notice(200.0)).await.is_empty());
        assert!(dispatcher.dispatch(&notice(0.0)).await.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert_eq!(dispatcher.dispatch(&notice(200.5)).await.len(), 1);
    }

    #[tokio::test]
    async fn empty_dispatcher_is_noop() {
        let dispatcher = Dispatcher::empty();
        assert!(dispatcher.should_notify(300.0));
        assert!(dispatcher.dispatch(&notice(300.0)).await.is_empty());
    }
}
