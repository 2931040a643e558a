use std::sync::Arc;

use exguard_notify::Dispatcher;
use exguard_rules::Evaluator;

use crate::store::AlertStore;

pub struct AppState {
    /// Shared secret clients must present.
    pub api_key: String,
    pub store: Arc<dyn AlertStore>,
    pub evaluator: Arc<dyn Evaluator>,
    pub dispatcher: Arc<Dispatcher>,
    /// When false, alerts are stored but never scored.
    pub risk_check_enabled: bool,
}
