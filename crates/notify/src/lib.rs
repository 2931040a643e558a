//! Outbound notification of high-risk alerts.
//!
//! - `Notifier` trait for pluggable delivery channels
//! - `WebhookNotifier` posting the risk notice as JSON
//! - `Dispatcher` gating on score and fanning out to every channel

pub mod dispatcher;
pub mod traits;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use traits::{DispatchResult, Notifier, NotifyError, RiskNotice};
pub use webhook::WebhookNotifier;
