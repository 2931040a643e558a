//! Server startup: collaborator wiring and shared state construction.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use exguard_core::Config;
use exguard_notify::{Dispatcher, Notifier, WebhookNotifier};
use exguard_rules::checks::SystemClock;
use exguard_rules::sources::{
    ArkmClient, JsonRpcGasPriceSource, LabelCache, MemoryLabelCache, NativeTokenPrices,
};
use exguard_rules::{standard_chain, ChainedEvaluator, Collaborators, PipelineSettings};

use crate::label_cache::PgLabelCache;
use crate::state::AppState;
use crate::store::{AlertStore, MemoryAlertStore, PgAlertStore};
use crate::db;

/// Build the standard scoring chain from config.
///
/// Labels are read from Postgres when a pool is given, otherwise from an
/// empty in-memory cache so every lookup falls through to the API.
pub fn build_evaluator(config: &Config, pool: Option<&PgPool>) -> anyhow::Result<ChainedEvaluator> {
    let label_cache: Arc<dyn LabelCache> = match pool {
        Some(pool) => Arc::new(PgLabelCache::new(pool.clone())),
        None => Arc::new(MemoryLabelCache::new()),
    };

    if config.labels.arkm_cookie.is_none() {
        warn!("ARKM_COOKIE not set, label lookups will likely be rejected");
    }
    let intelligence = Arc::new(ArkmClient::new(
        config.labels.arkm_base_url.clone(),
        config.labels.arkm_cookie.clone(),
    ));
    let gas_prices = Arc::new(JsonRpcGasPriceSource::new(config.chains.provider_urls.clone())?);

    let chain = standard_chain(
        &PipelineSettings::from_config(config),
        Collaborators {
            label_cache,
            intelligence,
            gas_prices,
            token_prices: NativeTokenPrices::default(),
            clock: Arc::new(SystemClock),
        },
    );
    info!(checks = ?chain.child_names(), "risk pipeline ready");
    Ok(chain)
}

/// Webhook channel when `NOTIFY_WEBHOOK_URL` is set, otherwise no channels.
pub fn build_dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(url) = &config.notify.webhook_url {
        channels.push(Box::new(WebhookNotifier::from_config(url.clone(), None, None)?));
    } else {
        info!("NOTIFY_WEBHOOK_URL not set, high-risk alerts will not be forwarded");
    }
    Ok(Dispatcher::new(channels, config.notify.score_threshold))
}

pub async fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = db::init_pg_pool(&config.postgres).await;

    let store: Arc<dyn AlertStore> = match &pool {
        Some(pool) => Arc::new(PgAlertStore::new(pool.clone())),
        None => Arc::new(MemoryAlertStore::new()),
    };

    Ok(Arc::new(AppState {
        api_key: config.server.api_key.clone(),
        store,
        evaluator: Arc::new(build_evaluator(config, pool.as_ref())?),
        dispatcher: Arc::new(build_dispatcher(config)?),
        risk_check_enabled: config.risk.enabled,
    }))
}
