//! Alert ingress handlers.
//!
//! Both alert endpoints authenticate with the shared API key, taken from
//! the `x-api-key` header or, failing that, the `api_key` query parameter.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use exguard_core::AlertInput;

use crate::processing;
use crate::state::AppState;
use crate::store::AlertRecord;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub alert_id: String,
    pub alert_data: AlertInput,
    pub risk_check_status: &'static str,
    pub detail: &'static str,
}

// ── Auth ─────────────────────────────────────────────────────────

fn authorize(state: &AppState, headers: &HeaderMap, query: &AuthQuery) -> ApiResult<()> {
    let from_header = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .filter(|k| !k.is_empty());
    let from_query = query.api_key.as_deref().filter(|k| !k.is_empty());

    match from_header.or(from_query) {
        None => Err(api_error(StatusCode::UNAUTHORIZED, "API key is required")),
        Some(key) if key != state.api_key => {
            Err(api_error(StatusCode::FORBIDDEN, "Invalid API key"))
        }
        Some(_) => Ok(()),
    }
}

// ── Handlers ─────────────────────────────────────────────────────

/// GET / -- liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Alert Webhook Service is running",
    })
}

/// POST /alert/submit -- store an alert and score it in the background.
pub async fn submit_alert(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    Json(alert): Json<AlertInput>,
) -> ApiResult<Json<SubmitResponse>> {
    authorize(&state, &headers, &query)?;
    alert
        .validate()
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let alert_id = uuid::Uuid::new_v4().to_string();
    let record = AlertRecord::received(&alert_id, &alert);

    state.store.insert(&record).await.map_err(|e| {
        error!(alert_id = %alert_id, error = %e, "failed to store alert");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to process alert: {e}"),
        )
    })?;
    info!(
        alert_id = %alert_id,
        chain_id = alert.chain_id,
        tx_hash = %alert.tx_hash,
        "alert received"
    );

    let (risk_check_status, detail) = if state.risk_check_enabled {
        let task_state = state.clone();
        let task_alert = alert.clone();
        let task_id = alert_id.clone();
        tokio::spawn(async move {
            processing::process_alert(&task_state, &task_id, &task_alert).await;
        });
        ("pending", "Alert received and risk check started in background")
    } else {
        ("disabled", "Alert received, risk check is disabled")
    };

    Ok(Json(SubmitResponse {
        status: "success",
        message: "Alert received and authenticated",
        alert_id,
        alert_data: alert,
        risk_check_status,
        detail,
    }))
}

/// GET /alert/alerts/{alert_id} -- fetch a stored alert and its score.
pub async fn get_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<AlertRecord>> {
    authorize(&state, &headers, &query)?;

    match state.store.get(&alert_id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "Alert not found")),
        Err(e) => {
            error!(alert_id = %alert_id, error = %e, "failed to load alert");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
