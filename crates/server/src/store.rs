//! Alert record persistence.
//!
//! `PgAlertStore` backs the service when `DATABASE_URL` is set;
//! `MemoryAlertStore` is used otherwise and in tests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;

/// Risk score stored until background evaluation finishes.
pub const PENDING_SCORE: &str = "PENDING";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("alert {0} already exists")]
    Duplicate(String),

    #[error("unknown severity `{0}`")]
    InvalidSeverity(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Unknown,
    Suspicious,
    Critical,
    Undefined,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "UNKNOWN",
            Severity::Suspicious => "SUSPICIOUS",
            Severity::Critical => "CRITICAL",
            Severity::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Severity::Unknown),
            "SUSPICIOUS" => Ok(Severity::Suspicious),
            "CRITICAL" => Ok(Severity::Critical),
            "UNDEFINED" => Ok(Severity::Undefined),
            other => Err(StoreError::InvalidSeverity(other.to_string())),
        }
    }
}

/// One received alert and, once evaluated, its risk score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub alert_id: String,
    pub attacked_address: String,
    pub exploiter_address: String,
    pub severity: Severity,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// `PENDING` until evaluated, then the score rendered as text.
    pub risk_score: Option<String>,
}

impl AlertRecord {
    /// A freshly received alert awaiting evaluation.
    pub fn received(alert_id: impl Into<String>, alert: &exguard_core::AlertInput) -> Self {
        Self {
            alert_id: alert_id.into(),
            attacked_address: alert.attacked_address.clone(),
            exploiter_address: alert.exploiter_address.clone(),
            severity: Severity::Suspicious,
            message: Some(format!("Alert for transaction {}", alert.tx_hash)),
            timestamp: Utc::now(),
            risk_score: Some(PENDING_SCORE.to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, record: &AlertRecord) -> Result<(), StoreError>;

    async fn get(&self, alert_id: &str) -> Result<Option<AlertRecord>, StoreError>;

    /// Overwrite the risk score. Returns `false` when no such alert exists.
    async fn set_risk_score(&self, alert_id: &str, risk_score: &str) -> Result<bool, StoreError>;
}

// ── In-memory ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    records: RwLock<HashMap<String, AlertRecord>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.alert_id) {
            return Err(StoreError::Duplicate(record.alert_id.clone()));
        }
        records.insert(record.alert_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, alert_id: &str) -> Result<Option<AlertRecord>, StoreError> {
        Ok(self.records.read().await.get(alert_id).cloned())
    }

    async fn set_risk_score(&self, alert_id: &str, risk_score: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(alert_id) {
            Some(record) => {
                record.risk_score = Some(risk_score.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── PostgreSQL ───────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct AlertRow {
    alert_id: String,
    attacked_address: String,
    exploiter_address: String,
    severity: String,
    message: Option<String>,
    timestamp: DateTime<Utc>,
    risk_score: Option<String>,
}

impl TryFrom<AlertRow> for AlertRecord {
    type Error = StoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Self {
            alert_id: row.alert_id,
            attacked_address: row.attacked_address,
            exploiter_address: row.exploiter_address,
            severity: row.severity.parse()?,
            message: row.message,
            timestamp: row.timestamp,
            risk_score: row.risk_score,
        })
    }
}

pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlertStore for PgAlertStore {
    async fn insert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO alerts \
             (alert_id, attacked_address, exploiter_address, severity, \
             message, timestamp, risk_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&record.alert_id)
        .bind(&record.attacked_address)
        .bind(&record.exploiter_address)
        .bind(record.severity.as_str())
        .bind(&record.message)
        .bind(record.timestamp)
        .bind(&record.risk_score)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, alert_id: &str) -> Result<Option<AlertRecord>, StoreError> {
        let row = sqlx::query_as::<_, AlertRow>(
            "SELECT alert_id, attacked_address, exploiter_address, severity, \
             message, timestamp, risk_score \
             FROM alerts WHERE alert_id = $1",
        )
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AlertRecord::try_from).transpose()
    }

    async fn set_risk_score(&self, alert_id: &str, risk_score: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE alerts SET risk_score = $2 WHERE alert_id = $1")
            .bind(alert_id)
            .bind(risk_score)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
