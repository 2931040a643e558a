use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub labels: LabelConfig,
    pub chains: ChainConfig,
    pub notify: NotifyConfig,
    pub risk: RiskConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `EXGUARD_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("EXGUARD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            postgres: PostgresConfig::from_env_profiled(p),
            labels: LabelConfig::from_env_profiled(p),
            chains: ChainConfig::from_env_profiled(p),
            notify: NotifyConfig::from_env_profiled(p),
            risk: RiskConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!("  postgres:    configured={}", self.postgres.is_configured());
        tracing::info!(
            "  labels:      base_url={}, cookie={}, ignored={:?}",
            self.labels.arkm_base_url,
            if self.labels.arkm_cookie.is_some() { "set" } else { "(none)" },
            self.labels.ignored_entity_types
        );
        tracing::info!(
            "  chains:      providers for {:?}",
            self.chains.provider_urls.keys().collect::<Vec<_>>()
        );
        tracing::info!(
            "  notify:      webhook={}, threshold={}",
            if self.notify.webhook_url.is_some() { "set" } else { "(none)" },
            self.notify.score_threshold
        );
        tracing::info!(
            "  risk:        enabled={}, fresh_account_hours={}",
            self.risk.enabled,
            self.risk.fresh_account_hours
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in `x-api-key` or `?api_key=`.
    pub api_key: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 8000),
            api_key: profiled_env_or(p, "API_KEY", "default_secret_key_change_in_production"),
        }
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl PostgresConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            database_url: profiled_env_opt(p, "DATABASE_URL"),
            max_connections: profiled_env_parse(p, "PG_MAX_CONNECTIONS", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }
}

// ── Label intelligence ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub arkm_cookie: Option<String>,
    pub arkm_base_url: String,
    /// Entity types that stop the label checks (compared case-insensitively).
    pub ignored_entity_types: Vec<String>,
}

impl LabelConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            arkm_cookie: profiled_env_opt(p, "ARKM_COOKIE"),
            arkm_base_url: profiled_env_or(p, "ARKM_BASE_URL", "https://api.arkm.com"),
            ignored_entity_types: split_list(&profiled_env_or(p, "IGNORED_ENTITY_TYPES", "hacker")),
        }
    }
}

// ── Chains ────────────────────────────────────────────────────

pub const DEFAULT_PROVIDER_URLS: &str = "1=https://eth-mainnet.g.alchemy.com/v2/,\
56=https://bsc-dataseed.binance.org/,\
137=https://polygon-rpc.com/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id → JSON-RPC provider URL.
    pub provider_urls: BTreeMap<u64, String>,
}

impl ChainConfig {
    fn from_env_profiled(p: &str) -> Self {
        let raw = profiled_env_or(p, "CHAIN_PROVIDER_URLS", DEFAULT_PROVIDER_URLS);
        let provider_urls = match Self::parse_provider_urls(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "invalid CHAIN_PROVIDER_URLS, using defaults");
                Self::parse_provider_urls(DEFAULT_PROVIDER_URLS).unwrap_or_default()
            }
        };
        Self { provider_urls }
    }

    /// Parse `"1=https://a,56=https://b"` into a chain → URL map.
    pub fn parse_provider_urls(raw: &str) -> Result<BTreeMap<u64, String>, CoreError> {
        let mut map = BTreeMap::new();
        for entry in split_list(raw) {
            let (chain, url) = entry.split_once('=').ok_or_else(|| {
                CoreError::Config(format!("expected `<chain_id>=<url>`, got `{entry}`"))
            })?;
            let chain_id: u64 = chain.trim().parse().map_err(|_| {
                CoreError::Config(format!("chain id `{}` is not an integer", chain.trim()))
            })?;
            map.insert(chain_id, url.trim().to_string());
        }
        Ok(map)
    }
}

// ── Notifications ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    /// Notify only when the aggregate score is strictly above this value.
    pub score_threshold: f64,
}

impl NotifyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "NOTIFY_WEBHOOK_URL"),
            score_threshold: profiled_env_parse(p, "NOTIFY_SCORE_THRESHOLD", 200.0),
        }
    }
}

// ── Risk checks ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub enabled: bool,
    pub fresh_account_hours: i64,
    pub fresh_account_score: f64,
}

pub const DEFAULT_FRESH_ACCOUNT_HOURS: i64 = 24;
pub const DEFAULT_FRESH_ACCOUNT_SCORE: f64 = 300.0;
/// Upper bound for the fresh-account window (ten years).
pub const MAX_FRESH_ACCOUNT_HOURS: i64 = 24 * 365 * 10;

impl RiskConfig {
    fn from_env_profiled(p: &str) -> Self {
        let hours = profiled_env_parse(p, "FRESH_ACCOUNT_HOURS", DEFAULT_FRESH_ACCOUNT_HOURS);
        let score = profiled_env_parse(p, "FRESH_ACCOUNT_SCORE", DEFAULT_FRESH_ACCOUNT_SCORE);
        Self {
            enabled: profiled_env_bool(p, "RISK_CHECK_ENABLED", true),
            fresh_account_hours: Self::checked_hours(hours).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid FRESH_ACCOUNT_HOURS, using default");
                DEFAULT_FRESH_ACCOUNT_HOURS
            }),
            fresh_account_score: Self::checked_score(score).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid FRESH_ACCOUNT_SCORE, using default");
                DEFAULT_FRESH_ACCOUNT_SCORE
            }),
        }
    }

    /// Window must be positive and at most [`MAX_FRESH_ACCOUNT_HOURS`].
    pub fn checked_hours(hours: i64) -> Result<i64, CoreError> {
        if (1..=MAX_FRESH_ACCOUNT_HOURS).contains(&hours) {
            Ok(hours)
        } else {
            Err(CoreError::Config(format!(
                "fresh account window {hours}h outside 1..={MAX_FRESH_ACCOUNT_HOURS}"
            )))
        }
    }

    /// Scores only ever add to the total, so they must be finite and non-negative.
    pub fn checked_score(score: f64) -> Result<f64, CoreError> {
        if score.is_finite() && score >= 0.0 {
            Ok(score)
        } else {
            Err(CoreError::Config(format!(
                "fresh account score {score} must be finite and non-negative"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_provider_urls_parse() {
        let map = ChainConfig::parse_provider_urls(DEFAULT_PROVIDER_URLS).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&56], "https://bsc-dataseed.binance.org/");
    }

    #[test]
    fn provider_urls_reject_missing_separator() {
        let err = ChainConfig::parse_provider_urls("1=https://a,https://b").unwrap_err();
        assert!(err.to_string().contains("https://b"));
    }

    #[test]
    fn provider_urls_reject_non_numeric_chain() {
        assert!(ChainConfig::parse_provider_urls("eth=https://a").is_err());
    }

    #[test]
    fn profile_prefix_wins_over_plain_key() {
        std::env::set_var("EXGCFG_TEST_KEY", "plain");
        std::env::set_var("STAGING_EXGCFG_TEST_KEY", "staged");
        assert_eq!(profiled_env_or("STAGING", "EXGCFG_TEST_KEY", "x"), "staged");
        assert_eq!(profiled_env_or("", "EXGCFG_TEST_KEY", "x"), "plain");
        std::env::remove_var("EXGCFG_TEST_KEY");
        std::env::remove_var("STAGING_EXGCFG_TEST_KEY");
    }

    #[test]
    fn bool_flags_accept_common_spellings() {
        std::env::set_var("EXGCFG_FLAG", "Yes");
        assert!(profiled_env_bool("", "EXGCFG_FLAG", false));
        std::env::set_var("EXGCFG_FLAG", "0");
        assert!(!profiled_env_bool("", "EXGCFG_FLAG", true));
        std::env::remove_var("EXGCFG_FLAG");
        assert!(profiled_env_bool("", "EXGCFG_FLAG", true));
    }

    #[test]
    fn negative_fresh_score_falls_back_to_default() {
        std::env::set_var("RISKNEG_FRESH_ACCOUNT_SCORE", "-300");
        let risk = RiskConfig::from_env_profiled("RISKNEG");
        assert_eq!(risk.fresh_account_score, DEFAULT_FRESH_ACCOUNT_SCORE);
        std::env::remove_var("RISKNEG_FRESH_ACCOUNT_SCORE");

        assert!(RiskConfig::checked_score(f64::NAN).is_err());
        assert_eq!(RiskConfig::checked_score(0.0).unwrap(), 0.0);
    }

    #[test]
    fn oversized_fresh_window_falls_back_to_default() {
        std::env::set_var("RISKBIG_FRESH_ACCOUNT_HOURS", "9223372036854775807");
        let risk = RiskConfig::from_env_profiled("RISKBIG");
        assert_eq!(risk.fresh_account_hours, DEFAULT_FRESH_ACCOUNT_HOURS);
        std::env::remove_var("RISKBIG_FRESH_ACCOUNT_HOURS");

        assert!(RiskConfig::checked_hours(0).is_err());
        assert!(RiskConfig::checked_hours(-5).is_err());
        assert_eq!(RiskConfig::checked_hours(48).unwrap(), 48);
    }

    #[test]
    fn ignored_entity_types_split_on_commas() {
        assert_eq!(split_list("hacker, scammer,,"), vec!["hacker", "scammer"]);
    }
}
