//! JSON-RPC gas price source (`eth_gasPrice`).

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;

use super::types::{GasPriceSource, SourceError};

/// Fetches the current gas price from a per-chain JSON-RPC provider.
#[derive(Debug, Clone)]
pub struct JsonRpcGasPriceSource {
    endpoints: BTreeMap<u64, String>,
    client: reqwest::Client,
}

impl JsonRpcGasPriceSource {
    /// Build a source from a chain id → provider URL table.
    ///
    /// Every URL is validated up front so a typo fails at startup rather
    /// than on the first alert for that chain.
    pub fn new(endpoints: BTreeMap<u64, String>) -> Result<Self, SourceError> {
        for url in endpoints.values() {
            url::Url::parse(url).map_err(|e| SourceError::InvalidEndpoint {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            endpoints,
            client: reqwest::Client::new(),
        })
    }

    pub fn chains(&self) -> impl Iterator<Item = u64> + '_ {
        self.endpoints.keys().copied()
    }
}

#[async_trait::async_trait]
impl GasPriceSource for JsonRpcGasPriceSource {
    async fn gas_price(&self, chain_id: u64) -> Result<u128, SourceError> {
        let url = self
            .endpoints
            .get(&chain_id)
            .ok_or(SourceError::UnknownChain(chain_id))?;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_gasPrice",
            "params": []
        });

        let body: Value = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let wei = parse_rpc_quantity(&body)?;
        debug!(chain_id, wei = %wei, "gas price fetched");
        Ok(wei)
    }
}

/// Read a hex quantity from a JSON-RPC response envelope.
pub(crate) fn parse_rpc_quantity(body: &Value) -> Result<u128, SourceError> {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        return Err(SourceError::Rpc {
            code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    let raw = body
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| SourceError::Malformed("missing string `result`".into()))?;

    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| SourceError::Malformed(format!("quantity `{raw}` is not 0x-prefixed")))?;

    u128::from_str_radix(digits, 16)
        .map_err(|e| SourceError::Malformed(format!("quantity `{raw}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_result() {
        // 50 gwei
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": "0xba43b7400"});
        assert_eq!(parse_rpc_quantity(&body).unwrap(), 50_000_000_000);
    }

    #[test]
    fn rpc_error_is_surfaced() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "header not found"}
        });
        match parse_rpc_quantity(&body).unwrap_err() {
            SourceError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "header not found");
            }
            other => panic!("expected Rpc error, got: {other:?}"),
        }
    }

    #[test]
    fn missing_prefix_is_malformed() {
        let body = json!({"result": "12345"});
        assert!(matches!(
            parse_rpc_quantity(&body).unwrap_err(),
            SourceError::Malformed(_)
        ));
    }

    #[test]
    fn invalid_endpoint_rejected_at_construction() {
        let endpoints = BTreeMap::from([(1, "not a url".to_string())]);
        assert!(matches!(
            JsonRpcGasPriceSource::new(endpoints).unwrap_err(),
            SourceError::InvalidEndpoint { .. }
        ));
    }

    #[tokio::test]
    async fn unconfigured_chain_fails_without_network() {
        let endpoints = BTreeMap::from([(1, "https://rpc.example.com".to_string())]);
        let source = JsonRpcGasPriceSource::new(endpoints).unwrap();
        assert_eq!(source.chains().collect::<Vec<_>>(), vec![1]);
        assert!(matches!(
            source.gas_price(42).await.unwrap_err(),
            SourceError::UnknownChain(42)
        ));
    }
}
