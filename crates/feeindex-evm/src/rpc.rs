//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! One POST per call, a per-request timeout, no retry and no endpoint
//! rotation. Every failure surfaces as [`IndexerError::Provider`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use feeindex_core::error::IndexerError;

use crate::fetcher::{parse_hex_u64, EvmRpcClient, LogFilter, RawLog};

// ─── JSON-RPC 2.0 wire types ─────────────────────────────────────────────────

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Unwrap the result value or turn the error object into a provider error.
    pub fn into_result(self) -> Result<Value, IndexerError> {
        match self.error {
            Some(err) => Err(IndexerError::Provider(format!(
                "JSON-RPC error {}: {}",
                err.code, err.message
            ))),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Build the single filter object passed to `eth_getLogs`.
pub fn log_filter_params(from: u64, to: u64, filter: &LogFilter) -> Value {
    json!({
        "address": [filter.address.to_string()],
        "topics": [[filter.topic0.to_string()]],
        "fromBlock": format!("0x{from:x}"),
        "toBlock": format!("0x{to:x}"),
    })
}

// ─── HttpRpcClient ───────────────────────────────────────────────────────────

/// JSON-RPC client for a single HTTP endpoint.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, IndexerError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| IndexerError::Provider(format!("build http client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and deserialize its result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, IndexerError> {
        let req = JsonRpcRequest::new(self.next_id.fetch_add(1, Ordering::Relaxed), method, params);

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| IndexerError::Provider(format!("{method}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexerError::Provider(format!("{method}: HTTP {status}: {body}")));
        }

        let result = resp
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| IndexerError::Provider(format!("{method}: {e}")))?
            .into_result()?;

        serde_json::from_value(result)
            .map_err(|e| IndexerError::Provider(format!("{method}: unexpected result: {e}")))
    }
}

#[async_trait]
impl EvmRpcClient for HttpRpcClient {
    async fn get_block_number(&self) -> Result<u64, IndexerError> {
        let hex: String = self.call("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&hex)
            .ok_or_else(|| IndexerError::Provider(format!("eth_blockNumber: bad quantity `{hex}`")))
    }

    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<RawLog>, IndexerError> {
        self.call("eth_getLogs", vec![log_filter_params(from, to, filter)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::fees_collected_topic;
    use alloy_primitives::Address;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(7, "eth_blockNumber", vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_blockNumber\""));
        assert!(json.contains("\"id\":7"));
    }

    #[test]
    fn response_error_becomes_provider_error() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32005, "message": "query returned more than 10000 results" }
        }))
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.is_provider());
        assert!(err.to_string().contains("-32005"));
    }

    #[test]
    fn response_result_ok() {
        let resp: JsonRpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x3aa6d10" }))
                .unwrap();
        assert_eq!(resp.into_result().unwrap(), json!("0x3aa6d10"));
    }

    #[test]
    fn log_filter_params_shape() {
        let contract = "0xbD6C7B0d2f68c2b7805d88388319cfB6EcB50eA9".parse().unwrap();
        let filter = LogFilter::fees_collected(contract);
        let params = log_filter_params(61_500_000, 61_501_000, &filter);
        assert_eq!(params["fromBlock"], "0x3aa6a60");
        assert_eq!(params["toBlock"], "0x3aa6e48");
        assert_eq!(params["address"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            params["address"][0].as_str().map(str::to_lowercase).as_deref(),
            Some("0xbd6c7b0d2f68c2b7805d88388319cfb6ecb50ea9")
        );
        assert_eq!(params["topics"], json!([[fees_collected_topic().to_string()]]));
    }

    #[test]
    fn log_filter_params_always_scoped() {
        let filter = LogFilter::fees_collected(Address::ZERO);
        let params = log_filter_params(1, 2, &filter);
        assert_eq!(params["address"][0], Address::ZERO.to_string());
        assert_eq!(params["topics"].as_array().map(Vec::len), Some(1));
        assert_eq!(params["topics"][0][0], fees_collected_topic().to_string());
    }

    #[test]
    fn client_builds_without_network() {
        let client = HttpRpcClient::new("http://127.0.0.1:8545", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:8545");
    }
}
