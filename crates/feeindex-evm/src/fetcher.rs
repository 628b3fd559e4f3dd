//! EVM log fetcher — the chain reader half of the sync pipeline.
//!
//! Uses JSON-RPC `eth_blockNumber` and `eth_getLogs`. Ranges are queried as
//! given: chunking is the range planner's job and the fetcher never paginates.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use feeindex_core::error::IndexerError;
use feeindex_core::types::RawFeeLog;

use crate::decode::{fees_collected_topic, to_raw_fee_log};

/// A raw EVM log as returned by `eth_getLogs`.
///
/// Block and transaction fields are `null` for pending logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    #[serde(rename = "data")]
    pub data: String,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
    #[serde(rename = "blockHash")]
    pub block_hash: Option<String>,
    #[serde(rename = "transactionHash")]
    pub tx_hash: Option<String>,
    #[serde(rename = "logIndex")]
    pub log_index: Option<String>,
    #[serde(rename = "removed")]
    pub removed: Option<bool>,
}

impl RawLog {
    /// Returns the block number, if present and well-formed.
    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(parse_hex_u64)
    }

    /// Returns `true` if this log was removed by a reorg.
    pub fn is_removed(&self) -> bool {
        self.removed.unwrap_or(false)
    }
}

/// Emitting contract and event signature hash of an `eth_getLogs` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: B256,
}

impl LogFilter {
    /// `FeesCollected` events emitted by `contract`.
    pub fn fees_collected(contract: Address) -> Self {
        Self {
            address: contract,
            topic0: fees_collected_topic(),
        }
    }
}

/// Trait for fetching EVM data from a JSON-RPC provider.
#[async_trait]
pub trait EvmRpcClient: Send + Sync {
    async fn get_block_number(&self) -> Result<u64, IndexerError>;
    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<RawLog>, IndexerError>;
}

/// Reads `FeesCollected` logs of one contract through an [`EvmRpcClient`].
pub struct EvmFetcher<C> {
    client: C,
    filter: LogFilter,
}

impl<C: EvmRpcClient> EvmFetcher<C> {
    /// Fetcher for `FeesCollected` emitted by `contract`.
    pub fn new(client: C, contract: Address) -> Self {
        Self {
            client,
            filter: LogFilter::fees_collected(contract),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Current chain height.
    pub async fn current_height(&self) -> Result<u64, IndexerError> {
        self.client.get_block_number().await
    }

    /// All fee logs in `[from, to]`, in provider order, as raw records.
    ///
    /// Logs flagged `removed` are dropped; everything else is handed to the
    /// normalizer untouched, including logs that failed to decode.
    pub async fn fetch_logs(&self, from: u64, to: u64) -> Result<Vec<RawFeeLog>, IndexerError> {
        if to < from {
            return Ok(vec![]);
        }
        let logs = self.client.get_logs(from, to, &self.filter).await?;

        Ok(logs
            .iter()
            .filter(|log| {
                if log.is_removed() {
                    tracing::debug!(tx = ?log.tx_hash, "skipping removed log");
                    return false;
                }
                true
            })
            .map(to_raw_fee_log)
            .collect())
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).ok()
}
