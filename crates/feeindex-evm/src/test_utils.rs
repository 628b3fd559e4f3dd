//! Scripted RPC client and log builders shared by the crate's tests.

use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::Notify;

use feeindex_core::error::IndexerError;

use crate::decode::fees_collected_topic;
use crate::fetcher::{EvmRpcClient, LogFilter, RawLog};

pub const CONTRACT: &str = "0xbD6C7B0d2f68c2b7805d88388319cfB6EcB50eA9";
pub const TOKEN: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
pub const INTEGRATOR_A: &str = "0x1Bcc58D165e5374D7B492B21c0a572Fd61C0C2a0";
pub const INTEGRATOR_B: &str = "0x0000000000000000000000000000000000000B0b";

/// A well-formed `FeesCollected` log; the protocol fee is a tenth of `fee`.
pub fn fee_log(block: u64, tx: &str, integrator: &str, fee: u64) -> RawLog {
    let word = |addr: &str| -> String {
        let addr: Address = addr.parse().expect("test address");
        B256::left_padding_from(addr.as_slice()).to_string()
    };
    let integrator_fee = U256::from(fee).to_be_bytes::<32>();
    let lifi_fee = U256::from(fee / 10).to_be_bytes::<32>();

    RawLog {
        address: CONTRACT.into(),
        topics: vec![fees_collected_topic().to_string(), word(TOKEN), word(integrator)],
        data: format!(
            "0x{}{}",
            alloy_primitives::hex::encode(integrator_fee),
            alloy_primitives::hex::encode(lifi_fee)
        ),
        block_number: Some(format!("0x{block:x}")),
        block_hash: Some(format!("0x{block:064x}")),
        tx_hash: Some(tx.into()),
        log_index: Some("0x0".into()),
        removed: None,
    }
}

/// In-memory stand-in for a JSON-RPC provider.
#[derive(Default)]
pub struct MockRpc {
    head: Mutex<u64>,
    /// Logs keyed by the block whose range returns them.
    logs: Vec<(u64, RawLog)>,
    calls: Mutex<Vec<(u64, u64)>>,
    filters: Mutex<Vec<LogFilter>>,
    fail_head: bool,
    fail_logs_from: Option<u64>,
    head_gate: Option<Arc<Notify>>,
}

impl MockRpc {
    pub fn new(head: u64) -> Self {
        Self {
            head: Mutex::new(head),
            ..Default::default()
        }
    }

    pub fn with_logs(mut self, logs: Vec<RawLog>) -> Self {
        for log in logs {
            let block = log.block_number_u64().unwrap_or_default();
            self.logs.push((block, log));
        }
        self
    }

    /// Serve `log` from whichever range covers `block`, regardless of its
    /// own (possibly missing) block number.
    pub fn with_log_at(mut self, block: u64, log: RawLog) -> Self {
        self.logs.push((block, log));
        self
    }

    /// `eth_blockNumber` fails.
    pub fn failing_head(mut self) -> Self {
        self.fail_head = true;
        self
    }

    /// `eth_getLogs` fails for any range starting at or after `block`.
    pub fn failing_logs_from(mut self, block: u64) -> Self {
        self.fail_logs_from = Some(block);
        self
    }

    /// `eth_blockNumber` blocks until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.head_gate = Some(gate);
        self
    }

    pub fn set_head(&self, head: u64) {
        *self.head.lock().unwrap() = head;
    }

    /// Every `(from, to)` passed to `get_logs`, in call order.
    pub fn calls(&self) -> Vec<(u64, u64)> {
        self.calls.lock().unwrap().clone()
    }

    /// The filter of every `get_logs` call, in call order.
    pub fn filters(&self) -> Vec<LogFilter> {
        self.filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvmRpcClient for MockRpc {
    async fn get_block_number(&self) -> Result<u64, IndexerError> {
        if let Some(gate) = &self.head_gate {
            gate.notified().await;
        }
        if self.fail_head {
            return Err(IndexerError::Provider("connection refused".into()));
        }
        Ok(*self.head.lock().unwrap())
    }

    async fn get_logs(
        &self,
        from: u64,
        to: u64,
        filter: &LogFilter,
    ) -> Result<Vec<RawLog>, IndexerError> {
        self.calls.lock().unwrap().push((from, to));
        self.filters.lock().unwrap().push(*filter);
        if self.fail_logs_from.is_some_and(|b| from >= b) {
            return Err(IndexerError::Provider("rate limited".into()));
        }
        Ok(self
            .logs
            .iter()
            .filter(|(block, _)| (from..=to).contains(block))
            .map(|(_, log)| log.clone())
            .collect())
    }
}
