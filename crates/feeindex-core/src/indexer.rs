//! Indexer configuration and state types.

use std::time::Duration;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndexerError;
use crate::types::BlockRange;

/// LI.FI `FeeCollector` on Polygon.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xbD6C7B0d2f68c2b7805d88388319cfB6EcB50eA9";
pub const DEFAULT_RPC_URL: &str = "https://polygon-rpc.com";
pub const DEFAULT_START_BLOCK: u64 = 61_500_000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./feeindex.db?mode=rwc";

/// Static configuration for an indexer instance.
///
/// Built once at startup and shared read-only with every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Contract emitting `FeesCollected`.
    pub contract_address: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// First block to sync when the store is empty.
    pub start_block: u64,
    /// Interval between sync cycles (milliseconds).
    pub poll_interval_ms: u64,
    /// Pause between two chunks of one cycle (milliseconds).
    pub chunk_delay_ms: u64,
    /// Maximum `to - from` of one `eth_getLogs` range; a chunk is an inclusive
    /// span of up to `chunk_size + 1` blocks.
    pub chunk_size: u64,
    /// Store connection string (`memory`, `sqlite:…`, `postgres://…`).
    pub database_url: String,
    /// Port of the read endpoint.
    pub api_port: u16,
    /// Per-request RPC timeout (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.into(),
            rpc_url: DEFAULT_RPC_URL.into(),
            start_block: DEFAULT_START_BLOCK,
            poll_interval_ms: 600_000,
            chunk_delay_ms: 1_000,
            chunk_size: 1_000,
            database_url: DEFAULT_DATABASE_URL.into(),
            api_port: 5000,
            request_timeout_ms: 30_000,
        }
    }
}

impl IndexerConfig {
    /// Reject values that would make the sync loop misbehave.
    pub fn validate(&self) -> Result<(), IndexerError> {
        if self.chunk_size == 0 {
            return Err(IndexerError::Config("chunk_size must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(IndexerError::Config("poll_interval_ms must be positive".into()));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(IndexerError::Config("rpc_url is empty".into()));
        }
        self.contract()?;
        Ok(())
    }

    /// The contract address, parsed.
    pub fn contract(&self) -> Result<Address, IndexerError> {
        self.contract_address.parse::<Address>().map_err(|e| {
            IndexerError::Config(format!("invalid contract address `{}`: {e}", self.contract_address))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the scheduler currently is within a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Waiting for the next tick.
    Idle,
    /// Reading the resume point and chain head, splitting the range.
    Planning,
    /// Querying logs for one chunk.
    FetchingChunk,
    /// Validating the chunk's raw logs.
    Normalizing,
    /// Upserting the chunk's events.
    Persisting,
    /// The last cycle ended in an error.
    Failed,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Planning => write!(f, "planning"),
            Self::FetchingChunk => write!(f, "fetching-chunk"),
            Self::Normalizing => write!(f, "normalizing"),
            Self::Persisting => write!(f, "persisting"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Summary of a cycle that processed at least one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// First block of the cycle (the resume point).
    pub resume_block: u64,
    /// Chain head observed at the start of the cycle.
    pub head_block: u64,
    pub chunks: Vec<BlockRange>,
    pub events_stored: usize,
}

/// What a call to the scheduler's cycle entry point did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The store was already caught up with the chain head.
    UpToDate { resume_block: u64, head_block: u64 },
    /// At least one chunk was fetched and persisted.
    Synced(CycleReport),
    /// Another cycle was in flight; nothing was done.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_polygon_deployment() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.start_block, 61_500_000);
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(600));
        assert_eq!(cfg.chunk_delay(), Duration::from_secs(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = IndexerConfig { chunk_size: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(IndexerError::Config(_))));

        let cfg = IndexerConfig { poll_interval_ms: 0, ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = IndexerConfig { rpc_url: "  ".into(), ..Default::default() };
        assert!(cfg.validate().is_err());

        let cfg = IndexerConfig { contract_address: "0x1234".into(), ..Default::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("0x1234"));
    }

    #[test]
    fn sync_phase_display() {
        assert_eq!(SyncPhase::FetchingChunk.to_string(), "fetching-chunk");
        assert_eq!(SyncPhase::Idle.to_string(), "idle");
    }
}
