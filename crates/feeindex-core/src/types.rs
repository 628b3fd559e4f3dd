//! Shared types for the fee sync pipeline.


use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

// ─── CanonicalFeeEvent ───────────────────────────────────────────────────────

/// One confirmed `FeesCollected` emission, ready to be stored.
///
/// `transaction_hash` is the idempotency key: the store holds at most one
/// record per hash. Fee amounts are exact decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFeeEvent {
    /// Hash of the originating transaction (`0x…`).
    pub transaction_hash: String,
    /// Block containing the transaction.
    pub block_number: u64,
    /// Fee-denominated asset (checksummed address).
    pub token: String,
    /// Fee-receiving integration (checksummed address).
    pub integrator: String,
    /// Integrator share, decimal string.
    pub integrator_fee: String,
    /// Protocol share, decimal string.
    pub lifi_fee: String,
}

// ─── Raw log records ─────────────────────────────────────────────────────────

/// A single decoded positional argument of a raw log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogArg {
    Address(Address),
    Uint(U256),
}

impl From<Address> for LogArg {
    fn from(addr: Address) -> Self {
        Self::Address(addr)
    }
}

impl From<U256> for LogArg {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

/// An unvalidated fee log as handed over by the chain reader.
///
/// Any field may be absent: pending logs carry no block number or
/// transaction hash, and `args` is `None` when the payload did not decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeeLog {
    pub args: Option<Vec<LogArg>>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<String>,
}

// ─── BlockRange ──────────────────────────────────────────────────────────────

/// An inclusive block interval `[from, to]` fetched as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
