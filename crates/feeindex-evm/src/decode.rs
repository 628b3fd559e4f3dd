//! `FeesCollected` log decoding.
//!
//! ```text
//! event FeesCollected(address indexed _token, address indexed _integrator,
//!                     uint256 _integratorFee, uint256 _lifiFee)
//! ```
//!
//! topics = [signature, token, integrator], data = integratorFee ‖ lifiFee.

use alloy_primitives::{hex, keccak256, Address, B256, U256};

use feeindex_core::types::{LogArg, RawFeeLog};

use crate::fetcher::RawLog;

pub const FEES_COLLECTED_SIGNATURE: &str = "FeesCollected(address,address,uint256,uint256)";

/// topic0 of `FeesCollected`.
pub fn fees_collected_topic() -> B256 {
    keccak256(FEES_COLLECTED_SIGNATURE.as_bytes())
}

/// Decode the four positional arguments, or `None` if the log does not have
/// the `FeesCollected` shape.
pub fn decode_fee_args(log: &RawLog) -> Option<Vec<LogArg>> {
    if log.topics.len() != 3 {
        return None;
    }
    let topics = log
        .topics
        .iter()
        .map(|t| t.parse::<B256>().ok())
        .collect::<Option<Vec<_>>>()?;
    if topics[0] != fees_collected_topic() {
        return None;
    }

    let data = hex::decode(&log.data).ok()?;
    if data.len() != 64 {
        return None;
    }
    let integrator_fee = U256::try_from_be_slice(&data[..32])?;
    let lifi_fee = U256::try_from_be_slice(&data[32..])?;

    Some(vec![
        LogArg::Address(Address::from_word(topics[1])),
        LogArg::Address(Address::from_word(topics[2])),
        LogArg::Uint(integrator_fee),
        LogArg::Uint(lifi_fee),
    ])
}

/// Map an RPC log to the raw record consumed by the normalizer.
pub fn to_raw_fee_log(log: &RawLog) -> RawFeeLog {
    RawFeeLog {
        args: decode_fee_args(log),
        block_number: log.block_number_u64(),
        transaction_hash: log.tx_hash.clone(),
    }
}
