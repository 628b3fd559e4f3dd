//! Event normalizer — validates raw fee logs into [`CanonicalFeeEvent`]s.
//!
//! A raw log must carry `args` with exactly four positional values
//! (`token`, `integrator`, `integratorFee`, `lifiFee`), a block number and a
//! transaction hash. Anything less is a [`IndexerError::MalformedEvent`].

use alloy_primitives::{Address, U256};

use crate::error::IndexerError;
use crate::types::{CanonicalFeeEvent, LogArg, RawFeeLog};

/// Number of positional arguments carried by a `FeesCollected` log.
pub const FEE_ARG_COUNT: usize = 4;

/// Validate one raw log into its canonical form.
pub fn normalize(raw: &RawFeeLog) -> Result<CanonicalFeeEvent, IndexerError> {
    let tx_hash = raw.transaction_hash.as_deref();

    let (Some(args), Some(block_number), Some(transaction_hash)) =
        (raw.args.as_ref(), raw.block_number, tx_hash)
    else {
        return Err(IndexerError::malformed(
            tx_hash,
            "event args, blockNumber or transactionHash missing",
        ));
    };

    if args.len() != FEE_ARG_COUNT {
        return Err(IndexerError::malformed(
            tx_hash,
            format!("expected {FEE_ARG_COUNT} args, got {}", args.len()),
        ));
    }

    let token = expect_address(&args[0], "token", tx_hash)?;
    let integrator = expect_address(&args[1], "integrator", tx_hash)?;
    let integrator_fee = expect_uint(&args[2], "integratorFee", tx_hash)?;
    let lifi_fee = expect_uint(&args[3], "lifiFee", tx_hash)?;

    Ok(CanonicalFeeEvent {
        transaction_hash: transaction_hash.to_string(),
        block_number,
        token: token.to_checksum(None),
        integrator: integrator.to_checksum(None),
        integrator_fee: integrator_fee.to_string(),
        lifi_fee: lifi_fee.to_string(),
    })
}

/// Normalize every log of a chunk, all or nothing.
///
/// The first malformed log aborts the whole batch; no partial result is
/// returned.
pub fn normalize_all(raws: &[RawFeeLog]) -> Result<Vec<CanonicalFeeEvent>, IndexerError> {
    raws.iter().map(normalize).collect()
}

fn expect_address(arg: &LogArg, name: &str, tx_hash: Option<&str>) -> Result<Address, IndexerError> {
    match arg {
        LogArg::Address(addr) => Ok(*addr),
        LogArg::Uint(_) => Err(IndexerError::malformed(
            tx_hash,
            format!("arg `{name}` is not an address"),
        )),
    }
}

fn expect_uint(arg: &LogArg, name: &str, tx_hash: Option<&str>) -> Result<U256, IndexerError> {
    match arg {
        LogArg::Uint(value) => Ok(*value),
        LogArg::Address(_) => Err(IndexerError::malformed(
            tx_hash,
            format!("arg `{name}` is not an integer"),
        )),
    }
}
