//! feeindex-evm — JSON-RPC log reader, `FeesCollected` decoding and the sync
//! scheduler.

pub mod builder;
pub mod decode;
pub mod fetcher;
pub mod index_loop;
pub mod rpc;

#[cfg(test)]
mod test_utils;

pub use builder::IndexerBuilder;
pub use decode::{fees_collected_topic, FEES_COLLECTED_SIGNATURE};
pub use fetcher::{EvmFetcher, EvmRpcClient, LogFilter, RawLog};
pub use index_loop::SyncScheduler;
pub use rpc::HttpRpcClient;
