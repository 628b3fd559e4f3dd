//! Fluent builder API for indexer configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use feeindex_evm::IndexerBuilder;
//!
//! let config = IndexerBuilder::new()
//!     .rpc_url("https://polygon-rpc.com")
//!     .start_block(61_500_000)
//!     .chunk_size(1000)
//!     .chunk_delay_ms(1000)
//!     .build()
//!     .expect("valid config");
//! ```

use feeindex_core::error::IndexerError;
use feeindex_core::indexer::IndexerConfig;

/// Fluent builder for `IndexerConfig`.
#[derive(Default)]
pub struct IndexerBuilder {
    config: IndexerConfig,
}

impl IndexerBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexerConfig::default(),
        }
    }

    /// Set the contract emitting `FeesCollected`.
    pub fn contract_address(mut self, address: impl Into<String>) -> Self {
        self.config.contract_address = address.into();
        self
    }

    /// Set the JSON-RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = url.into();
        self
    }

    /// Set the block to start from when the store is empty.
    pub fn start_block(mut self, block: u64) -> Self {
        self.config.start_block = block;
        self
    }

    /// Set the interval between sync cycles in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the pause between chunks in milliseconds.
    pub fn chunk_delay_ms(mut self, ms: u64) -> Self {
        self.config.chunk_delay_ms = ms;
        self
    }

    /// Set the maximum block distance of one `eth_getLogs` call.
    pub fn chunk_size(mut self, size: u64) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the store connection string.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the read endpoint port.
    pub fn api_port(mut self, port: u16) -> Self {
        self.config.api_port = port;
        self
    }

    /// Set the per-request RPC timeout in milliseconds.
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<IndexerConfig, IndexerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let cfg = IndexerBuilder::new().build().unwrap();
        assert_eq!(cfg.rpc_url, "https://polygon-rpc.com");
        assert_eq!(cfg.start_block, 61_500_000);
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.api_port, 5000);
    }

    #[test]
    fn builder_custom() {
        let cfg = IndexerBuilder::new()
            .rpc_url("http://localhost:8545")
            .start_block(1)
            .poll_interval_ms(5_000)
            .chunk_delay_ms(0)
            .chunk_size(250)
            .database_url("memory")
            .api_port(8080)
            .build()
            .unwrap();

        assert_eq!(cfg.rpc_url, "http://localhost:8545");
        assert_eq!(cfg.start_block, 1);
        assert_eq!(cfg.poll_interval_ms, 5_000);
        assert_eq!(cfg.chunk_delay_ms, 0);
        assert_eq!(cfg.chunk_size, 250);
        assert_eq!(cfg.database_url, "memory");
        assert_eq!(cfg.api_port, 8080);
    }

    #[test]
    fn build_validates() {
        assert!(IndexerBuilder::new().chunk_size(0).build().is_err());
        assert!(IndexerBuilder::new().contract_address("nope").build().is_err());
    }
}
